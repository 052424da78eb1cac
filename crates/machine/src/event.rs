//! Picker inputs and the effects a step asks the executor to perform.

use std::time::Duration;

use picker_api::InvokeError;
use picker_core::{FilterSet, Query, ResourceSettings, ResourceType, SearchPage, Selection};

use crate::id::{RequestId, TimerId};

/// Events other actors (or a UI) send to a picker.
#[derive(Debug, Clone, PartialEq)]
pub enum PickerEvent {
    /// Open the picker, optionally pre-seeded with a prior selection.
    Open { selection: Option<Selection> },
    Close,
    EditQuery { text: String },
    /// Replace the whole value list of one filter.
    EditFilter { filter_id: String, values: Vec<String> },
    ClearFilters,
    Select { id: String },
    Unselect { id: String },
    /// Callers must not send this while `page_info.has_next_page` is false.
    LoadMore,
    Done,
}

impl PickerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PickerEvent::Open { .. } => "open",
            PickerEvent::Close => "close",
            PickerEvent::EditQuery { .. } => "query.editQuery",
            PickerEvent::EditFilter { .. } => "filters.edit",
            PickerEvent::ClearFilters => "filters.clearAll",
            PickerEvent::Select { .. } => "item.select",
            PickerEvent::Unselect { .. } => "item.unselect",
            PickerEvent::LoadMore => "items.loadMore",
            PickerEvent::Done => "done",
        }
    }
}

/// Everything a picker step can consume: external events plus resolutions of
/// work the picker started itself.
#[derive(Debug, Clone)]
pub enum PickerInput {
    Event(PickerEvent),
    FiltersLoaded { request: RequestId, result: Result<FilterSet, InvokeError> },
    PageLoaded { request: RequestId, result: Result<SearchPage, InvokeError> },
    TimerFired { timer: TimerId },
}

impl PickerInput {
    pub fn name(&self) -> &'static str {
        match self {
            PickerInput::Event(e) => e.name(),
            PickerInput::FiltersLoaded { .. } => "filters.loaded",
            PickerInput::PageLoaded { .. } => "page.loaded",
            PickerInput::TimerFired { .. } => "timer.fired",
        }
    }
}

impl From<PickerEvent> for PickerInput {
    fn from(e: PickerEvent) -> Self { PickerInput::Event(e) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    Replace,
    Append,
}

/// Side effects requested by a step, executed in order by the actor.
#[derive(Debug, Clone)]
pub enum Effect {
    FetchFilters { request: RequestId, resource_type: ResourceType },
    FetchPage { request: RequestId, query: Query, mode: PageMode },
    StartTimer { timer: TimerId, after: Duration },
    CancelTimer { timer: TimerId },
    CancelRequest { request: RequestId },
    /// Surface a failed invocation to the user.
    Notify(InvokeError),
    /// Report a finished selection round to the parent.
    EmitSelection { selection: Selection, resource: ResourceSettings },
}
