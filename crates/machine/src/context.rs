//! Picker context: the data half of a picker snapshot.

use std::sync::Arc;

use picker_core::{FilterMap, PageInfo, Query, Resource, ResourceSettings, Selection, Tunables, UiSettings};

use crate::id::{RequestId, TimerId};
use crate::state::PickerState;

/// Everything a picker owns besides its state. Cloned on every step; the result
/// list is shared until a step changes it.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerContext {
    pub resource: ResourceSettings,
    pub ui: UiSettings,
    /// Filter facets; `None` until fetched (library only).
    pub filters: Option<FilterMap>,
    pub selection: Selection,
    pub query: Query,
    pub results: Arc<Vec<Resource>>,
    pub page_info: PageInfo,
    seq: u64,
}

impl PickerContext {
    pub fn new(resource: ResourceSettings, ui: UiSettings, tunables: &Tunables) -> Self {
        Self {
            resource,
            ui,
            filters: None,
            selection: Selection::new(),
            query: Query::initial(resource.resource_namespace, tunables.page_size),
            results: Arc::new(Vec::new()),
            page_info: PageInfo::initial(),
            seq: 0,
        }
    }

    pub fn result(&self, id: &str) -> Option<&Resource> {
        self.results.iter().find(|r| r.id() == id)
    }

    pub(crate) fn next_request(&mut self) -> RequestId {
        self.seq += 1;
        RequestId(self.seq)
    }

    pub(crate) fn next_timer(&mut self) -> TimerId {
        self.seq += 1;
        TimerId(self.seq)
    }

    pub(crate) fn replace_results(&mut self, items: Vec<Resource>) {
        self.results = Arc::new(items);
    }

    pub(crate) fn append_results(&mut self, items: Vec<Resource>) {
        Arc::make_mut(&mut self.results).extend(items);
    }
}

/// State plus context, as published to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerSnapshot {
    pub state: PickerState,
    pub context: PickerContext,
}

impl PickerSnapshot {
    pub fn initial(resource: ResourceSettings, ui: UiSettings, tunables: &Tunables) -> Self {
        Self { state: PickerState::Closed, context: PickerContext::new(resource, ui, tunables) }
    }

    pub fn path(&self) -> &'static str { self.state.path() }
}
