//! Hierarchical picker states, flattened into nested enums.
//!
//! States that own an in-flight fetch or a timer carry its id; a resolution is
//! only accepted by the state holding the matching id.

use crate::id::{RequestId, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    Closed,
    Open(OpenState),
    /// Transient: reports the selection and falls through to `Closed`.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenState {
    /// Transient: picks `LoadFilters`, `Edit` or `Loading`.
    Check,
    LoadFilters { request: RequestId },
    Loading { request: RequestId },
    Edit(EditState),
    LoadMore(LoadMoreState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Selecting,
    /// Debounce window; `timer` fires the search.
    Searching { timer: TimerId },
    /// Transient: single selection finishes, multiple goes back to `Selecting`.
    AnalyzeSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreState {
    Retrieve { request: RequestId },
    Retrieved { timer: TimerId },
}

impl PickerState {
    pub const SELECTING: PickerState = PickerState::Open(OpenState::Edit(EditState::Selecting));

    /// Dotted state path, e.g. `Open.Edit.Selecting`.
    pub fn path(&self) -> &'static str {
        match self {
            PickerState::Closed => "Closed",
            PickerState::Done => "Done",
            PickerState::Open(o) => match o {
                OpenState::Check => "Open.Check",
                OpenState::LoadFilters { .. } => "Open.LoadFilters",
                OpenState::Loading { .. } => "Open.Loading",
                OpenState::Edit(EditState::Selecting) => "Open.Edit.Selecting",
                OpenState::Edit(EditState::Searching { .. }) => "Open.Edit.Searching",
                OpenState::Edit(EditState::AnalyzeSelection) => "Open.Edit.AnalyzeSelection",
                OpenState::LoadMore(LoadMoreState::Retrieve { .. }) => "Open.LoadMore.Retrieve",
                OpenState::LoadMore(LoadMoreState::Retrieved { .. }) => "Open.LoadMore.Retrieved",
            },
        }
    }

    /// True when this state is `prefix` or one of its descendants (`"Open.Edit"`).
    pub fn matches(&self, prefix: &str) -> bool {
        let path = self.path();
        path == prefix || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'.'))
    }

    pub fn is_open(&self) -> bool {
        matches!(self, PickerState::Open(_))
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, PickerState::Open(OpenState::Edit(_)))
    }

    /// Fetch this state is waiting on.
    pub fn awaited_request(&self) -> Option<RequestId> {
        match self {
            PickerState::Open(OpenState::LoadFilters { request })
            | PickerState::Open(OpenState::Loading { request })
            | PickerState::Open(OpenState::LoadMore(LoadMoreState::Retrieve { request })) => Some(*request),
            _ => None,
        }
    }

    /// Timer owned by this state.
    pub fn owned_timer(&self) -> Option<TimerId> {
        match self {
            PickerState::Open(OpenState::Edit(EditState::Searching { timer }))
            | PickerState::Open(OpenState::LoadMore(LoadMoreState::Retrieved { timer })) => Some(*timer),
            _ => None,
        }
    }
}

impl std::fmt::Display for PickerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
