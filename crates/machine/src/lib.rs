//! Picker Machine.
//!
//! [`PickerMachine::transition`] is the whole protocol as a pure function over
//! [`PickerSnapshot`]s; [`spawn_picker`] runs it as a tokio actor that executes
//! the requested fetches and timers under cancellation tokens and reports
//! finished selections to its parent.

#![forbid(unsafe_code)]

pub mod actor;
pub mod context;
pub mod event;
pub mod id;
pub mod state;
pub mod transition;

pub use actor::{spawn_picker, PickerRef, PickerSetup, SelectionReport};
pub use context::{PickerContext, PickerSnapshot};
pub use event::{Effect, PageMode, PickerEvent, PickerInput};
pub use id::{PickerId, RequestId, TimerId};
pub use state::{EditState, LoadMoreState, OpenState, PickerState};
pub use transition::{MachineError, Outcome, PickerMachine, Step};
