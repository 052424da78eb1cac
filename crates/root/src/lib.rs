//! Root Machine.
//!
//! A single routing actor that exclusively owns the picker registry and the
//! Spawn Form. Pickers are reached only through their handles; selections come
//! back as [`picker_machine::SelectionReport`] messages.

#![forbid(unsafe_code)]

pub mod actor;
pub mod error;
pub mod form;
pub mod registry;

pub use actor::{spawn_root, PickerView, RootCommand, RootHandle, RootView};
pub use error::RootError;
pub use form::{SpawnForm, SpawnFormEdit};
pub use registry::{PickerEntry, Registry};
