//! Picker-instance registry, owned by the root actor.

use indexmap::IndexMap;
use picker_core::{ResourceSettings, Selection, UiSettings};
use picker_machine::{PickerId, PickerRef};
use tokio::task::JoinHandle;

pub struct PickerEntry {
    pub picker: PickerRef,
    pub resource: ResourceSettings,
    pub ui: UiSettings,
    /// Selection of the last finished round; seeds the next `open`.
    pub selection: Selection,
    pub join: JoinHandle<()>,
}

/// Running pickers in spawn order.
#[derive(Default)]
pub struct Registry {
    entries: IndexMap<PickerId, PickerEntry>,
}

impl Registry {
    pub fn insert(&mut self, id: PickerId, entry: PickerEntry) {
        self.entries.insert(id, entry);
    }

    pub fn get(&self, id: &PickerId) -> Option<&PickerEntry> { self.entries.get(id) }

    pub fn remove(&mut self, id: &PickerId) -> Option<PickerEntry> { self.entries.shift_remove(id) }

    /// Record a finished selection. False when `id` is not registered.
    pub fn record_selection(&mut self, id: &PickerId, selection: Selection) -> bool {
        match self.entries.get_mut(id) {
            Some(e) => {
                e.selection = selection;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PickerId, &PickerEntry)> { self.entries.iter() }

    pub fn drain(&mut self) -> impl Iterator<Item = (PickerId, PickerEntry)> + '_ { self.entries.drain(..) }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
