use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Resource;

/// Selected resources keyed by id, in selection order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Selection(IndexMap<String, Resource>);

impl Selection {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn contains(&self, id: &str) -> bool { self.0.contains_key(id) }

    pub fn get(&self, id: &str) -> Option<&Resource> { self.0.get(id) }

    /// Insert or replace by id.
    pub fn insert(&mut self, resource: Resource) {
        self.0.insert(resource.id().to_string(), resource);
    }

    /// Remove by id, keeping the order of the remaining entries.
    pub fn remove(&mut self, id: &str) -> Option<Resource> {
        self.0.shift_remove(id)
    }

    pub fn clear(&mut self) { self.0.clear(); }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.0.values()
    }
}

impl FromIterator<Resource> for Selection {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        let mut s = Selection::new();
        for r in iter {
            s.insert(r);
        }
        s
    }
}
