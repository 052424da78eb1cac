//! Picker core types: queries, resources, page info and selection sets.

#![forbid(unsafe_code)]

pub mod config;
pub mod query;
pub mod resource;
pub mod selection;
pub mod settings;

pub use config::{ConfigError, Tunables};
pub use query::{CatalogQuery, LibraryQuery, Query, DEFAULT_PAGE_SIZE};
pub use resource::{
    CatalogPayload, CatalogResource, LibraryPayload, LibraryResource, Localized, PageInfo,
    PlanSlug, Resource, ResourceStatus, SearchPage, DEFAULT_LOCALE,
};
pub use selection::Selection;
pub use settings::{
    DisplayMode, ModalSize, Namespace, ResourceSettings, ResourceType, SelectionType, UiSettings,
};

/// Filter id -> selected (or available) values, e.g. `tags -> ["red", "blue"]`.
pub type FilterMap = std::collections::BTreeMap<String, Vec<String>>;

/// Filter facets offered for a library resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FilterSet {
    pub filters: FilterMap,
}
