//! Per-resource-type partial picker configuration.

use std::sync::Arc;

use picker_catalog::{CatalogOperation, CatalogTransport};
use picker_core::{Namespace, ResourceType};
use picker_search::LibrarySource;

use crate::handler::{CatalogSearch, FilterHandler, LibraryFilters, LibrarySearch, SearchHandler};

/// Handlers a picker invokes; the filter handler only exists for the library.
#[derive(Clone)]
pub enum Handlers {
    Library { search: Arc<dyn SearchHandler>, filters: Arc<dyn FilterHandler> },
    Catalog { search: Arc<dyn SearchHandler> },
}

impl Handlers {
    pub fn namespace(&self) -> Namespace {
        match self {
            Handlers::Library { .. } => Namespace::Library,
            Handlers::Catalog { .. } => Namespace::Catalog,
        }
    }

    pub fn search(&self) -> &Arc<dyn SearchHandler> {
        match self {
            Handlers::Library { search, .. } | Handlers::Catalog { search } => search,
        }
    }

    pub fn filters(&self) -> Option<&Arc<dyn FilterHandler>> {
        match self {
            Handlers::Library { filters, .. } => Some(filters),
            Handlers::Catalog { .. } => None,
        }
    }
}

impl std::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handlers({})", self.namespace())
    }
}

/// Resource-type specific part of a picker configuration.
#[derive(Debug, Clone)]
pub struct Preset {
    pub resource_type: ResourceType,
    pub handlers: Handlers,
}

/// Data sources behind the presets.
#[derive(Clone)]
pub struct Sources {
    pub library: Arc<LibrarySource>,
    pub catalog: Arc<dyn CatalogTransport>,
}

impl Sources {
    pub fn new(library: Arc<LibrarySource>, catalog: Arc<dyn CatalogTransport>) -> Self {
        Self { library, catalog }
    }

    pub fn preset(&self, resource_type: ResourceType) -> Preset {
        let handlers = match resource_type {
            ResourceType::LibraryStaticImage => Handlers::Library {
                search: Arc::new(LibrarySearch::new(Arc::clone(&self.library))),
                filters: Arc::new(LibraryFilters::new(Arc::clone(&self.library))),
            },
            ResourceType::Product => Handlers::Catalog {
                search: Arc::new(CatalogSearch::new(Arc::clone(&self.catalog), CatalogOperation::Products)),
            },
            ResourceType::Collection => Handlers::Catalog {
                search: Arc::new(CatalogSearch::new(Arc::clone(&self.catalog), CatalogOperation::Collections)),
            },
        };
        Preset { resource_type, handlers }
    }
}
