//! Search and filter handlers, one per namespace.

use std::sync::Arc;
use std::time::Instant;

use picker_catalog::{fetch_page, CatalogOperation, CatalogTransport, PageVariables};
use picker_core::{FilterSet, Namespace, PageInfo, Query, Resource, ResourceType, SearchPage};
use picker_search::{LibrarySource, ListRequest};
use tracing::debug;

use crate::error::InvokeError;

/// Fetch one page for a query of the handler's namespace.
///
/// Implementations must reject queries of the other namespace before doing any I/O.
#[async_trait::async_trait]
pub trait SearchHandler: Send + Sync {
    fn namespace(&self) -> Namespace;
    async fn search(&self, query: Query) -> Result<SearchPage, InvokeError>;
}

/// Filter facets for a library resource type.
#[async_trait::async_trait]
pub trait FilterHandler: Send + Sync {
    async fn filters(&self, resource_type: ResourceType) -> Result<FilterSet, InvokeError>;
}

/// Library search over the local item source.
pub struct LibrarySearch {
    source: Arc<LibrarySource>,
}

impl LibrarySearch {
    pub fn new(source: Arc<LibrarySource>) -> Self { Self { source } }
}

#[async_trait::async_trait]
impl SearchHandler for LibrarySearch {
    fn namespace(&self) -> Namespace { Namespace::Library }

    async fn search(&self, query: Query) -> Result<SearchPage, InvokeError> {
        let q = match query {
            Query::Library(q) => q,
            other => return Err(InvokeError::mismatch(Namespace::Library, &other)),
        };
        let after = match q.end_cursor.as_deref() {
            Some(c) => Some(c.parse::<u64>().map_err(|_| InvokeError::Message(format!("invalid library cursor: {c}")))?),
            None => None,
        };
        let t0 = Instant::now();
        let page = self.source.list(&ListRequest {
            first: q.first as usize,
            after,
            filters: Some(&q.filters),
            query: q.query.as_deref(),
        });
        debug!(items = page.items.len(), has_next = page.has_next_page, took_us = %t0.elapsed().as_micros(), "library: search");
        let page_info = PageInfo {
            has_next_page: page.has_next_page,
            has_previous_page: page.has_previous_page,
            start_cursor: page.items.first().map(|r| r.cursor.to_string()),
            end_cursor: page.end_cursor.map(|c| c.to_string()),
        };
        Ok(SearchPage { items: page.items.into_iter().map(Resource::Library).collect(), page_info })
    }
}

/// Tag facets of the local item source.
pub struct LibraryFilters {
    source: Arc<LibrarySource>,
}

impl LibraryFilters {
    pub fn new(source: Arc<LibrarySource>) -> Self { Self { source } }
}

#[async_trait::async_trait]
impl FilterHandler for LibraryFilters {
    async fn filters(&self, resource_type: ResourceType) -> Result<FilterSet, InvokeError> {
        if resource_type.namespace() != Namespace::Library {
            return Err(InvokeError::Message(format!("filters not implemented for {resource_type} resources")));
        }
        Ok(FilterSet { filters: self.source.available_filters() })
    }
}

/// Catalog search for one of the two catalog query shapes.
pub struct CatalogSearch {
    transport: Arc<dyn CatalogTransport>,
    operation: CatalogOperation,
}

impl CatalogSearch {
    pub fn new(transport: Arc<dyn CatalogTransport>, operation: CatalogOperation) -> Self {
        Self { transport, operation }
    }
}

#[async_trait::async_trait]
impl SearchHandler for CatalogSearch {
    fn namespace(&self) -> Namespace { Namespace::Catalog }

    async fn search(&self, query: Query) -> Result<SearchPage, InvokeError> {
        let q = match query {
            Query::Catalog(q) => q,
            other => return Err(InvokeError::mismatch(Namespace::Catalog, &other)),
        };
        let vars = PageVariables {
            first: q.first,
            after: q.end_cursor,
            query: (!q.query.is_empty()).then_some(q.query),
        };
        Ok(fetch_page(self.transport.as_ref(), self.operation, vars).await?)
    }
}
