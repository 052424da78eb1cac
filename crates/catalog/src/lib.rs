//! Picker catalog: remote catalog source (paged products and collections).
//!
//! Transport is pluggable through [`CatalogTransport`]; this crate owns the
//! request variables, the response shapes and their mapping into resources.

#![forbid(unsafe_code)]

use picker_core::{CatalogPayload, CatalogResource, PageInfo, PlanSlug, Resource, SearchPage};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod fixture;

pub use fixture::FixtureCatalog;

/// The two query shapes the catalog answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogOperation {
    Products,
    Collections,
}

impl CatalogOperation {
    pub fn operation_name(&self) -> &'static str {
        match self {
            CatalogOperation::Products => "getProducts",
            CatalogOperation::Collections => "getCollections",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageVariables {
    pub first: u32,
    pub after: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Non-success answer; `body` is the decoded error payload when there was one.
    #[error("catalog request failed with status {status}")]
    Status { status: u16, body: Option<serde_json::Value> },
    #[error("catalog transport: {0}")]
    Io(String),
    #[error("catalog response: {0}")]
    Decode(String),
}

/// Request function against the remote endpoint. Returns the `data` object of the answer.
#[async_trait::async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn request(
        &self,
        operation: CatalogOperation,
        variables: PageVariables,
    ) -> Result<serde_json::Value, TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductNode {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub featured_image: Option<Image>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionNode {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge<N> {
    pub node: N,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<N> {
    pub page_info: PageInfo,
    pub edges: Vec<Edge<N>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductsData {
    pub products: Connection<ProductNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionsData {
    pub collections: Connection<CollectionNode>,
}

impl From<ProductNode> for CatalogResource {
    fn from(n: ProductNode) -> Self {
        CatalogResource {
            id: n.id,
            main_image_src: n.featured_image.map(|i| i.url),
            allowed_plan_slugs: vec![PlanSlug::All],
            resource: CatalogPayload::Product { title: n.title.clone() },
            title: n.title,
        }
    }
}

impl From<CollectionNode> for CatalogResource {
    fn from(n: CollectionNode) -> Self {
        CatalogResource {
            id: n.id,
            main_image_src: n.image.map(|i| i.url),
            allowed_plan_slugs: vec![PlanSlug::All],
            resource: CatalogPayload::Collection { title: n.title.clone() },
            title: n.title,
        }
    }
}

/// Map the `data` object answered for `operation` into a result page.
pub fn decode_page(operation: CatalogOperation, data: serde_json::Value) -> Result<SearchPage, TransportError> {
    let decode_err = |e: serde_json::Error| TransportError::Decode(format!("{}: {}", operation.operation_name(), e));
    let (items, page_info) = match operation {
        CatalogOperation::Products => {
            let d: ProductsData = serde_json::from_value(data).map_err(decode_err)?;
            let items = d.products.edges.into_iter().map(|e| Resource::Catalog(e.node.into())).collect::<Vec<_>>();
            (items, d.products.page_info)
        }
        CatalogOperation::Collections => {
            let d: CollectionsData = serde_json::from_value(data).map_err(decode_err)?;
            let items = d.collections.edges.into_iter().map(|e| Resource::Catalog(e.node.into())).collect::<Vec<_>>();
            (items, d.collections.page_info)
        }
    };
    debug!(op = operation.operation_name(), items = items.len(), has_next = page_info.has_next_page, "catalog: page decoded");
    Ok(SearchPage { items, page_info })
}

/// Issue `operation` through `transport` and decode the answer.
pub async fn fetch_page(
    transport: &dyn CatalogTransport,
    operation: CatalogOperation,
    variables: PageVariables,
) -> Result<SearchPage, TransportError> {
    metrics::counter!("catalog_requests_total", 1u64, "op" => operation.operation_name());
    let data = transport.request(operation, variables).await?;
    decode_page(operation, data)
}
