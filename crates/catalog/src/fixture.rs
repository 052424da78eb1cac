//! In-memory catalog answering the same shapes as the remote endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use picker_core::PageInfo;

use crate::{
    CatalogOperation, CatalogTransport, CollectionNode, CollectionsData, Connection, Edge, Image,
    PageVariables, ProductNode, ProductsData, TransportError,
};

const CURSOR_PREFIX: &str = "fx:";

/// Fixture transport: index cursors (`fx:<n>`), case-insensitive title filter.
#[derive(Default)]
pub struct FixtureCatalog {
    products: Vec<ProductNode>,
    collections: Vec<CollectionNode>,
    requests: AtomicUsize,
    fail_next: Mutex<Option<TransportError>>,
}

impl FixtureCatalog {
    pub fn new(products: Vec<ProductNode>, collections: Vec<CollectionNode>) -> Self {
        Self { products, collections, ..Default::default() }
    }

    /// Small storefront: `n_products` products, `n_collections` collections.
    pub fn demo(n_products: usize, n_collections: usize) -> Self {
        let products = (1..=n_products)
            .map(|i| ProductNode {
                id: format!("gid://catalog/Product/{i}"),
                title: format!("Product {i:02}"),
                description: Some(format!("Demo product number {i}")),
                featured_image: Some(Image { id: None, url: format!("https://cdn.example.com/products/{i}.jpg") }),
            })
            .collect();
        let collections = (1..=n_collections)
            .map(|i| CollectionNode {
                id: format!("gid://catalog/Collection/{i}"),
                title: format!("Collection {i:02}"),
                description: None,
                image: (i % 2 == 0).then(|| Image { id: None, url: format!("https://cdn.example.com/collections/{i}.jpg") }),
            })
            .collect();
        Self::new(products, collections)
    }

    /// Number of requests answered (or failed) so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Make the next request fail with `err`.
    pub fn fail_next(&self, err: TransportError) {
        if let Ok(mut slot) = self.fail_next.lock() {
            *slot = Some(err);
        }
    }

    fn window<'a, N>(
        nodes: &'a [N],
        title: impl Fn(&N) -> &str,
        vars: &PageVariables,
    ) -> Result<(Vec<&'a N>, PageInfo), TransportError> {
        let needle = vars.query.as_deref().map(str::to_lowercase).filter(|q| !q.is_empty());
        let matched: Vec<&N> = nodes
            .iter()
            .filter(|n| needle.as_deref().map_or(true, |q| title(n).to_lowercase().contains(q)))
            .collect();
        let start = match vars.after.as_deref() {
            Some(c) => c
                .strip_prefix(CURSOR_PREFIX)
                .and_then(|s| s.parse::<usize>().ok())
                .and_then(|i| i.checked_add(1))
                .ok_or_else(|| TransportError::Status {
                    status: 400,
                    body: Some(serde_json::json!({ "message": format!("invalid cursor {c}") })),
                })?,
            None => 0,
        };
        let start = start.min(matched.len());
        let end = (start + vars.first as usize).min(matched.len());
        let page = matched[start..end].to_vec();
        let info = PageInfo {
            has_next_page: end < matched.len(),
            has_previous_page: start > 0,
            start_cursor: (!page.is_empty()).then(|| format!("{CURSOR_PREFIX}{start}")),
            end_cursor: (!page.is_empty()).then(|| format!("{CURSOR_PREFIX}{}", end - 1)),
        };
        Ok((page, info))
    }
}

#[async_trait::async_trait]
impl CatalogTransport for FixtureCatalog {
    async fn request(
        &self,
        operation: CatalogOperation,
        variables: PageVariables,
    ) -> Result<serde_json::Value, TransportError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_next.lock().ok().and_then(|mut s| s.take()) {
            return Err(err);
        }
        let encode = |v: serde_json::Result<serde_json::Value>| v.map_err(|e| TransportError::Decode(e.to_string()));
        match operation {
            CatalogOperation::Products => {
                let (page, page_info) = Self::window(&self.products, |n| n.title.as_str(), &variables)?;
                let edges = page.into_iter().cloned().map(|node| Edge { node }).collect();
                encode(serde_json::to_value(ProductsData { products: Connection { page_info, edges } }))
            }
            CatalogOperation::Collections => {
                let (page, page_info) = Self::window(&self.collections, |n| n.title.as_str(), &variables)?;
                let edges = page.into_iter().cloned().map(|node| Edge { node }).collect();
                encode(serde_json::to_value(CollectionsData { collections: Connection { page_info, edges } }))
            }
        }
    }
}
