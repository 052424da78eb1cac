use serde::{Deserialize, Serialize};

use crate::{FilterMap, Namespace};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Query against the local library: free text, tag filters and a cursor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryQuery {
    pub query: Option<String>,
    pub filters: FilterMap,
    pub end_cursor: Option<String>,
    pub first: u32,
}

impl Default for LibraryQuery {
    fn default() -> Self {
        let mut filters = FilterMap::new();
        filters.insert("tags".to_string(), Vec::new());
        Self { query: Some(String::new()), filters, end_cursor: None, first: DEFAULT_PAGE_SIZE }
    }
}

/// Query against the remote catalog: free text and an opaque cursor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub query: String,
    pub end_cursor: Option<String>,
    pub first: u32,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self { query: String::new(), end_cursor: None, first: DEFAULT_PAGE_SIZE }
    }
}

/// Namespace-discriminated query. A picker keeps the variant it was created with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "queryType", rename_all = "lowercase")]
pub enum Query {
    Library(LibraryQuery),
    Catalog(CatalogQuery),
}

impl Query {
    /// Empty first-page query for `namespace`.
    pub fn initial(namespace: Namespace, page_size: u32) -> Self {
        let first = page_size.max(1);
        match namespace {
            Namespace::Library => Query::Library(LibraryQuery { first, ..LibraryQuery::default() }),
            Namespace::Catalog => Query::Catalog(CatalogQuery { first, ..CatalogQuery::default() }),
        }
    }

    pub fn namespace(&self) -> Namespace {
        match self {
            Query::Library(_) => Namespace::Library,
            Query::Catalog(_) => Namespace::Catalog,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Query::Library(q) => q.query.as_deref(),
            Query::Catalog(q) => Some(q.query.as_str()),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        match self {
            Query::Library(q) => q.query = Some(text.into()),
            Query::Catalog(q) => q.query = text.into(),
        }
    }

    pub fn first(&self) -> u32 {
        match self {
            Query::Library(q) => q.first,
            Query::Catalog(q) => q.first,
        }
    }

    pub fn end_cursor(&self) -> Option<&str> {
        match self {
            Query::Library(q) => q.end_cursor.as_deref(),
            Query::Catalog(q) => q.end_cursor.as_deref(),
        }
    }

    pub fn set_end_cursor(&mut self, cursor: Option<String>) {
        match self {
            Query::Library(q) => q.end_cursor = cursor,
            Query::Catalog(q) => q.end_cursor = cursor,
        }
    }

    /// Back to the first page.
    pub fn reset_cursor(&mut self) {
        self.set_end_cursor(None);
    }

    /// Filters of a library query; catalog queries have none.
    pub fn filters(&self) -> Option<&FilterMap> {
        match self {
            Query::Library(q) => Some(&q.filters),
            Query::Catalog(_) => None,
        }
    }

    /// Replace the whole value list of `filter_id`. Returns false for catalog queries.
    pub fn set_filter(&mut self, filter_id: &str, values: Vec<String>) -> bool {
        match self {
            Query::Library(q) => {
                q.filters.insert(filter_id.to_string(), values);
                true
            }
            Query::Catalog(_) => false,
        }
    }

    /// Empty every known filter key in one update.
    pub fn clear_filters(&mut self) {
        if let Query::Library(q) = self {
            for values in q.filters.values_mut() {
                values.clear();
            }
        }
    }

    /// Make sure each of `keys` exists in the filter map without touching set values.
    pub fn register_filter_keys<'a>(&mut self, keys: impl IntoIterator<Item = &'a String>) {
        if let Query::Library(q) = self {
            for k in keys {
                q.filters.entry(k.clone()).or_default();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_uses_query_type_tag() {
        let q = Query::initial(Namespace::Library, 10);
        let v = serde_json::to_value(&q).unwrap();
        assert_eq!(v["queryType"], "library");
        assert_eq!(v["filters"]["tags"], serde_json::json!([]));
        assert_eq!(v["endCursor"], serde_json::Value::Null);

        let c: Query = serde_json::from_value(serde_json::json!({
            "queryType": "catalog", "query": "hat", "endCursor": "abc", "first": 5
        }))
        .unwrap();
        assert_eq!(c.namespace(), Namespace::Catalog);
        assert_eq!(c.end_cursor(), Some("abc"));
        assert_eq!(c.first(), 5);
    }

    #[test]
    fn clear_filters_empties_every_known_key() {
        let mut q = Query::initial(Namespace::Library, 10);
        q.set_filter("tags", vec!["red".into()]);
        q.set_filter("mood", vec!["calm".into(), "warm".into()]);
        q.clear_filters();
        let filters = q.filters().unwrap();
        assert_eq!(filters.len(), 2);
        assert!(filters.values().all(|v| v.is_empty()));
    }

    #[test]
    fn catalog_queries_ignore_filters() {
        let mut q = Query::initial(Namespace::Catalog, 0);
        assert_eq!(q.first(), 1);
        assert!(!q.set_filter("tags", vec!["x".into()]));
        assert!(q.filters().is_none());
    }
}
