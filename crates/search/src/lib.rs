//! Picker search: in-RAM library listing over `LibraryResource`.
//! Tag postings + lowercase title scan, cursor paging.

#![forbid(unsafe_code)]

use picker_core::{FilterMap, LibraryResource, DEFAULT_LOCALE};
use rustc_hash::FxHashMap;
use tracing::debug;

pub mod demo;

/// Filter id backed by resource tags; the only filterable field.
pub const TAGS: &str = "tags";

/// Listing request. `after` is the cursor of the last item already seen.
#[derive(Debug, Clone, Copy)]
pub struct ListRequest<'a> {
    pub first: usize,
    pub after: Option<u64>,
    pub filters: Option<&'a FilterMap>,
    pub query: Option<&'a str>,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub items: Vec<LibraryResource>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub end_cursor: Option<u64>,
}

/// Candidate counts after each filtering stage.
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDebugInfo {
    pub total: usize,
    pub after_filters: usize,
    pub after_text: usize,
}

pub struct LibrarySource {
    items: Vec<LibraryResource>,
    // tag -> sorted item indices
    tag_post: FxHashMap<String, Vec<usize>>,
    lower_titles: Vec<String>,
}

impl LibrarySource {
    pub fn new(items: Vec<LibraryResource>) -> Self {
        Self::with_locale(items, DEFAULT_LOCALE)
    }

    /// Build the source, matching text against titles in `locale`.
    pub fn with_locale(mut items: Vec<LibraryResource>, locale: &str) -> Self {
        items.sort_by_key(|r| r.cursor);
        let mut tag_post: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        let mut lower_titles = Vec::with_capacity(items.len());
        for (i, r) in items.iter().enumerate() {
            if let Some(tags) = &r.tags {
                for t in tags.iter() {
                    let post = tag_post.entry(t.clone()).or_default();
                    // duplicate tags on one item must not duplicate postings
                    if post.last() != Some(&i) {
                        post.push(i);
                    }
                }
            }
            lower_titles.push(r.title.get(locale).unwrap_or("").to_lowercase());
        }
        metrics::gauge!("search_library_items", items.len() as f64);
        Self { items, tag_post, lower_titles }
    }

    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Distinct tag values, sorted, under the `tags` filter id.
    pub fn available_filters(&self) -> FilterMap {
        let mut tags: Vec<String> = self.tag_post.keys().cloned().collect();
        tags.sort();
        let mut out = FilterMap::new();
        out.insert(TAGS.to_string(), tags);
        out
    }

    pub fn list(&self, req: &ListRequest<'_>) -> ListPage {
        self.list_with_debug(req).0
    }

    pub fn list_with_debug(&self, req: &ListRequest<'_>) -> (ListPage, ListDebugInfo) {
        metrics::counter!("search_list_total", 1u64);
        let mut dbg = ListDebugInfo { total: self.items.len(), ..Default::default() };
        let empty = |after: Option<u64>, prev: bool| ListPage {
            items: Vec::new(),
            has_next_page: false,
            has_previous_page: prev,
            end_cursor: after,
        };
        if self.items.is_empty() {
            return (empty(req.after, false), dbg);
        }

        let mut candidates: Vec<usize> = (0..self.items.len()).collect();
        if let Some(filters) = req.filters {
            for (key, values) in filters.iter() {
                if values.is_empty() {
                    continue;
                }
                if key != TAGS {
                    candidates.clear();
                    break;
                }
                for v in values {
                    match self.tag_post.get(v) {
                        Some(post) => candidates = intersect_sorted(&candidates, post),
                        None => candidates.clear(),
                    }
                }
            }
        }
        dbg.after_filters = candidates.len();

        let needle = req.query.map(str::to_lowercase).filter(|q| !q.is_empty());
        if let Some(q) = needle.as_deref() {
            candidates.retain(|&i| self.lower_titles[i].contains(q));
        }
        dbg.after_text = candidates.len();

        if candidates.is_empty() {
            return (empty(req.after, false), dbg);
        }

        let start = match req.after {
            Some(after) => match candidates.iter().position(|&i| self.items[i].cursor > after) {
                Some(p) => p,
                None => {
                    debug!(after, matched = candidates.len(), "search: cursor past end of results");
                    return (empty(Some(after), true), dbg);
                }
            },
            None => 0,
        };
        let end = (start + req.first).min(candidates.len());
        let items: Vec<LibraryResource> = candidates[start..end].iter().map(|&i| self.items[i].clone()).collect();
        let end_cursor = items.last().map(|r| r.cursor).or(req.after);
        debug!(
            total = dbg.total,
            after_filters = dbg.after_filters,
            after_text = dbg.after_text,
            returned = items.len(),
            "search: list"
        );
        let page = ListPage {
            items,
            has_next_page: end < candidates.len(),
            has_previous_page: start > 0,
            end_cursor,
        };
        (page, dbg)
    }
}

fn intersect_sorted(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut i = 0usize;
    let mut j = 0usize;
    let mut out = Vec::new();
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => { out.push(a[i]); i += 1; j += 1; }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_keeps_common_sorted() {
        assert_eq!(intersect_sorted(&[1, 3, 5, 7], &[3, 4, 7, 9]), vec![3, 7]);
        assert!(intersect_sorted(&[], &[1]).is_empty());
    }
}
