use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{Namespace, ResourceType};

pub const DEFAULT_LOCALE: &str = "en-US";

/// Locale -> text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Localized(pub BTreeMap<String, String>);

impl Localized {
    pub fn en(text: impl Into<String>) -> Self {
        let mut m = BTreeMap::new();
        m.insert(DEFAULT_LOCALE.to_string(), text.into());
        Self(m)
    }

    /// Text for `locale`, falling back to the default locale, then to any entry.
    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0
            .get(locale)
            .or_else(|| self.0.get(DEFAULT_LOCALE))
            .or_else(|| self.0.values().next())
            .map(String::as_str)
    }
}

/// Plan granting access to a resource; `all` is the wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlanSlug {
    All,
    Plan(String),
}

impl From<String> for PlanSlug {
    fn from(s: String) -> Self {
        if s == "all" { PlanSlug::All } else { PlanSlug::Plan(s) }
    }
}

impl From<PlanSlug> for String {
    fn from(p: PlanSlug) -> Self {
        match p {
            PlanSlug::All => "all".to_string(),
            PlanSlug::Plan(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Active,
    Draft,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaticImageData {
    pub src: String,
}

/// Library sub-resource, discriminated by resource type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "resourceType")]
pub enum LibraryPayload {
    #[serde(rename = "libraryStaticImage")]
    StaticImage { data: StaticImageData },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryResource {
    pub id: String,
    pub title: Localized,
    #[serde(default)]
    pub description: Option<Localized>,
    #[serde(default)]
    pub tags: Option<SmallVec<[String; 4]>>,
    pub allowed_plan_slugs: Vec<PlanSlug>,
    pub status: ResourceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Storage-order cursor, strictly increasing.
    pub cursor: u64,
    pub main_image_src: Option<String>,
    pub resource: LibraryPayload,
}

impl LibraryResource {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.as_ref().is_some_and(|t| t.iter().any(|x| x == tag))
    }
}

/// Catalog sub-resource, discriminated by resource type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "resourceType", rename_all = "lowercase")]
pub enum CatalogPayload {
    Product { title: String },
    Collection { title: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResource {
    pub id: String,
    pub title: String,
    pub main_image_src: Option<String>,
    pub allowed_plan_slugs: Vec<PlanSlug>,
    pub resource: CatalogPayload,
}

/// Selectable item from either namespace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "resourceNamespace", rename_all = "lowercase")]
pub enum Resource {
    Library(LibraryResource),
    Catalog(CatalogResource),
}

impl Resource {
    pub fn id(&self) -> &str {
        match self {
            Resource::Library(r) => &r.id,
            Resource::Catalog(r) => &r.id,
        }
    }

    pub fn namespace(&self) -> Namespace {
        match self {
            Resource::Library(_) => Namespace::Library,
            Resource::Catalog(_) => Namespace::Catalog,
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        match self {
            Resource::Library(r) => match r.resource {
                LibraryPayload::StaticImage { .. } => ResourceType::LibraryStaticImage,
            },
            Resource::Catalog(r) => match r.resource {
                CatalogPayload::Product { .. } => ResourceType::Product,
                CatalogPayload::Collection { .. } => ResourceType::Collection,
            },
        }
    }

    pub fn title(&self, locale: &str) -> &str {
        match self {
            Resource::Library(r) => r.title.get(locale).unwrap_or(""),
            Resource::Catalog(r) => &r.title,
        }
    }

    pub fn preview(&self) -> Option<&str> {
        match self {
            Resource::Library(r) => r.main_image_src.as_deref(),
            Resource::Catalog(r) => r.main_image_src.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// Page info before anything was loaded: a next page is assumed to exist.
    pub fn initial() -> Self {
        Self {
            has_next_page: true,
            has_previous_page: false,
            start_cursor: Some("0".to_string()),
            end_cursor: None,
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(alias = "libraryItems")]
    pub items: Vec<Resource>,
    pub page_info: PageInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resources_round_trip_with_original_wire_names() {
        let raw = serde_json::json!({
            "resourceNamespace": "library",
            "id": "img-1",
            "title": { "en-US": "Red Fox" },
            "description": null,
            "tags": ["red", "animal"],
            "allowedPlanSlugs": ["all"],
            "status": "active",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z",
            "cursor": 1,
            "mainImageSrc": "https://cdn.example/fox.png",
            "resource": { "resourceType": "libraryStaticImage", "data": { "src": "https://cdn.example/fox.png" } }
        });
        let r: Resource = serde_json::from_value(raw).unwrap();
        assert_eq!(r.id(), "img-1");
        assert_eq!(r.resource_type(), ResourceType::LibraryStaticImage);
        assert_eq!(r.title("fr-FR"), "Red Fox");
        let Resource::Library(lib) = &r else { panic!("expected library resource") };
        assert!(lib.has_tag("red"));
        assert_eq!(lib.allowed_plan_slugs, vec![PlanSlug::All]);

        let back = serde_json::to_value(&r).unwrap();
        assert_eq!(back["resourceNamespace"], "library");
        assert_eq!(back["resource"]["resourceType"], "libraryStaticImage");
    }

    #[test]
    fn catalog_payload_discriminates_type() {
        let r = Resource::Catalog(CatalogResource {
            id: "gid://shop/Collection/1".into(),
            title: "Summer".into(),
            main_image_src: None,
            allowed_plan_slugs: vec![PlanSlug::All],
            resource: CatalogPayload::Collection { title: "Summer".into() },
        });
        assert_eq!(r.resource_type(), ResourceType::Collection);
        assert_eq!(r.namespace(), Namespace::Catalog);
        assert!(r.preview().is_none());
    }
}
