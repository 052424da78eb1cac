use serde::{Deserialize, Serialize};

/// Top-level origin of a resource. Fixed per picker instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Library,
    Catalog,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Library => "library",
            Namespace::Catalog => "catalog",
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of resource a picker selects. Each kind lives in exactly one namespace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ResourceType {
    LibraryStaticImage,
    Product,
    Collection,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [
        ResourceType::LibraryStaticImage,
        ResourceType::Product,
        ResourceType::Collection,
    ];

    pub fn namespace(&self) -> Namespace {
        match self {
            ResourceType::LibraryStaticImage => Namespace::Library,
            ResourceType::Product | ResourceType::Collection => Namespace::Catalog,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::LibraryStaticImage => "libraryStaticImage",
            ResourceType::Product => "product",
            ResourceType::Collection => "collection",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown resource type: {s}"))
    }
}

/// Selection cardinality.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionType {
    Single,
    #[default]
    Multiple,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModalSize {
    Small,
    Medium,
    #[default]
    Large,
    Fullscreen,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    Card,
    #[default]
    ResourceItem,
}

/// Presentation hints handed to whatever renders a picker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UiSettings {
    pub modal_size: ModalSize,
    pub resource_ui_mode: DisplayMode,
}

/// Data half of a picker's resource configuration. Reported back to the parent
/// alongside every selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSettings {
    pub resource_namespace: Namespace,
    pub resource_type: ResourceType,
    pub selection_type: SelectionType,
}

impl ResourceSettings {
    pub fn new(resource_type: ResourceType, selection_type: SelectionType) -> Self {
        Self {
            resource_namespace: resource_type.namespace(),
            resource_type,
            selection_type,
        }
    }
}
