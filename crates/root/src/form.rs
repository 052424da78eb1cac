//! Spawn Form: UI configuration staged before spawning a picker.

use picker_core::{DisplayMode, ModalSize, ResourceType, SelectionType, UiSettings};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::RootError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnForm {
    pub resource_type: ResourceType,
    pub resource_selection_type: SelectionType,
    pub ui_settings: UiSettings,
}

impl Default for SpawnForm {
    fn default() -> Self {
        Self {
            resource_type: ResourceType::Product,
            resource_selection_type: SelectionType::Multiple,
            ui_settings: UiSettings { modal_size: ModalSize::Large, resource_ui_mode: DisplayMode::ResourceItem },
        }
    }
}

/// One recognised form field edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnFormEdit {
    ResourceType(ResourceType),
    SelectionType(SelectionType),
    ModalSize(ModalSize),
    DisplayMode(DisplayMode),
}

impl SpawnFormEdit {
    pub const PATHS: [&'static str; 4] =
        ["resourceType", "resourceSelectionType", "uiSettings.modalSize", "uiSettings.resourceUiMode"];

    /// Dotted path of the edited field, as in the form's wire shape.
    pub fn path(&self) -> &'static str {
        match self {
            SpawnFormEdit::ResourceType(_) => Self::PATHS[0],
            SpawnFormEdit::SelectionType(_) => Self::PATHS[1],
            SpawnFormEdit::ModalSize(_) => Self::PATHS[2],
            SpawnFormEdit::DisplayMode(_) => Self::PATHS[3],
        }
    }

    /// Parse a `path=value` pair into an edit. Unknown paths are rejected.
    pub fn parse(path: &str, value: &str) -> Result<Self, RootError> {
        match path {
            "resourceType" => parse_value(path, value).map(SpawnFormEdit::ResourceType),
            "resourceSelectionType" => parse_value(path, value).map(SpawnFormEdit::SelectionType),
            "uiSettings.modalSize" => parse_value(path, value).map(SpawnFormEdit::ModalSize),
            "uiSettings.resourceUiMode" => parse_value(path, value).map(SpawnFormEdit::DisplayMode),
            other => Err(RootError::UnknownField(other.to_string())),
        }
    }
}

fn parse_value<T: DeserializeOwned>(path: &str, value: &str) -> Result<T, RootError> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| RootError::InvalidValue { path: path.to_string(), value: value.to_string() })
}

impl SpawnForm {
    pub fn apply(&mut self, edit: SpawnFormEdit) {
        match edit {
            SpawnFormEdit::ResourceType(t) => self.resource_type = t,
            SpawnFormEdit::SelectionType(s) => self.resource_selection_type = s,
            SpawnFormEdit::ModalSize(m) => self.ui_settings.modal_size = m,
            SpawnFormEdit::DisplayMode(d) => self.ui_settings.resource_ui_mode = d,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_edits_touch_only_their_field() {
        let mut form = SpawnForm::default();
        form.apply(SpawnFormEdit::parse("uiSettings.modalSize", "small").unwrap());
        assert_eq!(form.ui_settings.modal_size, ModalSize::Small);
        assert_eq!(form.ui_settings.resource_ui_mode, DisplayMode::ResourceItem);
        assert_eq!(form.resource_type, ResourceType::Product);

        form.apply(SpawnFormEdit::parse("resourceType", "libraryStaticImage").unwrap());
        form.apply(SpawnFormEdit::parse("uiSettings.resourceUiMode", "card").unwrap());
        assert_eq!(form.resource_type, ResourceType::LibraryStaticImage);
        assert_eq!(form.ui_settings.resource_ui_mode, DisplayMode::Card);
    }

    #[test]
    fn bad_paths_and_values_are_rejected() {
        assert_eq!(SpawnFormEdit::parse("uiSettings", "x"), Err(RootError::UnknownField("uiSettings".into())));
        assert!(matches!(
            SpawnFormEdit::parse("resourceSelectionType", "many"),
            Err(RootError::InvalidValue { .. })
        ));
    }
}
