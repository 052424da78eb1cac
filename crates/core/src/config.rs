//! Runtime tunables, read from `PICKER_*` environment variables.

use std::time::Duration;

use crate::{query::DEFAULT_PAGE_SIZE, resource::DEFAULT_LOCALE};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: expected {expected}, got {value:?}")]
    Invalid { var: &'static str, expected: &'static str, value: String },
}

/// Timing and paging knobs shared by every picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tunables {
    /// Quiet period after the last query edit before a search is issued.
    pub debounce_ms: u64,
    /// Pause after a load-more page lands before editing resumes.
    pub settle_ms: u64,
    pub page_size: u32,
    pub locale: String,
}

impl Default for Tunables {
    fn default() -> Self {
        Self { debounce_ms: 500, settle_ms: 200, page_size: DEFAULT_PAGE_SIZE, locale: DEFAULT_LOCALE.to_string() }
    }
}

impl Tunables {
    pub fn debounce(&self) -> Duration { Duration::from_millis(self.debounce_ms) }
    pub fn settle(&self) -> Duration { Duration::from_millis(self.settle_ms) }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary variable lookup; absent variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut t = Self::default();
        if let Some(v) = lookup("PICKER_DEBOUNCE_MS") {
            t.debounce_ms = parse_num("PICKER_DEBOUNCE_MS", &v)?;
        }
        if let Some(v) = lookup("PICKER_SETTLE_MS") {
            t.settle_ms = parse_num("PICKER_SETTLE_MS", &v)?;
        }
        if let Some(v) = lookup("PICKER_PAGE_SIZE") {
            let n: u32 = parse_num("PICKER_PAGE_SIZE", &v)?;
            if n == 0 {
                return Err(ConfigError::Invalid { var: "PICKER_PAGE_SIZE", expected: "positive integer", value: v });
            }
            t.page_size = n;
        }
        if let Some(v) = lookup("PICKER_LOCALE") {
            if v.trim().is_empty() {
                return Err(ConfigError::Invalid { var: "PICKER_LOCALE", expected: "locale tag", value: v });
            }
            t.locale = v;
        }
        Ok(t)
    }
}

fn parse_num<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        var,
        expected: "non-negative integer",
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| m.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let t = Tunables::from_lookup(lookup(&[])).unwrap();
        assert_eq!(t, Tunables::default());
        assert_eq!(t.debounce(), Duration::from_millis(500));
        assert_eq!(t.settle(), Duration::from_millis(200));
    }

    #[test]
    fn overrides_and_rejects_garbage() {
        let t = Tunables::from_lookup(lookup(&[("PICKER_DEBOUNCE_MS", "250"), ("PICKER_PAGE_SIZE", "25")])).unwrap();
        assert_eq!(t.debounce_ms, 250);
        assert_eq!(t.page_size, 25);

        let err = Tunables::from_lookup(lookup(&[("PICKER_PAGE_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PICKER_PAGE_SIZE", .. }));
        assert!(Tunables::from_lookup(lookup(&[("PICKER_SETTLE_MS", "soon")])).is_err());
    }
}
