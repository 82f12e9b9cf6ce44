//! Page behavior configuration.
//!
//! Every field has a default matching the site's markup, so an empty JSON object (or no config
//! file at all) gives the stock behavior.

use crate::highlight::HighlightConfig;
use crate::nav::NavConfig;
use crate::service_worker::SERVICE_WORKER_SCRIPT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The JSON was malformed or had the wrong shape.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Element ids of the search form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFormConfig {
    /// Id of the `<form>`.
    pub form_id: String,
    /// Id of the text `<input>`.
    pub input_id: String,
}

impl Default for SearchFormConfig {
    fn default() -> Self {
        Self {
            form_id: "search-form".to_string(),
            input_id: "search-input".to_string(),
        }
    }
}

/// Complete page behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Search highlighting.
    pub highlight: HighlightConfig,
    /// Navigation bar.
    pub nav: NavConfig,
    /// Search form element ids.
    pub search: SearchFormConfig,
    /// Service worker script registered on load.
    pub service_worker_script: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            highlight: HighlightConfig::default(),
            nav: NavConfig::default(),
            search: SearchFormConfig::default(),
            service_worker_script: SERVICE_WORKER_SCRIPT.to_string(),
        }
    }
}

impl SiteConfig {
    /// Parse a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::MatchMode;

    #[test]
    fn test_empty_object_gives_defaults() {
        assert_eq!(SiteConfig::from_json("{}").unwrap(), SiteConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = SiteConfig::from_json(
            r#"{"highlight": {"marker_class": "hit", "match_mode": "pattern"}}"#,
        )
        .unwrap();
        assert_eq!(config.highlight.marker_class, "hit");
        assert_eq!(config.highlight.marker_tag, "span");
        assert_eq!(config.highlight.match_mode, MatchMode::Pattern);
        assert_eq!(config.search.form_id, "search-form");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        let mut config = SiteConfig::default();
        config.nav.active_class = "current".to_string();
        std::fs::write(&path, config.to_json().unwrap()).unwrap();

        assert_eq!(SiteConfig::load(&path).unwrap(), config);
        assert!(matches!(
            SiteConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
        assert!(matches!(
            SiteConfig::from_json("{"),
            Err(ConfigError::Json(_))
        ));
    }
}
