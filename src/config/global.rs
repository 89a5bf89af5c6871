//! Global site configuration (`src/data/global.yaml`).
//!
//! The decoder is tolerant: absent fields take defaults and a malformed
//! document falls back to the built-in configuration with a warning. A
//! broken `global.yaml` must never abort a build.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::log;

use super::deploy::DeploymentConfig;

/// Root structure of `global.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Site metadata, passed through to templates untouched.
    pub site: BTreeMap<String, serde_yaml::Value>,

    /// Build settings (locales, entry point).
    pub build: BuildSection,

    /// Category metadata keyed by category id.
    pub categories: BTreeMap<String, serde_yaml::Value>,

    /// Display order for categories.
    pub category_order: Vec<String>,

    /// Deployment defaults.
    pub deployment: DeploymentConfig,
}

/// `build:` section of the global configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Supported locale codes; one full page tree is rendered per entry.
    pub locales: Vec<String>,

    /// Locale the root redirect points at.
    pub default_locale: String,

    /// Optional entry-point path appended to the root redirect
    /// (e.g. "blog" redirects to `/{default_locale}/blog/`).
    pub entry_point: Option<String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            locales: vec!["vi".to_string(), "en".to_string()],
            default_locale: "vi".to_string(),
            entry_point: None,
        }
    }
}

impl GlobalConfig {
    /// Load the global configuration, falling back to defaults on any
    /// read or parse failure. Never errors.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match serde_yaml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                log!("config"; "could not parse {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Site version string, if the project declares one under `site.version`.
    pub fn site_version(&self) -> Option<&str> {
        self.site.get("version").and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_missing() {
        let config = GlobalConfig::load(Path::new("/nonexistent/global.yaml"));
        assert_eq!(config.build.locales, vec!["vi", "en"]);
        assert_eq!(config.build.default_locale, "vi");
        assert!(config.site.is_empty());
    }

    #[test]
    fn test_defaults_when_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("global.yaml");
        fs::write(&path, "site: [unbalanced").unwrap();

        let config = GlobalConfig::load(&path);
        assert_eq!(config.build.default_locale, "vi");
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("global.yaml");
        fs::write(
            &path,
            "site:\n  title: Example\nbuild:\n  locales: [en, fr]\n  default_locale: en\n",
        )
        .unwrap();

        let config = GlobalConfig::load(&path);
        assert_eq!(config.build.locales, vec!["en", "fr"]);
        assert_eq!(config.build.default_locale, "en");
        assert_eq!(
            config.site.get("title").and_then(|v| v.as_str()),
            Some("Example")
        );
        assert_eq!(config.deployment.branch, "gh-pages");
    }
}
