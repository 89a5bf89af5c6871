//! Feature/tool descriptors (`features/*/tool.yaml`).
//!
//! A tool descriptor is loaded fresh every build and never mutated by the
//! build itself; maintenance commands (version bump, cleanup, scaffold)
//! rewrite the files between builds.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, Paths};
use crate::log;

/// One feature's configuration file.
///
/// Unrecognized keys pass through in `extra` for later consumption by
/// templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Identifier; defaults to the containing directory name.
    pub id: String,

    pub category: Option<String>,
    pub icon: Option<String>,
    pub title_key: Option<String>,
    pub desc_key: Option<String>,

    /// Lifecycle status. Absent means the tool has not declared one;
    /// only an explicit `draft` qualifies for cleanup.
    pub status: Option<ToolStatus>,

    /// Site link; defaults to `/{id}/`.
    pub link: Option<String>,

    pub mode: ToolMode,

    pub meta: ToolMeta,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Active,
    Draft,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    #[default]
    Standard,
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolMeta {
    pub version: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for ToolMeta {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            extra: BTreeMap::new(),
        }
    }
}

impl ToolConfig {
    pub fn is_active(&self) -> bool {
        self.status == Some(ToolStatus::Active)
    }

    pub fn is_draft(&self) -> bool {
        self.status == Some(ToolStatus::Draft)
    }

    /// Parse a tool.yaml, defaulting identifier and link from the feature
    /// directory name.
    pub fn from_file(path: &Path, feature: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let mut config: ToolConfig = if content.trim().is_empty() {
            ToolConfig::default()
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| ConfigError::Yaml(path.to_path_buf(), e))?
        };
        if config.id.is_empty() {
            config.id = feature.to_string();
        }
        if config.link.is_none() {
            config.link = Some(format!("/{feature}/"));
        }
        Ok(config)
    }
}

/// All loaded tools plus derived groupings.
#[derive(Debug, Clone, Default)]
pub struct ToolIndex {
    /// Sorted by id for deterministic iteration.
    pub tools: Vec<ToolConfig>,
}

impl ToolIndex {
    /// Scan the features directory for tool descriptors.
    ///
    /// A parse error for one feature is logged and that feature skipped;
    /// it never aborts the whole load.
    pub fn load(paths: &Paths) -> Self {
        let features_dir = paths.features_dir();
        let mut tools = Vec::new();

        for feature in list_feature_dirs(&features_dir) {
            let config_path = features_dir.join(&feature).join("tool.yaml");
            if !config_path.is_file() {
                continue;
            }
            match ToolConfig::from_file(&config_path, &feature) {
                Ok(config) => tools.push(config),
                Err(e) => {
                    log!("error"; "error parsing {feature}/tool.yaml: {e}");
                }
            }
        }

        tools.sort_by(|a, b| a.id.cmp(&b.id));
        Self { tools }
    }

    pub fn get(&self, id: &str) -> Option<&ToolConfig> {
        self.tools.iter().find(|t| t.id == id)
    }

    /// Category id → tools in that category; uncategorized tools land
    /// under `other`.
    pub fn by_category(&self) -> BTreeMap<&str, Vec<&ToolConfig>> {
        let mut categories: BTreeMap<&str, Vec<&ToolConfig>> = BTreeMap::new();
        for tool in &self.tools {
            let cat = tool.category.as_deref().unwrap_or("other");
            categories.entry(cat).or_default().push(tool);
        }
        categories
    }

    /// Id → tool map for direct lookups in templates.
    pub fn by_id(&self) -> BTreeMap<&str, &ToolConfig> {
        self.tools.iter().map(|t| (t.id.as_str(), t)).collect()
    }
}

/// Subdirectory names of the features dir, sorted for determinism.
pub fn list_feature_dirs(features_dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(features_dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    dirs.sort();
    dirs
}
