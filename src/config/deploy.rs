//! `deployment:` section of the global configuration.
//!
//! Final settings are resolved in increasing precedence: built-in defaults,
//! then `global.yaml`, then CLI flags.

use serde::{Deserialize, Serialize};

/// Deployment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Target branch on the remote.
    pub branch: String,

    /// Remote name or URL to push to.
    pub remote: String,

    /// Build output folder to publish.
    ///
    /// `folder` is accepted as a legacy spelling.
    #[serde(alias = "folder")]
    pub dist_folder: String,

    /// Push strategy: fresh repo force-push or git subtree.
    pub strategy: DeployStrategy,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            branch: "gh-pages".to_string(),
            remote: "origin".to_string(),
            dist_folder: "dist".to_string(),
            strategy: DeployStrategy::Init,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeployStrategy {
    /// Initialize a throwaway repo inside the dist folder and force-push it.
    /// Suits publishing into an external repository.
    Init,
    /// `git subtree push` from the project repo. Suits same-repo gh-pages.
    Subtree,
}

/// CLI-side overrides for deployment settings.
#[derive(Debug, Clone, Default)]
pub struct DeployOverrides {
    pub branch: Option<String>,
    pub remote: Option<String>,
    pub dist_folder: Option<String>,
    pub strategy: Option<DeployStrategy>,
}

impl DeploymentConfig {
    /// Apply CLI overrides on top of the configured values.
    pub fn with_overrides(&self, overrides: &DeployOverrides) -> Self {
        Self {
            branch: overrides.branch.clone().unwrap_or_else(|| self.branch.clone()),
            remote: overrides.remote.clone().unwrap_or_else(|| self.remote.clone()),
            dist_folder: overrides
                .dist_folder
                .clone()
                .unwrap_or_else(|| self.dist_folder.clone()),
            strategy: overrides.strategy.unwrap_or(self.strategy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_alias() {
        let config: DeploymentConfig =
            serde_yaml::from_str("folder: public\nbranch: main\n").unwrap();
        assert_eq!(config.dist_folder, "public");
        assert_eq!(config.branch, "main");
        assert_eq!(config.remote, "origin");
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = DeploymentConfig::default();
        let merged = config.with_overrides(&DeployOverrides {
            branch: Some("prod".to_string()),
            strategy: Some(DeployStrategy::Subtree),
            ..DeployOverrides::default()
        });
        assert_eq!(merged.branch, "prod");
        assert_eq!(merged.remote, "origin");
        assert_eq!(merged.strategy, DeployStrategy::Subtree);
    }
}
