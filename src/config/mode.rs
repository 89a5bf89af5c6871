//! Build mode selection: development vs secure (minified/obfuscated) output.

use serde::{Deserialize, Serialize};

/// Build variant. Secure mode minifies CSS and obfuscates JS; dev mode
/// copies sources verbatim for fast iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildMode {
    Dev,
    Secure,
}

impl BuildMode {
    /// Cache key namespace for this mode.
    ///
    /// Every cache key is prefixed so switching modes never marks files
    /// from the other variant as stale (or fresh) by accident.
    pub const fn cache_namespace(self) -> &'static str {
        match self {
            BuildMode::Dev => "dev/",
            BuildMode::Secure => "prod/",
        }
    }

    /// Output directory name for this mode.
    pub const fn dist_dir_name(self) -> &'static str {
        match self {
            BuildMode::Dev => "dist-dev",
            BuildMode::Secure => "dist",
        }
    }

    pub const fn is_secure(self) -> bool {
        matches!(self, BuildMode::Secure)
    }
}

impl std::fmt::Display for BuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildMode::Dev => write!(f, "dev"),
            BuildMode::Secure => write!(f, "secure"),
        }
    }
}
