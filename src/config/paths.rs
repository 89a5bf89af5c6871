//! Project path resolution.
//!
//! All source and output locations derive from the project root and the
//! active build mode. Nothing here touches the filesystem; existence checks
//! belong to the callers.

use std::path::{Path, PathBuf};

use super::mode::BuildMode;

/// Resolved project paths for one build invocation.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Project root directory.
    pub root: PathBuf,
    /// Site source tree (`{root}/src`).
    pub src: PathBuf,
    /// Output tree for the active mode (`dist` or `dist-dev`).
    pub dist: PathBuf,
    /// Asset output tree (`{dist}/assets`).
    pub assets_dist: PathBuf,
    /// Persistent build cache file.
    pub cache_file: PathBuf,
}

impl Paths {
    pub fn new(root: impl Into<PathBuf>, mode: BuildMode) -> Self {
        let root = root.into();
        let src = root.join("src");
        let dist = root.join(mode.dist_dir_name());
        let assets_dist = dist.join("assets");
        let cache_file = root.join(".build-cache.yaml");
        Self {
            root,
            src,
            dist,
            assets_dist,
            cache_file,
        }
    }

    /// Global site configuration file.
    pub fn global_config(&self) -> PathBuf {
        self.src.join("data").join("global.yaml")
    }

    /// Per-feature source tree.
    pub fn features_dir(&self) -> PathBuf {
        self.src.join("features")
    }

    /// Shared page tree (non-feature pages).
    pub fn pages_dir(&self) -> PathBuf {
        self.src.join("pages")
    }

    /// Shared template partials and the page layout.
    pub fn includes_dir(&self) -> PathBuf {
        self.src.join("includes")
    }

    /// Project-level root templates (sitemap, robots, ...).
    pub fn templates_dir(&self) -> PathBuf {
        self.src.join("templates")
    }

    /// Locale sources (legacy files and per-locale module dirs).
    pub fn locales_dir(&self) -> PathBuf {
        self.src.join("locales")
    }

    /// Global asset sources.
    pub fn assets_src(&self) -> PathBuf {
        self.src.join("assets")
    }

    /// A feature's configuration file.
    pub fn tool_config(&self, feature: &str) -> PathBuf {
        self.features_dir().join(feature).join("tool.yaml")
    }

    /// Relative path of `path` under the source tree, used for cache keys.
    ///
    /// Paths outside the source tree fall back to the full path so they
    /// still get a stable, unique key.
    pub fn rel_to_src(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.src).unwrap_or(path);
        rel.to_string_lossy().replace('\\', "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_selects_dist_dir() {
        let dev = Paths::new("/proj", BuildMode::Dev);
        let secure = Paths::new("/proj", BuildMode::Secure);
        assert!(dev.dist.ends_with("dist-dev"));
        assert!(secure.dist.ends_with("dist"));
        assert_eq!(dev.cache_file, secure.cache_file);
    }

    #[test]
    fn test_rel_to_src() {
        let paths = Paths::new("/proj", BuildMode::Dev);
        let rel = paths.rel_to_src(Path::new("/proj/src/assets/css/app.css"));
        assert_eq!(rel, "assets/css/app.css");
    }
}
