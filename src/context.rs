//! Per-invocation build context.
//!
//! Everything the original pipeline kept in module-level singletons lives
//! here instead: global config, translation tables, the tool index, the
//! build cache, and the asset version memo. Constructed once per command
//! and passed by reference, so tests can fabricate contexts freely.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::asset::AssetVersions;
use crate::config::{BuildMode, GlobalConfig, Paths};
use crate::data::{BlogPost, ToolIndex, Translations, load_blog_posts};
use crate::freshness::BuildCache;

pub struct BuildContext {
    pub mode: BuildMode,
    pub paths: Paths,
    pub config: GlobalConfig,
    pub tools: ToolIndex,
    pub translations: Arc<Translations>,
    pub blog_posts: Vec<BlogPost>,
    /// Persistent staleness cache. Wrapped in a mutex so the parallel
    /// asset pass serializes its checks.
    pub cache: Mutex<BuildCache>,
    /// Lazily-populated asset fingerprint memo.
    pub versions: Arc<AssetVersions>,
}

impl BuildContext {
    /// Load all build inputs for a project root.
    pub fn load(root: &Path, mode: BuildMode, force: bool) -> Self {
        let paths = Paths::new(root, mode);
        let config = GlobalConfig::load(&paths.global_config());
        let tools = ToolIndex::load(&paths);
        let translations = Arc::new(Translations::load(&paths, &config));
        let blog_posts = load_blog_posts(&paths);
        let cache = Mutex::new(BuildCache::load(&paths, mode, force));
        let versions = Arc::new(AssetVersions::new(&paths.dist));

        Self {
            mode,
            paths,
            config,
            tools,
            translations,
            blog_posts,
            cache,
            versions,
        }
    }

    pub fn locales(&self) -> &[String] {
        &self.config.build.locales
    }

    pub fn default_locale(&self) -> &str {
        &self.config.build.default_locale
    }

    /// Site version string surfaced in templates; falls back to the
    /// generator's own version when the project declares none.
    pub fn site_version(&self) -> &str {
        self.config
            .site_version()
            .unwrap_or(env!("CARGO_PKG_VERSION"))
    }
}
