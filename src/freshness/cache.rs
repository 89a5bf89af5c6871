//! Persistent build cache: a content-digest map surviving across runs.
//!
//! Keys are `{mode}/{prefix}{path-relative-to-src}`, values are full hex
//! digests. The cache is read once at startup, mutated in memory, and
//! written back atomically at the end of a successful build. A crashed
//! build simply leaves the old file in place, so the next run re-detects
//! the unwritten changes.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;

use crate::config::{BuildMode, Paths};
use crate::log;

use super::hash::compute_file_hash;

/// Key → digest map, partitioned by build mode.
pub struct BuildCache {
    entries: FxHashMap<String, String>,
    namespace: &'static str,
    force: bool,
    paths: Paths,
}

impl BuildCache {
    /// Load the cache file, starting fresh if it is missing or malformed.
    pub fn load(paths: &Paths, mode: BuildMode, force: bool) -> Self {
        let entries = match std::fs::read_to_string(&paths.cache_file) {
            Ok(content) => match serde_yaml::from_str::<FxHashMap<String, String>>(&content) {
                Ok(map) => map,
                Err(_) => {
                    log!("cache"; "failed to load build cache, starting fresh");
                    FxHashMap::default()
                }
            },
            Err(_) => FxHashMap::default(),
        };

        Self {
            entries,
            namespace: mode.cache_namespace(),
            force,
            paths: paths.clone(),
        }
    }

    fn key_for(&self, path: &Path, key_prefix: &str) -> String {
        format!(
            "{}{}{}",
            self.namespace,
            key_prefix,
            self.paths.rel_to_src(path)
        )
    }

    /// Report whether `path` changed since the stored digest.
    ///
    /// Returns true unconditionally when force-rebuild is set, when the
    /// path does not exist, or when it is a directory. Otherwise the file's
    /// digest is compared against the stored entry; when `update` is set a
    /// differing digest replaces the entry as a side effect of the check.
    pub fn has_changed(&mut self, path: &Path, key_prefix: &str, update: bool) -> bool {
        if self.force {
            return true;
        }
        if !path.exists() || path.is_dir() {
            return true;
        }

        let current = compute_file_hash(path).to_hex();
        let key = self.key_for(path, key_prefix);

        if self.entries.get(&key).map(String::as_str) != Some(current.as_str()) {
            if update {
                self.entries.insert(key, current);
            }
            return true;
        }
        false
    }

    /// Persist the whole map, overwriting any prior contents.
    ///
    /// Written to a sibling temp file first, then renamed into place, so a
    /// crash mid-write cannot truncate the previous cache.
    pub fn save(&self) -> Result<()> {
        // Sorted dump keeps the file diffable
        let sorted: BTreeMap<&str, &str> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let content = serde_yaml::to_string(&sorted).context("serializing build cache")?;

        let tmp = self.paths.cache_file.with_extension("yaml.tmp");
        std::fs::write(&tmp, content)
            .with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.paths.cache_file)
            .with_context(|| format!("renaming into {}", self.paths.cache_file.display()))?;
        Ok(())
    }

    /// Stored digest for a key, mainly for tests and diagnostics.
    pub fn digest(&self, path: &Path, key_prefix: &str) -> Option<&str> {
        self.entries
            .get(&self.key_for(path, key_prefix))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
