//! Asset version fingerprints for cache busting.
//!
//! Maps output-relative asset paths to the first 8 hex characters of the
//! **destination** file's content digest. The memo is filled lazily the
//! first time a page references an asset and lives only for the current
//! process; it is never persisted.

use std::path::PathBuf;

use dashmap::DashMap;

use crate::freshness::compute_bytes_hash;

/// Lazily-populated dest-relative path → 8-hex fingerprint memo.
#[derive(Debug)]
pub struct AssetVersions {
    dist: PathBuf,
    memo: DashMap<String, String>,
}

impl AssetVersions {
    pub fn new(dist: impl Into<PathBuf>) -> Self {
        Self {
            dist: dist.into(),
            memo: DashMap::new(),
        }
    }

    /// Fingerprint for an output-relative path; empty when the destination
    /// file does not exist (yet). Missing files are not memoized so a later
    /// write is picked up.
    pub fn get(&self, rel: &str) -> String {
        if let Some(hit) = self.memo.get(rel) {
            return hit.clone();
        }
        let full = self.dist.join(rel);
        let Ok(content) = std::fs::read(&full) else {
            return String::new();
        };
        let fingerprint = compute_bytes_hash(&content).fingerprint();
        self.memo.insert(rel.to_string(), fingerprint.clone());
        fingerprint
    }

    /// Append `?h={fingerprint}` to a URL when the asset exists.
    pub fn versioned_url(&self, url: &str, rel: &str) -> String {
        let fingerprint = self.get(rel);
        if fingerprint.is_empty() {
            url.to_string()
        } else {
            format!("{url}?h={fingerprint}")
        }
    }

    pub fn clear(&self) {
        self.memo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freshness::compute_bytes_hash;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fingerprint_from_destination_content() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("assets/css")).unwrap();
        fs::write(dir.path().join("assets/css/app.css"), "a{}").unwrap();

        let versions = AssetVersions::new(dir.path());
        let fingerprint = versions.get("assets/css/app.css");
        assert_eq!(fingerprint, compute_bytes_hash("a{}").fingerprint());
        assert_eq!(fingerprint.len(), 8);
    }

    #[test]
    fn test_memoized_for_process_lifetime() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.js"), "let a=1;").unwrap();

        let versions = AssetVersions::new(dir.path());
        let first = versions.get("app.js");

        // Rewriting the file does not move the memoized fingerprint
        fs::write(dir.path().join("app.js"), "let b=2;").unwrap();
        assert_eq!(versions.get("app.js"), first);

        versions.clear();
        assert_ne!(versions.get("app.js"), first);
    }

    #[test]
    fn test_missing_asset_yields_bare_url() {
        let dir = TempDir::new().unwrap();
        let versions = AssetVersions::new(dir.path());
        assert_eq!(versions.get("nope.css"), "");
        assert_eq!(versions.versioned_url("../nope.css", "nope.css"), "../nope.css");
    }

    #[test]
    fn test_versioned_url_format() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("style.css"), "b{}").unwrap();

        let versions = AssetVersions::new(dir.path());
        let url = versions.versioned_url("./style.css", "style.css");
        let expected = compute_bytes_hash("b{}").fingerprint();
        assert_eq!(url, format!("./style.css?h={expected}"));
    }
}
