//! Workspace cleanup: build artifacts and, on request, draft features.

use std::path::Path;

use anyhow::Result;

use crate::config::{BuildMode, Paths};
use crate::data::{ToolConfig, list_feature_dirs};
use crate::log;
use crate::utils::fs::remove_dir_if_exists;

pub fn run(root: &Path, drafts: bool) -> Result<()> {
    log!("cleanup"; "cleaning up workspace...");

    remove_dir_if_exists(&root.join("dist"))?;
    remove_dir_if_exists(&root.join("dist-dev"))?;
    log!("cleanup"; "removed dist/ and dist-dev/");

    if drafts {
        remove_draft_features(root)?;
    }

    log!("cleanup"; "workspace is clean");
    Ok(())
}

/// Delete exactly the feature directories whose config says `status: draft`.
/// Features without a tool.yaml are left alone.
fn remove_draft_features(root: &Path) -> Result<()> {
    let paths = Paths::new(root, BuildMode::Dev);
    for id in list_feature_dirs(&paths.features_dir()) {
        let config_path = paths.tool_config(&id);
        if !config_path.is_file() {
            continue;
        }
        let Ok(config) = ToolConfig::from_file(&config_path, &id) else {
            continue;
        };
        if config.is_draft() {
            remove_dir_if_exists(&paths.features_dir().join(&id))?;
            log!("cleanup"; "deleted draft tool: {id}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_removes_dist_folders() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("dist/en")).unwrap();
        fs::create_dir_all(dir.path().join("dist-dev/en")).unwrap();

        run(dir.path(), false).unwrap();
        assert!(!dir.path().join("dist").exists());
        assert!(!dir.path().join("dist-dev").exists());
    }

    #[test]
    fn test_drafts_flag_removes_only_draft_features() {
        let dir = TempDir::new().unwrap();
        let features = dir.path().join("src/features");
        for (id, status) in [("alpha", "active"), ("beta", "draft")] {
            fs::create_dir_all(features.join(id)).unwrap();
            fs::write(
                features.join(id).join("tool.yaml"),
                format!("status: {status}\n"),
            )
            .unwrap();
        }
        fs::create_dir_all(features.join("no-config")).unwrap();

        run(dir.path(), true).unwrap();
        assert!(features.join("alpha").exists());
        assert!(!features.join("beta").exists());
        assert!(features.join("no-config").exists());
    }

    #[test]
    fn test_without_flag_drafts_survive() {
        let dir = TempDir::new().unwrap();
        let features = dir.path().join("src/features/beta");
        fs::create_dir_all(&features).unwrap();
        fs::write(features.join("tool.yaml"), "status: draft\n").unwrap();

        run(dir.path(), false).unwrap();
        assert!(features.exists());
    }
}
