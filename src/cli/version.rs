//! Semver bumps for feature versions.
//!
//! Operates on the raw YAML document rather than the typed config so
//! unknown fields survive the rewrite.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde_yaml::{Mapping, Value};

use super::args::BumpLevel;
use crate::config::{BuildMode, Paths};
use crate::data::list_feature_dirs;
use crate::log;

pub fn run(root: &Path, level: BumpLevel, target: Option<&str>) -> Result<()> {
    let paths = Paths::new(root, BuildMode::Dev);

    for id in list_feature_dirs(&paths.features_dir()) {
        if let Some(target) = target
            && target != "all"
            && target != id
        {
            continue;
        }

        let config_path = paths.tool_config(&id);
        if !config_path.is_file() {
            continue;
        }

        let raw = fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        let mut doc: Value = serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing {}", config_path.display()))?;

        let meta = ensure_meta(&mut doc);
        let old = meta
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or("1.0.0")
            .to_string();
        let new = bump(&old, level);
        meta.insert("version".into(), Value::String(new.clone()));

        let yaml = serde_yaml::to_string(&doc)?;
        fs::write(&config_path, yaml)
            .with_context(|| format!("writing {}", config_path.display()))?;
        log!("version"; "{id:<25} : {old} -> {new}");
    }
    Ok(())
}

/// Get or create the `meta` mapping inside the document.
fn ensure_meta(doc: &mut Value) -> &mut Mapping {
    if !doc.is_mapping() {
        *doc = Value::Mapping(Mapping::new());
    }
    let map = doc.as_mapping_mut().unwrap();
    let key = Value::String("meta".to_string());
    if !map.get(&key).is_some_and(Value::is_mapping) {
        map.insert(key.clone(), Value::Mapping(Mapping::new()));
    }
    map.get_mut(&key).and_then(Value::as_mapping_mut).unwrap()
}

/// Bump a `major.minor.patch` string; malformed components count as 0.
fn bump(version: &str, level: BumpLevel) -> String {
    let mut parts = version.split('.').map(|p| p.parse::<u64>().unwrap_or(0));
    let (mut major, mut minor, mut patch) = (
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    );

    match level {
        BumpLevel::Major => {
            major += 1;
            minor = 0;
            patch = 0;
        }
        BumpLevel::Minor => {
            minor += 1;
            patch = 0;
        }
        BumpLevel::Patch => patch += 1,
    }
    format!("{major}.{minor}.{patch}")
}
