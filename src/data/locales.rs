//! Translation tables: per-locale message trees merged from three tiers.
//!
//! In increasing precedence:
//! 1. a legacy flat file `locales/{lang}.json`
//! 2. per-locale module files `locales/{lang}/*.{yaml,yml,json}`
//! 3. per-feature bundles `features/*/locales/{lang}.yaml`
//!
//! Tiers 1 and 2 assign top-level keys; feature bundles are deep-merged so
//! two features can contribute keys under the same top-level namespace
//! without clobbering each other.

use rustc_hash::FxHashMap;
use serde_yaml::{Mapping, Value};

use crate::config::{GlobalConfig, Paths};
use crate::data::tools::list_feature_dirs;
use crate::log;

/// Locale code → nested message tree.
#[derive(Debug, Clone, Default)]
pub struct Translations {
    tables: FxHashMap<String, Value>,
}

impl Translations {
    /// Build tables for every configured locale.
    pub fn load(paths: &Paths, config: &GlobalConfig) -> Self {
        let mut tables = FxHashMap::default();
        for lang in &config.build.locales {
            tables.insert(lang.clone(), load_locale(paths, lang));
        }
        Self { tables }
    }

    /// Resolve a dotted key; a missing segment falls back to the key string
    /// itself. Never an error.
    pub fn get<'a>(&'a self, key: &'a str, locale: &str) -> &'a str {
        let mut current = match self.tables.get(locale) {
            Some(v) => v,
            None => return key,
        };
        for segment in key.split('.') {
            current = match current.get(segment) {
                Some(v) => v,
                None => return key,
            };
        }
        current.as_str().unwrap_or(key)
    }
}

/// Merge a single locale's three tiers into one tree.
fn load_locale(paths: &Paths, lang: &str) -> Value {
    let mut table = Mapping::new();
    let locales_dir = paths.locales_dir();

    // 1. Legacy flat file
    let legacy = locales_dir.join(format!("{lang}.json"));
    if legacy.is_file() {
        match read_json_value(&legacy) {
            Ok(value) => assign_top_level(&mut table, value),
            Err(e) => log!("locales"; "error loading legacy locale {lang}: {e}"),
        }
    }

    // 2. Per-locale module files
    let module_dir = locales_dir.join(lang);
    if module_dir.is_dir() {
        for file in sorted_files(&module_dir) {
            let parsed = match file.extension().and_then(|e| e.to_str()) {
                Some("json") => read_json_value(&file),
                Some("yaml" | "yml") => read_yaml_value(&file),
                _ => continue,
            };
            match parsed {
                Ok(value) => assign_top_level(&mut table, value),
                Err(e) => {
                    log!("locales"; "error loading locale module {lang}/{}: {e}",
                        file.file_name().unwrap_or_default().to_string_lossy());
                }
            }
        }
    }

    // 3. Feature bundles, deep-merged
    let features_dir = paths.features_dir();
    let mut merged = Value::Mapping(table);
    for feature in list_feature_dirs(&features_dir) {
        let bundle = features_dir
            .join(&feature)
            .join("locales")
            .join(format!("{lang}.yaml"));
        if !bundle.is_file() {
            continue;
        }
        match read_yaml_value(&bundle) {
            Ok(value) => deep_merge(&mut merged, &value),
            Err(e) => log!("locales"; "error loading feature locale {feature}/{lang}.yaml: {e}"),
        }
    }

    merged
}

/// Recursive key-wise merge: nested mappings merge, anything else is
/// overwritten by the source. Later sources win overlapping leaves.
pub fn deep_merge(target: &mut Value, source: &Value) {
    let Value::Mapping(source_map) = source else {
        *target = source.clone();
        return;
    };
    if !target.is_mapping() {
        *target = Value::Mapping(Mapping::new());
    }
    let target_map = target.as_mapping_mut().expect("target forced to mapping");

    for (key, source_value) in source_map {
        if source_value.is_mapping() {
            let slot = target_map
                .entry(key.clone())
                .or_insert_with(|| Value::Mapping(Mapping::new()));
            deep_merge(slot, source_value);
        } else {
            target_map.insert(key.clone(), source_value.clone());
        }
    }
}

/// Shallow top-level assignment (tiers 1 and 2).
fn assign_top_level(target: &mut Mapping, source: Value) {
    if let Value::Mapping(source_map) = source {
        for (key, value) in source_map {
            target.insert(key, value);
        }
    }
}

fn read_yaml_value(path: &std::path::Path) -> anyhow::Result<Value> {
    Ok(serde_yaml::from_str(&std::fs::read_to_string(path)?)?)
}

fn read_json_value(path: &std::path::Path) -> anyhow::Result<Value> {
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    Ok(serde_yaml::to_value(json)?)
}

fn sorted_files(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildMode;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Paths, GlobalConfig) {
        let dir = TempDir::new().unwrap();
        let paths = Paths::new(dir.path(), BuildMode::Dev);
        let mut config = GlobalConfig::default();
        config.build.locales = vec!["en".to_string()];
        config.build.default_locale = "en".to_string();
        (dir, paths, config)
    }

    #[test]
    fn test_missing_key_falls_back_to_key() {
        let (_dir, paths, config) = setup();
        let translations = Translations::load(&paths, &config);
        assert_eq!(translations.get("nav.menu_job", "en"), "nav.menu_job");
        assert_eq!(translations.get("anything", "xx"), "anything");
    }

    #[test]
    fn test_module_file_lookup() {
        let (_dir, paths, config) = setup();
        let module_dir = paths.locales_dir().join("en");
        fs::create_dir_all(&module_dir).unwrap();
        fs::write(module_dir.join("nav.yaml"), "nav:\n  menu_job: Jobs\n").unwrap();

        let translations = Translations::load(&paths, &config);
        assert_eq!(translations.get("nav.menu_job", "en"), "Jobs");
    }

    #[test]
    fn test_feature_bundles_deep_merge_non_overlapping() {
        let (_dir, paths, config) = setup();
        for (feature, yaml) in [
            ("bmi", "tools:\n  bmi:\n    title: BMI\n"),
            ("tax", "tools:\n  tax:\n    title: Tax\n"),
        ] {
            let dir = paths.features_dir().join(feature).join("locales");
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("en.yaml"), yaml).unwrap();
        }

        let translations = Translations::load(&paths, &config);
        // Both features contribute under the shared `tools` namespace
        assert_eq!(translations.get("tools.bmi.title", "en"), "BMI");
        assert_eq!(translations.get("tools.tax.title", "en"), "Tax");
    }

    #[test]
    fn test_overlapping_leaf_won_by_last_merge() {
        let (_dir, paths, config) = setup();
        // Features merge in sorted directory order: "aardvark" then "zebra"
        for (feature, value) in [("aardvark", "First"), ("zebra", "Second")] {
            let dir = paths.features_dir().join(feature).join("locales");
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("en.yaml"), format!("shared:\n  label: {value}\n")).unwrap();
        }

        let translations = Translations::load(&paths, &config);
        assert_eq!(translations.get("shared.label", "en"), "Second");
    }

    #[test]
    fn test_legacy_json_tier_lowest_precedence() {
        let (_dir, paths, config) = setup();
        fs::create_dir_all(paths.locales_dir()).unwrap();
        fs::write(
            paths.locales_dir().join("en.json"),
            r#"{"meta": {"title": "Legacy"}, "only_legacy": "kept"}"#,
        )
        .unwrap();
        let module_dir = paths.locales_dir().join("en");
        fs::create_dir_all(&module_dir).unwrap();
        fs::write(module_dir.join("meta.yaml"), "meta:\n  title: Modern\n").unwrap();

        let translations = Translations::load(&paths, &config);
        assert_eq!(translations.get("meta.title", "en"), "Modern");
        assert_eq!(translations.get("only_legacy", "en"), "kept");
    }

    #[test]
    fn test_malformed_unit_skipped() {
        let (_dir, paths, config) = setup();
        let module_dir = paths.locales_dir().join("en");
        fs::create_dir_all(&module_dir).unwrap();
        fs::write(module_dir.join("bad.yaml"), "key: [unclosed\n").unwrap();
        fs::write(module_dir.join("good.yaml"), "greeting: Hello\n").unwrap();

        let translations = Translations::load(&paths, &config);
        assert_eq!(translations.get("greeting", "en"), "Hello");
    }

    #[test]
    fn test_deep_merge_overwrites_scalar_with_mapping() {
        let mut target: Value = serde_yaml::from_str("a: scalar\n").unwrap();
        let source: Value = serde_yaml::from_str("a:\n  nested: leaf\n").unwrap();
        deep_merge(&mut target, &source);
        assert_eq!(
            target.get("a").and_then(|v| v.get("nested")).and_then(|v| v.as_str()),
            Some("leaf")
        );
    }
}
