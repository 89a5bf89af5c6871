//! JSON endpoints for editing feature and global configuration.
//!
//! Writes land in the source tree as YAML; every successful write kicks
//! off a dev rebuild on a background thread so the static site catches
//! up. Rebuilds are serialized through a mutex, never queued.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use anyhow::{Context as _, Result};
use parking_lot::Mutex;
use serde_json::json;
use tiny_http::{Method, Request};

use super::response;
use crate::config::{BuildMode, Paths};
use crate::log;

pub fn handle(request: Request, paths: &Paths, rebuild_lock: &Arc<Mutex<()>>) -> Result<()> {
    let url = request.url().to_string();
    let route = url.split('?').next().unwrap_or(&url).trim_end_matches('/');
    let segments: Vec<&str> = route.trim_start_matches('/').split('/').collect();

    match (request.method().clone(), segments.as_slice()) {
        (Method::Get, ["api", "features"]) => list_features(request, paths),
        (Method::Post, ["api", "features", id]) => {
            let id = id.to_string();
            update_feature(request, paths, &id, rebuild_lock)
        }
        (Method::Get, ["api", "global"]) => get_global(request, paths),
        (Method::Post, ["api", "global"]) => update_global(request, paths, rebuild_lock),
        _ => response::send_error(request, 404, "unknown endpoint"),
    }
}

/// GET /api/features: every feature directory that carries a tool.yaml,
/// as `{ id, config }` pairs.
fn list_features(request: Request, paths: &Paths) -> Result<()> {
    let mut items = Vec::new();
    for id in crate::data::list_feature_dirs(&paths.features_dir()) {
        let config_path = paths.tool_config(&id);
        if !config_path.is_file() {
            continue;
        }
        match read_yaml_as_json(&config_path) {
            Ok(config) => items.push(json!({ "id": id, "config": config })),
            Err(e) => return response::send_error(request, 500, &format!("{e:#}")),
        }
    }
    response::send_json(request, 200, &serde_json::Value::Array(items))
}

/// POST /api/features/:id: replace the feature's tool.yaml with the JSON
/// body. 404 if the feature has no existing config.
fn update_feature(
    mut request: Request,
    paths: &Paths,
    id: &str,
    rebuild_lock: &Arc<Mutex<()>>,
) -> Result<()> {
    let Some(config_path) = feature_config_path(paths, id) else {
        return response::send_error(request, 404, "Feature not found");
    };

    let body = match read_json_body(&mut request) {
        Ok(body) => body,
        Err(e) => return response::send_error(request, 400, &format!("{e:#}")),
    };

    if let Err(e) = write_json_as_yaml(&config_path, &body) {
        return response::send_error(request, 500, &format!("{e:#}"));
    }
    log!("admin"; "updated config for {id}");
    spawn_rebuild(paths, rebuild_lock);

    response::send_json(
        request,
        200,
        &json!({ "success": true, "message": "Config updated and rebuild triggered" }),
    )
}

/// GET /api/global: the global config as JSON, `{}` if the file is
/// absent.
fn get_global(request: Request, paths: &Paths) -> Result<()> {
    let path = paths.global_config();
    if !path.is_file() {
        return response::send_json(request, 200, &json!({}));
    }
    match read_yaml_as_json(&path) {
        Ok(config) => response::send_json(request, 200, &config),
        Err(e) => response::send_error(request, 500, &format!("{e:#}")),
    }
}

/// POST /api/global: replace global.yaml with the JSON body.
fn update_global(
    mut request: Request,
    paths: &Paths,
    rebuild_lock: &Arc<Mutex<()>>,
) -> Result<()> {
    let body = match read_json_body(&mut request) {
        Ok(body) => body,
        Err(e) => return response::send_error(request, 400, &format!("{e:#}")),
    };

    let path = paths.global_config();
    if let Err(e) = write_json_as_yaml(&path, &body) {
        return response::send_error(request, 500, &format!("{e:#}"));
    }
    log!("admin"; "updated global config");
    spawn_rebuild(paths, rebuild_lock);

    response::send_json(
        request,
        200,
        &json!({ "success": true, "message": "Global config updated" }),
    )
}

/// Validate the feature id and return its tool.yaml path, None when the
/// id is malformed or the config does not exist.
fn feature_config_path(paths: &Paths, id: &str) -> Option<PathBuf> {
    if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
        return None;
    }
    let path = paths.tool_config(id);
    path.is_file().then_some(path)
}

fn read_json_body(request: &mut Request) -> Result<serde_json::Value> {
    serde_json::from_reader(request.as_reader()).context("parsing JSON body")
}

fn read_yaml_as_json(path: &Path) -> Result<serde_json::Value> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: serde_yaml::Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    serde_json::to_value(&value).context("converting YAML to JSON")
}

fn write_json_as_yaml(path: &Path, body: &serde_json::Value) -> Result<()> {
    let yaml = serde_yaml::to_string(body).context("serializing YAML")?;
    fs::write(path, yaml).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Fire a dev build on a background thread. Concurrent triggers wait on
/// the lock, so two rapid POSTs produce two sequential builds rather
/// than interleaved ones.
fn spawn_rebuild(paths: &Paths, rebuild_lock: &Arc<Mutex<()>>) {
    let root = paths.root.clone();
    let lock = Arc::clone(rebuild_lock);
    thread::spawn(move || {
        let _guard = lock.lock();
        log!("admin"; "triggering rebuild...");
        match crate::cli::build::run(&root, BuildMode::Dev, false) {
            Ok(()) => log!("admin"; "rebuild complete"),
            Err(e) => log!("error"; "rebuild failed: {e:#}"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildMode;
    use tempfile::TempDir;

    #[test]
    fn test_feature_config_path_validation() {
        let dir = TempDir::new().unwrap();
        let paths = Paths::new(dir.path(), BuildMode::Dev);
        let feature = paths.features_dir().join("bmi");
        fs::create_dir_all(&feature).unwrap();
        fs::write(feature.join("tool.yaml"), "category: daily\n").unwrap();

        assert!(feature_config_path(&paths, "bmi").is_some());
        assert!(feature_config_path(&paths, "missing").is_none());
        assert!(feature_config_path(&paths, "../escape").is_none());
        assert!(feature_config_path(&paths, "a/b").is_none());
        assert!(feature_config_path(&paths, "").is_none());
    }

    #[test]
    fn test_yaml_json_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tool.yaml");
        let body = json!({ "category": "text", "meta": { "version": "2.0.0" } });

        write_json_as_yaml(&path, &body).unwrap();
        let back = read_yaml_as_json(&path).unwrap();
        assert_eq!(back, body);
    }
}
