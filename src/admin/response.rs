//! HTTP response helpers for the admin server.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tiny_http::{Header, Request, Response, StatusCode};

use crate::utils::mime;

/// Resolve a request URL to a file under the serve root, mapping
/// directories to their `index.html`. Rejects anything that escapes the
/// root, including via symlinks.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    if clean.contains("..") {
        return None;
    }

    let local = serve_root.join(&clean);

    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }
    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }
    None
}

/// Decode percent escapes, strip the query string, trim slashes.
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;
    let decoded = percent_decode_str(url)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    let path = decoded.split('?').next().unwrap_or(&decoded);
    path.trim_matches('/').to_string()
}

/// Whether the URL path names a file (has an extension) rather than a
/// page route. Controls the extension-less fallback to `index.html`.
pub fn has_extension(url: &str) -> bool {
    let path = url.split('?').next().unwrap_or(url);
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some()
}

pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = mime::from_path(path);
    let body = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    send_body(request, 200, content_type, body)
}

pub fn respond_not_found(request: Request) -> Result<()> {
    send_body(request, 404, mime::types::PLAIN, b"404 Not Found".to_vec())
}

/// Send a JSON payload with the given status code.
pub fn send_json(request: Request, status: u16, body: &serde_json::Value) -> Result<()> {
    let body = serde_json::to_vec(body)?;
    send_body(request, status, mime::types::JSON, body)
}

pub fn send_error(request: Request, status: u16, message: &str) -> Result<()> {
    send_json(request, status, &serde_json::json!({ "error": message }))
}

fn send_body(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("Access-Control-Allow-Origin", "*"));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &str, value: &str) -> Header {
    Header::from_bytes(key.as_bytes(), value.as_bytes()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_maps_directories_to_index() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("en/bmi")).unwrap();
        fs::write(root.join("en/bmi/index.html"), "<p>hi</p>").unwrap();

        let resolved = resolve_path("/en/bmi/", root).unwrap();
        assert!(resolved.ends_with("en/bmi/index.html"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("site");
        fs::create_dir_all(&root).unwrap();
        fs::write(dir.path().join("secret.txt"), "nope").unwrap();

        assert!(resolve_path("/../secret.txt", &root).is_none());
        assert!(resolve_path("/%2e%2e/secret.txt", &root).is_none());
    }

    #[test]
    fn test_resolve_strips_query_string() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("assets")).unwrap();
        fs::write(root.join("assets/app.js"), "x").unwrap();

        let resolved = resolve_path("/assets/app.js?h=deadbeef", root).unwrap();
        assert!(resolved.ends_with("assets/app.js"));
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension("/assets/app.js"));
        assert!(has_extension("/missing.png?h=1234"));
        assert!(!has_extension("/en/bmi/"));
        assert!(!has_extension("/"));
    }
}
