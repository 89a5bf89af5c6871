//! MIME type detection for the dev server.

use std::path::Path;

pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const XML: &str = "application/xml";
    pub const YAML: &str = "text/yaml; charset=utf-8";
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";
    pub const WOFF: &str = "font/woff";
    pub const WOFF2: &str = "font/woff2";
}

/// MIME type from a file extension, defaulting to octet-stream.
pub fn from_path(path: &Path) -> &'static str {
    use types::*;

    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("html" | "htm") => HTML,
        Some("txt") => PLAIN,
        Some("css") => CSS,
        Some("js" | "mjs") => JAVASCRIPT,
        Some("json" | "webmanifest") => JSON,
        Some("xml") => XML,
        Some("yaml" | "yml") => YAML,
        Some("png") => PNG,
        Some("jpg" | "jpeg") => JPEG,
        Some("gif") => GIF,
        Some("webp") => WEBP,
        Some("svg") => SVG,
        Some("ico") => ICO,
        Some("woff") => WOFF,
        Some("woff2") => WOFF2,
        _ => OCTET_STREAM,
    }
}
