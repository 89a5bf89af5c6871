//! Playground example bundling.
//!
//! Folders under `features/web-playground/examples/` each hold a
//! `meta.json` plus optional `index.html` / `style.css` / `script.js`;
//! they compile into a single generated `examples.js` the playground
//! loads at runtime.

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use crate::context::BuildContext;
use crate::utils::fs::write_file;
use crate::{debug, log};

pub fn build_playground_examples(ctx: &BuildContext) -> Result<()> {
    let examples_src = ctx
        .paths
        .features_dir()
        .join("web-playground")
        .join("examples");
    if !examples_src.is_dir() {
        return Ok(());
    }

    let mut examples = Vec::new();
    for dir in crate::utils::fs::list_dir(&examples_src) {
        if !dir.is_dir() {
            continue;
        }
        let meta_path = dir.join("meta.json");
        if !meta_path.is_file() {
            continue;
        }
        let meta: serde_json::Value = match std::fs::read_to_string(&meta_path)
            .map_err(anyhow::Error::from)
            .and_then(|c| serde_json::from_str(&c).map_err(Into::into))
        {
            Ok(meta) => meta,
            Err(e) => {
                log!("assets"; "skipping playground example {}: {e}", dir.display());
                continue;
            }
        };

        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        examples.push(json!({
            "id": meta.get("id").and_then(|v| v.as_str()).unwrap_or(&dir_name),
            "title": meta.get("title").and_then(|v| v.as_str()).unwrap_or(&dir_name),
            "html": read_or_empty(&dir.join("index.html")),
            "css": read_or_empty(&dir.join("style.css")),
            "js": read_or_empty(&dir.join("script.js")),
        }));
    }

    let output = format!(
        "/** Generated File - Do Not Edit Directly **/\nwindow.PLAYGROUND_EXAMPLES = {};\n",
        serde_json::to_string_pretty(&examples)?
    );
    let dest = ctx
        .paths
        .assets_dist
        .join("features")
        .join("web-playground")
        .join("examples.js");
    write_file(&dest, output)?;
    debug!("assets"; "bundled {} playground examples", examples.len());
    Ok(())
}

fn read_or_empty(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}
