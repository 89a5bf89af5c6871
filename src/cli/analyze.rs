//! Per-feature asset payload report.

use std::fs;
use std::path::Path;

use anyhow::{Result, bail};

use crate::log;
use crate::utils::format_bytes;

pub fn run(root: &Path) -> Result<()> {
    log!("analyze"; "analyzing tool payload...");

    // Prefer the production build, fall back to dev
    let (dist_name, feature_assets) = ["dist", "dist-dev"]
        .into_iter()
        .map(|name| (name, root.join(name).join("assets/features")))
        .find(|(_, dir)| dir.is_dir())
        .map(|(name, dir)| (name, Some(dir)))
        .unwrap_or(("", None));

    let Some(feature_assets) = feature_assets else {
        bail!("build folder (dist/ or dist-dev/) not found, run `sitewright build` first");
    };
    log!("analyze"; "target: {dist_name}/");

    let rule = "-".repeat(66);
    println!("{rule}");
    println!(
        "{:<25} | {:<12} | {:<12} | Total",
        "Tool ID", "CSS Size", "JS Size"
    );
    println!("{rule}");

    let mut total: u64 = 0;
    let mut dirs: Vec<_> = fs::read_dir(&feature_assets)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .collect();
    dirs.sort_by_key(|e| e.file_name());

    for entry in dirs {
        let tool = entry.file_name().to_string_lossy().to_string();
        let css = file_size(&entry.path().join("style.css"));
        let js = file_size(&entry.path().join("script.js"));
        let sum = css + js;
        total += sum;

        println!(
            "{tool:<25} | {:<12} | {:<12} | {}",
            format_bytes(css),
            format_bytes(js),
            format_bytes(sum)
        );
    }
    println!("{rule}");
    println!("{:<55} | {}", "TOTAL ECOSYSTEM SIZE", format_bytes(total));
    println!("{rule}");
    Ok(())
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
