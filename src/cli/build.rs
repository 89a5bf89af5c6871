//! Full build orchestration.
//!
//! Order matters: assets first so page renders can fingerprint their
//! outputs, then pages, then root-level files. The cache is persisted
//! last; a failed save is logged and the next run rebuilds from scratch.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context as _, Result};

use crate::config::BuildMode;
use crate::context::BuildContext;
use crate::{generator, log, page};

pub fn run(root: &Path, mode: BuildMode, force: bool) -> Result<()> {
    let started = Instant::now();
    log!("build"; "starting build (secure mode: {})", if mode.is_secure() { "ON" } else { "OFF" });

    let ctx = BuildContext::load(root, mode, force);

    if force {
        crate::utils::fs::remove_dir_if_exists(&ctx.paths.dist)?;
        log!("build"; "cleaned {}", ctx.paths.dist.display());
    }
    fs::create_dir_all(&ctx.paths.dist)
        .with_context(|| format!("creating {}", ctx.paths.dist.display()))?;

    crate::asset::build_assets(&ctx)?;
    let stats = page::build_pages(&ctx)?;
    generator::create_root_redirect(&ctx)?;
    generator::build_templates(&ctx)?;
    generator::copy_root_files(&ctx)?;

    if let Err(e) = ctx.cache.lock().save() {
        log!("error"; "failed to persist build cache: {e:#}");
    }

    log!(
        "build";
        "complete: {} rendered, {} unchanged, {} failed in {:.2?}",
        stats.rendered,
        stats.skipped,
        stats.failed,
        started.elapsed()
    );
    Ok(())
}
