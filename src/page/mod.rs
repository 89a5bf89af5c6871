//! Page building: template scan, rebuild decisions, per-locale rendering.
//!
//! Rebuild policy per source template: rebuild when its own hash changed,
//! when any global dependency changed (global config, any includes file),
//! or when any feature's tool.yaml changed anywhere. The last rule is a
//! deliberate over-invalidation: pages read the cross-feature tool list,
//! so one feature's config change re-renders every page.

mod render;

pub use render::{PageLayout, PageRenderer, PageTree};

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::context::BuildContext;
use crate::utils::fs::collect_files;
use crate::log;

/// Outcome counts for one page pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct PageStats {
    pub rendered: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Render every stale page in the pages and features trees, all locales.
pub fn build_pages(ctx: &BuildContext) -> Result<PageStats> {
    let deps = check_global_deps(ctx);
    let renderer = PageRenderer::new(ctx);
    let mut stats = PageStats::default();

    for (base_dir, tree) in [
        (ctx.paths.pages_dir(), PageTree::Pages),
        (ctx.paths.features_dir(), PageTree::Features),
    ] {
        for file in page_templates(&base_dir) {
            build_one(ctx, &renderer, &file, &base_dir, tree, &deps, &mut stats);
        }
    }

    commit_global_deps(ctx, &deps);

    if stats.failed > 0 {
        log!("pages"; "{} page(s) failed and will retry next build", stats.failed);
    }
    Ok(stats)
}

/// All `.jinja` templates under a tree, sorted.
fn page_templates(base_dir: &Path) -> Vec<PathBuf> {
    collect_files(base_dir)
        .into_iter()
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("jinja"))
        .collect()
}

/// Build one source file across all locales; advance its cache entry only
/// if every locale render succeeded so a partial failure retries next run.
fn build_one(
    ctx: &BuildContext,
    renderer: &PageRenderer,
    file: &Path,
    base_dir: &Path,
    tree: PageTree,
    deps: &GlobalDeps,
    stats: &mut PageStats,
) {
    let file_changed = ctx.cache.lock().has_changed(file, "page/", false);
    if !(file_changed || deps.any_changed()) {
        stats.skipped += 1;
        return;
    }

    let mut all_ok = true;
    for locale in ctx.locales() {
        if let Err(e) = renderer.render_page(ctx, file, base_dir, tree, locale) {
            log!("error"; "error building page {} [{locale}]: {e:#}", file.display());
            all_ok = false;
        }
    }

    if all_ok {
        ctx.cache.lock().has_changed(file, "page/", true);
        stats.rendered += 1;
    } else {
        stats.failed += 1;
    }
}

/// Global dependency staleness, queried once per pass without committing.
struct GlobalDeps {
    global_config: bool,
    includes: bool,
    tools: bool,
}

impl GlobalDeps {
    fn any_changed(&self) -> bool {
        self.global_config || self.includes || self.tools
    }
}

fn check_global_deps(ctx: &BuildContext) -> GlobalDeps {
    let mut cache = ctx.cache.lock();

    let global_config = {
        let path = ctx.paths.global_config();
        path.is_file() && cache.has_changed(&path, "global/", false)
    };

    let mut includes = false;
    for file in collect_files(&ctx.paths.includes_dir()) {
        if cache.has_changed(&file, "includes/", false) {
            includes = true;
        }
    }

    let mut tools = false;
    for feature in crate::data::list_feature_dirs(&ctx.paths.features_dir()) {
        let config_path = ctx.paths.tool_config(&feature);
        if config_path.is_file() && cache.has_changed(&config_path, "feat/", false) {
            tools = true;
        }
    }

    GlobalDeps {
        global_config,
        includes,
        tools,
    }
}

/// Commit the digests of whichever global dependencies were stale, so the
/// next run sees them as seen.
fn commit_global_deps(ctx: &BuildContext, deps: &GlobalDeps) {
    let mut cache = ctx.cache.lock();

    if deps.global_config {
        cache.has_changed(&ctx.paths.global_config(), "global/", true);
    }
    if deps.includes {
        for file in collect_files(&ctx.paths.includes_dir()) {
            cache.has_changed(&file, "includes/", true);
        }
    }
    if deps.tools {
        for feature in crate::data::list_feature_dirs(&ctx.paths.features_dir()) {
            let config_path = ctx.paths.tool_config(&feature);
            if config_path.is_file() {
                cache.has_changed(&config_path, "feat/", true);
            }
        }
    }
}
