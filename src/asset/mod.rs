//! Asset pipeline: raw copies, global CSS/JS, and per-feature assets.
//!
//! Every transform is gated on the build cache. Secure mode minifies CSS
//! and obfuscates JS with a logged fallback ladder (obfuscate → minify →
//! raw copy); dev mode copies sources verbatim. Individual file transforms
//! run on rayon; cache checks serialize behind the context mutex.

mod examples;
pub mod minify;
mod versions;

pub use examples::build_playground_examples;
pub use versions::AssetVersions;

use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;

use crate::context::BuildContext;
use crate::utils::fs::{copy_recursive, list_dir, write_file};
use crate::{debug, log};

/// One file transform to perform.
#[derive(Debug, Clone)]
struct AssetJob {
    src: PathBuf,
    dest: PathBuf,
    kind: AssetKind,
    label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetKind {
    Css,
    Js,
}

/// Run the whole asset pass.
pub fn build_assets(ctx: &BuildContext) -> Result<()> {
    std::fs::create_dir_all(&ctx.paths.assets_dist)?;

    copy_raw_assets(ctx)?;

    let mut jobs = Vec::new();
    collect_global_jobs(ctx, &mut jobs);
    collect_feature_jobs(ctx, &mut jobs);

    // Drop jobs whose source is unchanged and whose output already exists.
    // The check itself commits the new digest, matching the original
    // one-shot staleness query.
    let jobs: Vec<AssetJob> = jobs
        .into_iter()
        .filter(|job| {
            let changed = ctx.cache.lock().has_changed(&job.src, "", true);
            changed || !job.dest.exists()
        })
        .collect();

    let results: Vec<Result<()>> = jobs
        .par_iter()
        .map(|job| process_job(ctx, job))
        .collect();
    for result in results {
        result?;
    }

    build_playground_examples(ctx)?;
    Ok(())
}

/// Copy raw, non-CSS/JS items under the assets root (images, fonts,
/// vendor bundles) wholesale. Granularity is the top-level item, not the
/// inner files; directories always report changed.
fn copy_raw_assets(ctx: &BuildContext) -> Result<()> {
    let assets_src = ctx.paths.assets_src();
    for item in list_dir(&assets_src) {
        let name = item
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name == "css" || name == "js" {
            continue;
        }
        let dest = ctx.paths.assets_dist.join(&name);
        if ctx.cache.lock().has_changed(&item, "assets-copy/", false) {
            copy_recursive(&item, &dest)?;
            ctx.cache.lock().has_changed(&item, "assets-copy/", true);
            debug!("assets"; "copied raw asset {name}");
        }
    }
    Ok(())
}

fn collect_global_jobs(ctx: &BuildContext, jobs: &mut Vec<AssetJob>) {
    let css_src = ctx.paths.assets_src().join("css");
    for file in list_dir(&css_src) {
        if file.extension().and_then(|e| e.to_str()) != Some("css") {
            continue;
        }
        let name = file.file_name().unwrap_or_default().to_string_lossy().into_owned();
        jobs.push(AssetJob {
            dest: ctx.paths.assets_dist.join("css").join(&name),
            src: file,
            kind: AssetKind::Css,
            label: name,
        });
    }

    let js_src = ctx.paths.assets_src().join("js");
    for file in list_dir(&js_src) {
        if file.extension().and_then(|e| e.to_str()) != Some("js") {
            continue;
        }
        let name = file.file_name().unwrap_or_default().to_string_lossy().into_owned();
        jobs.push(AssetJob {
            dest: ctx.paths.assets_dist.join("js").join(&name),
            src: file,
            kind: AssetKind::Js,
            label: name,
        });
    }
}

fn collect_feature_jobs(ctx: &BuildContext, jobs: &mut Vec<AssetJob>) {
    let features_dir = ctx.paths.features_dir();
    for feature in crate::data::list_feature_dirs(&features_dir) {
        let feature_dir = features_dir.join(&feature);
        let feature_dist = ctx.paths.assets_dist.join("features").join(&feature);

        let css = feature_dir.join("style.css");
        if css.is_file() {
            jobs.push(AssetJob {
                src: css,
                dest: feature_dist.join("style.css"),
                kind: AssetKind::Css,
                label: format!("{feature}/style.css"),
            });
        }

        for file in list_dir(&feature_dir) {
            if file.extension().and_then(|e| e.to_str()) != Some("js") {
                continue;
            }
            let name = file.file_name().unwrap_or_default().to_string_lossy().into_owned();
            // Config scripts are consumed at render time, never shipped.
            if name == "toolConfig.js" {
                continue;
            }
            jobs.push(AssetJob {
                dest: feature_dist.join(&name),
                src: file,
                kind: AssetKind::Js,
                label: format!("{feature}/{name}"),
            });
        }
    }
}

fn process_job(ctx: &BuildContext, job: &AssetJob) -> Result<()> {
    match job.kind {
        AssetKind::Css => process_css(ctx, &job.src, &job.dest, &job.label),
        AssetKind::Js => process_js(ctx, &job.src, &job.dest, &job.label),
    }
}

/// Secure mode minifies; a minifier failure falls back to a raw copy.
fn process_css(ctx: &BuildContext, src: &Path, dest: &Path, label: &str) -> Result<()> {
    if !ctx.mode.is_secure() {
        debug!("assets"; "copying css: {label}");
        return copy_recursive(src, dest);
    }

    let source = std::fs::read_to_string(src)?;
    match minify::minify_css(&source) {
        Some(minified) => {
            log!("assets"; "minified css: {label}");
            write_file(dest, minified)
        }
        None => {
            log!("assets"; "css minify failed for {label}, copying raw");
            copy_recursive(src, dest)
        }
    }
}

/// Secure mode obfuscates, falling back to plain minification, then to a
/// raw copy. Each fallback is logged; none is fatal.
fn process_js(ctx: &BuildContext, src: &Path, dest: &Path, label: &str) -> Result<()> {
    if !ctx.mode.is_secure() {
        debug!("assets"; "copying js: {label}");
        return copy_recursive(src, dest);
    }

    let source = std::fs::read_to_string(src)?;
    if let Some(obfuscated) = minify::obfuscate_js(&source) {
        log!("assets"; "obfuscated js: {label}");
        return write_file(dest, obfuscated);
    }
    log!("assets"; "obfuscation failed for {label}, falling back to minify");
    if let Some(minified) = minify::minify_js(&source) {
        return write_file(dest, minified);
    }
    log!("assets"; "minify failed for {label}, copying raw");
    copy_recursive(src, dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildMode;
    use crate::freshness::compute_file_hash;
    use std::fs;
    use tempfile::TempDir;

    fn ctx_for(dir: &TempDir, mode: BuildMode) -> BuildContext {
        BuildContext::load(dir.path(), mode, false)
    }

    #[test]
    fn test_dev_mode_copies_verbatim() {
        let dir = TempDir::new().unwrap();
        let css_dir = dir.path().join("src/assets/css");
        fs::create_dir_all(&css_dir).unwrap();
        fs::write(css_dir.join("app.css"), "body {  color : red ; }").unwrap();

        let ctx = ctx_for(&dir, BuildMode::Dev);
        build_assets(&ctx).unwrap();

        let out = fs::read_to_string(ctx.paths.assets_dist.join("css/app.css")).unwrap();
        assert_eq!(out, "body {  color : red ; }");
    }

    #[test]
    fn test_secure_mode_minifies_css() {
        let dir = TempDir::new().unwrap();
        let css_dir = dir.path().join("src/assets/css");
        fs::create_dir_all(&css_dir).unwrap();
        fs::write(css_dir.join("app.css"), "body {\n  color: red;\n}\n").unwrap();

        let ctx = ctx_for(&dir, BuildMode::Secure);
        build_assets(&ctx).unwrap();

        let out = fs::read_to_string(ctx.paths.assets_dist.join("css/app.css")).unwrap();
        assert!(out.len() < "body {\n  color: red;\n}\n".len());
    }

    #[test]
    fn test_unchanged_file_skipped_on_second_run() {
        let dir = TempDir::new().unwrap();
        let css_dir = dir.path().join("src/assets/css");
        fs::create_dir_all(&css_dir).unwrap();
        let src = css_dir.join("app.css");
        fs::write(&src, "a{}").unwrap();

        let ctx = ctx_for(&dir, BuildMode::Dev);
        build_assets(&ctx).unwrap();
        ctx.cache.lock().save().unwrap();

        // Second run: output rewritten only if the transform reran; tamper
        // with the output to detect a rerun.
        let dest = ctx.paths.assets_dist.join("css/app.css");
        fs::write(&dest, "tampered").unwrap();

        let ctx2 = ctx_for(&dir, BuildMode::Dev);
        build_assets(&ctx2).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "tampered");
    }

    #[test]
    fn test_changed_file_reprocessed_and_cache_updated() {
        let dir = TempDir::new().unwrap();
        let css_dir = dir.path().join("src/assets/css");
        fs::create_dir_all(&css_dir).unwrap();
        let src = css_dir.join("app.css");
        fs::write(&src, "a{color:red}").unwrap();

        let ctx = ctx_for(&dir, BuildMode::Secure);
        build_assets(&ctx).unwrap();
        ctx.cache.lock().save().unwrap();

        fs::write(&src, "a{color:blue}").unwrap();
        let ctx2 = ctx_for(&dir, BuildMode::Secure);
        build_assets(&ctx2).unwrap();

        let out = fs::read_to_string(ctx2.paths.assets_dist.join("css/app.css")).unwrap();
        assert!(out.contains("blue"));
        assert_eq!(
            ctx2.cache.lock().digest(&src, "").unwrap(),
            compute_file_hash(&src).to_hex()
        );
    }

    #[test]
    fn test_missing_output_rebuilt_even_when_cache_fresh() {
        let dir = TempDir::new().unwrap();
        let css_dir = dir.path().join("src/assets/css");
        fs::create_dir_all(&css_dir).unwrap();
        fs::write(css_dir.join("app.css"), "a{}").unwrap();

        let ctx = ctx_for(&dir, BuildMode::Dev);
        build_assets(&ctx).unwrap();
        ctx.cache.lock().save().unwrap();

        let dest = ctx.paths.assets_dist.join("css/app.css");
        fs::remove_file(&dest).unwrap();

        let ctx2 = ctx_for(&dir, BuildMode::Dev);
        build_assets(&ctx2).unwrap();
        assert!(dest.exists());
    }

    #[test]
    fn test_feature_assets_land_under_features_dist() {
        let dir = TempDir::new().unwrap();
        let feat = dir.path().join("src/features/bmi");
        fs::create_dir_all(&feat).unwrap();
        fs::write(feat.join("style.css"), ".bmi{}").unwrap();
        fs::write(feat.join("script.js"), "console.log(1);").unwrap();

        let ctx = ctx_for(&dir, BuildMode::Dev);
        build_assets(&ctx).unwrap();

        assert!(ctx.paths.assets_dist.join("features/bmi/style.css").exists());
        assert!(ctx.paths.assets_dist.join("features/bmi/script.js").exists());
    }

    #[test]
    fn test_feature_config_script_not_shipped() {
        let dir = TempDir::new().unwrap();
        let feat = dir.path().join("src/features/bmi");
        fs::create_dir_all(&feat).unwrap();
        fs::write(feat.join("script.js"), "console.log(1);").unwrap();
        fs::write(feat.join("toolConfig.js"), "window.config = {};").unwrap();

        let ctx = ctx_for(&dir, BuildMode::Dev);
        build_assets(&ctx).unwrap();

        assert!(ctx.paths.assets_dist.join("features/bmi/script.js").exists());
        assert!(!ctx.paths.assets_dist.join("features/bmi/toolConfig.js").exists());
    }

    #[test]
    fn test_raw_assets_copied_wholesale() {
        let dir = TempDir::new().unwrap();
        let fonts = dir.path().join("src/assets/fonts");
        fs::create_dir_all(&fonts).unwrap();
        fs::write(fonts.join("site.woff2"), [0u8, 1, 2]).unwrap();

        let ctx = ctx_for(&dir, BuildMode::Dev);
        build_assets(&ctx).unwrap();
        assert!(ctx.paths.assets_dist.join("fonts/site.woff2").exists());
    }

    #[test]
    fn test_playground_examples_bundled() {
        let dir = TempDir::new().unwrap();
        let example = dir.path().join("src/features/web-playground/examples/hello");
        fs::create_dir_all(&example).unwrap();
        fs::write(example.join("meta.json"), r#"{"id":"hello","title":"Hello"}"#).unwrap();
        fs::write(example.join("index.html"), "<p>hi</p>").unwrap();

        let ctx = ctx_for(&dir, BuildMode::Dev);
        build_assets(&ctx).unwrap();

        let bundle = fs::read_to_string(
            ctx.paths
                .assets_dist
                .join("features/web-playground/examples.js"),
        )
        .unwrap();
        assert!(bundle.starts_with("/** Generated File"));
        assert!(bundle.contains("\"id\": \"hello\""));
        assert!(bundle.contains("<p>hi</p>"));
    }
}
