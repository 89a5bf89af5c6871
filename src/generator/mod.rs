//! Root-level output: overlayed site templates, the locale redirect
//! shim, and verbatim root file copies.

use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context as _, Result};
use minijinja::{Environment, Value};

use crate::context::BuildContext;
use crate::embed::DEFAULT_TEMPLATES;
use crate::utils::fs::write_file;
use crate::{debug, log};

/// Root files copied from `src/` into the dist root as-is. Anything else
/// at the source root is ignored.
const ROOT_FILES: &[&str] = &["manifest.json", "sw.js", "robots.txt", "sitemap.xml"];

/// Render the root templates into the dist root.
///
/// Built-in defaults are the base layer; a project file of the same name
/// under `src/templates/` replaces the default wholesale. The `.jinja`
/// suffix is stripped for the output name. A template that fails to
/// render is logged and skipped, never fatal.
pub fn build_templates(ctx: &BuildContext) -> Result<()> {
    let env = template_env();
    let vars = template_vars(ctx);

    for (name, source) in collect_templates(ctx) {
        let out_name = name.strip_suffix(".jinja").unwrap_or(&name);
        match env.render_str(&source, &vars) {
            Ok(rendered) => {
                write_file(&ctx.paths.dist.join(out_name), rendered.as_bytes())?;
                debug!("templates"; "generated {out_name}");
            }
            Err(e) => {
                log!("error"; "error rendering template {name}: {e:#}");
            }
        }
    }
    Ok(())
}

/// Defaults overlaid by `src/templates/*.jinja`, keyed by file name.
fn collect_templates(ctx: &BuildContext) -> BTreeMap<String, String> {
    let mut templates: BTreeMap<String, String> = DEFAULT_TEMPLATES
        .iter()
        .map(|(name, source)| (name.to_string(), source.to_string()))
        .collect();

    for file in crate::utils::fs::list_dir(&ctx.paths.templates_dir()) {
        if file.extension().and_then(|e| e.to_str()) != Some("jinja") {
            continue;
        }
        let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match fs::read_to_string(&file) {
            Ok(source) => {
                templates.insert(name.to_string(), source);
            }
            Err(e) => log!("error"; "error reading template {name}: {e}"),
        }
    }
    templates
}

/// Environment for root templates. Pages already resolve translations at
/// render time; root templates are locale-neutral, so `t` passes keys
/// through unchanged.
fn template_env() -> Environment<'static> {
    let mut env = Environment::new();
    env.add_function("t", |key: String| key);
    env
}

fn template_vars(ctx: &BuildContext) -> BTreeMap<String, Value> {
    let mut vars = BTreeMap::new();
    vars.insert("global".to_string(), Value::from_serialize(&ctx.config));
    vars.insert("site".to_string(), Value::from_serialize(&ctx.config.site));
    vars.insert("tools".to_string(), Value::from_serialize(&ctx.tools.tools));
    vars.insert(
        "categories".to_string(),
        Value::from_serialize(&ctx.tools.by_category()),
    );
    vars.insert(
        "tools_map".to_string(),
        Value::from_serialize(&ctx.tools.by_id()),
    );
    vars.insert(
        "locales".to_string(),
        Value::from_serialize(ctx.locales()),
    );
    vars.insert(
        "default_locale".to_string(),
        Value::from(ctx.default_locale()),
    );
    vars.insert(
        "blog_posts".to_string(),
        Value::from_serialize(&ctx.blog_posts),
    );
    vars.insert("is_dev".to_string(), Value::from(!ctx.mode.is_secure()));
    vars
}

/// Write the root `index.html` that forwards visitors to the default
/// locale's entry page. Meta refresh carries the redirect for clients
/// with scripting disabled; the script variant preserves nothing extra,
/// it just fires sooner.
pub fn create_root_redirect(ctx: &BuildContext) -> Result<()> {
    let target = redirect_target(ctx);
    let html = format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta http-equiv=\"refresh\" content=\"0; url={target}\">\n\
         <script>window.location.replace(\"{target}\");</script>\n\
         </head>\n\
         <body>\n\
         <p>Redirecting to <a href=\"{target}\">{target}</a>&hellip;</p>\n\
         </body>\n\
         </html>\n"
    );
    write_file(&ctx.paths.dist.join("index.html"), html.as_bytes())
        .context("writing root redirect")?;
    debug!("templates"; "root redirect -> {target}");
    Ok(())
}

fn redirect_target(ctx: &BuildContext) -> String {
    let locale = ctx.default_locale();
    match ctx.config.build.entry_point.as_deref() {
        Some(entry) if !entry.is_empty() => {
            let entry = entry.trim_matches('/');
            format!("/{locale}/{entry}/")
        }
        _ => format!("/{locale}/"),
    }
}

/// Copy the allow-listed root files from `src/` into the dist root,
/// overwriting unconditionally. These are small and not worth the
/// staleness bookkeeping.
pub fn copy_root_files(ctx: &BuildContext) -> Result<()> {
    for name in ROOT_FILES {
        let src = ctx.paths.src.join(name);
        if !src.is_file() {
            continue;
        }
        let dest = ctx.paths.dist.join(name);
        fs::copy(&src, &dest)
            .with_context(|| format!("copying root file {name}"))?;
        debug!("templates"; "copied {name}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildMode;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn site(dir: &TempDir) -> PathBuf {
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("src/data")).unwrap();
        fs::write(
            root.join("src/data/global.yaml"),
            "site:\n  url: https://example.com\nbuild:\n  locales: [en, vi]\n  default_locale: en\n",
        )
        .unwrap();
        root
    }

    fn ctx(root: &Path) -> BuildContext {
        BuildContext::load(root, BuildMode::Dev, false)
    }

    #[test]
    fn test_default_templates_rendered() {
        let dir = TempDir::new().unwrap();
        let root = site(&dir);
        let ctx = ctx(&root);
        build_templates(&ctx).unwrap();

        let robots = fs::read_to_string(ctx.paths.dist.join("robots.txt")).unwrap();
        assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));

        let sitemap = fs::read_to_string(ctx.paths.dist.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://example.com/en/</loc>"));
        assert!(sitemap.contains("<loc>https://example.com/vi/</loc>"));
    }

    #[test]
    fn test_project_template_overrides_default() {
        let dir = TempDir::new().unwrap();
        let root = site(&dir);
        fs::create_dir_all(root.join("src/templates")).unwrap();
        fs::write(
            root.join("src/templates/robots.txt.jinja"),
            "User-agent: *\nDisallow: /\n",
        )
        .unwrap();

        let ctx = ctx(&root);
        build_templates(&ctx).unwrap();
        let robots = fs::read_to_string(ctx.paths.dist.join("robots.txt")).unwrap();
        assert!(robots.contains("Disallow: /"));
        assert!(!robots.contains("Sitemap:"));
    }

    #[test]
    fn test_category_grouping_in_template_context() {
        let dir = TempDir::new().unwrap();
        let root = site(&dir);
        for (feature, yaml) in [
            ("tax", "category: job\n"),
            ("bmi", "category: daily\n"),
            ("lunar-calendar", ""),
        ] {
            let feature_dir = root.join("src/features").join(feature);
            fs::create_dir_all(&feature_dir).unwrap();
            fs::write(feature_dir.join("tool.yaml"), yaml).unwrap();
        }
        fs::create_dir_all(root.join("src/templates")).unwrap();
        fs::write(
            root.join("src/templates/nav.json.jinja"),
            "{% for cat, group in categories|items %}{{ cat }}:{{ group|length }};\
             {% endfor %}|{{ tools_map.bmi.link }}",
        )
        .unwrap();

        let ctx = ctx(&root);
        build_templates(&ctx).unwrap();

        let nav = fs::read_to_string(ctx.paths.dist.join("nav.json")).unwrap();
        assert!(nav.contains("daily:1;"));
        assert!(nav.contains("job:1;"));
        assert!(nav.contains("other:1;"));
        assert!(nav.contains("|/bmi/"));
    }

    #[test]
    fn test_broken_template_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let root = site(&dir);
        fs::create_dir_all(root.join("src/templates")).unwrap();
        fs::write(root.join("src/templates/feed.xml.jinja"), "{{ bad").unwrap();

        let ctx = ctx(&root);
        build_templates(&ctx).unwrap();
        assert!(!ctx.paths.dist.join("feed.xml").exists());
        // The defaults still came out
        assert!(ctx.paths.dist.join("robots.txt").exists());
    }

    #[test]
    fn test_redirect_points_at_default_locale() {
        let dir = TempDir::new().unwrap();
        let root = site(&dir);
        let ctx = ctx(&root);
        create_root_redirect(&ctx).unwrap();

        let html = fs::read_to_string(ctx.paths.dist.join("index.html")).unwrap();
        assert!(html.contains("url=/en/"));
        assert!(html.contains("window.location.replace(\"/en/\")"));
    }

    #[test]
    fn test_redirect_honors_entry_point() {
        let dir = TempDir::new().unwrap();
        let root = site(&dir);
        fs::write(
            root.join("src/data/global.yaml"),
            "build:\n  default_locale: vi\n  entry_point: tools/\n",
        )
        .unwrap();
        let ctx = ctx(&root);
        create_root_redirect(&ctx).unwrap();

        let html = fs::read_to_string(ctx.paths.dist.join("index.html")).unwrap();
        assert!(html.contains("url=/vi/tools/"));
    }

    #[test]
    fn test_root_files_allow_list() {
        let dir = TempDir::new().unwrap();
        let root = site(&dir);
        fs::write(root.join("src/manifest.json"), "{}").unwrap();
        fs::write(root.join("src/secret.txt"), "nope").unwrap();

        let ctx = ctx(&root);
        fs::create_dir_all(&ctx.paths.dist).unwrap();
        copy_root_files(&ctx).unwrap();

        assert!(ctx.paths.dist.join("manifest.json").exists());
        assert!(!ctx.paths.dist.join("secret.txt").exists());
    }
}
