//! Single-page rendering: context assembly and minijinja evaluation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use minijinja::value::Value;
use minijinja::{Environment, State, path_loader};
use serde_yaml::Mapping;

use crate::asset::AssetVersions;
use crate::context::BuildContext;
use crate::data::Translations;
use crate::debug;
use crate::utils::fs::write_file;

/// Which source tree a template came from. Feature pages get an enriched
/// context (tool config, asset fingerprints, markdown sections).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTree {
    Pages,
    Features,
}

/// Category id → translation key for the nav label.
const CATEGORY_KEYS: &[(&str, &str)] = &[
    ("job", "nav.menu_job"),
    ("finance", "nav.menu_finance"),
    ("text", "nav.menu_text"),
    ("generator", "nav.menu_generator"),
    ("daily", "nav.menu_utils"),
    ("dev", "nav.menu_dev"),
];

/// Legacy fallback for pages predating per-feature configs, keyed by the
/// literal directory name.
const LEGACY_CATEGORY_KEYS: &[(&str, &str)] = &[
    ("tax", "nav.menu_job"),
    ("business-tax", "nav.menu_job"),
    ("social-insurance", "nav.menu_job"),
    ("loan-calculator", "nav.menu_finance"),
    ("compound-interest", "nav.menu_finance"),
    ("savings-interest", "nav.menu_finance"),
    ("percentage-calculator", "nav.menu_finance"),
    ("word-counter", "nav.menu_text"),
    ("lorem-ipsum", "nav.menu_text"),
    ("text-formatter", "nav.menu_text"),
    ("password-generator", "nav.menu_generator"),
    ("uuid-generator", "nav.menu_generator"),
    ("bmi", "nav.menu_utils"),
    ("lunar-calendar", "nav.menu_utils"),
    ("json-toolkit", "nav.menu_dev"),
];

/// Template environment shared across a page-build pass.
///
/// The loader serves partials from the includes dir; `t()` and `asset()`
/// read their per-page inputs (locale, root path) from the render state.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new(ctx: &BuildContext) -> Self {
        let mut env = Environment::new();
        let includes = ctx.paths.includes_dir();
        if includes.is_dir() {
            env.set_loader(path_loader(includes));
        }

        let translations: Arc<Translations> = Arc::clone(&ctx.translations);
        env.add_function("t", move |state: &State, key: String| -> String {
            let locale = state
                .lookup("locale")
                .as_ref()
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default();
            translations.get(&key, &locale).to_string()
        });

        let versions: Arc<AssetVersions> = Arc::clone(&ctx.versions);
        env.add_function("asset", move |state: &State, rel: String| -> String {
            let root = state
                .lookup("root_path")
                .as_ref()
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default();
            versions.versioned_url(&format!("{root}{rel}"), &rel)
        });

        Self { env }
    }

    /// Render one source template for one locale and write the output
    /// document. Returns the output path.
    pub fn render_page(
        &self,
        ctx: &BuildContext,
        file: &Path,
        base_dir: &Path,
        tree: PageTree,
        locale: &str,
    ) -> Result<PathBuf> {
        let rel = file.strip_prefix(base_dir).unwrap_or(file);
        let layout = PageLayout::for_source(rel, locale);

        let source = std::fs::read_to_string(file)
            .with_context(|| format!("reading {}", file.display()))?;

        let mut vars = self.base_vars(ctx, &layout, locale);
        self.enrich(ctx, file, base_dir, tree, locale, &layout, &mut vars);

        let body = self
            .env
            .render_str(&source, &vars)
            .with_context(|| format!("rendering {}", file.display()))?;

        let html = match self.env.get_template("layout.jinja") {
            Ok(template) => {
                vars.insert("body".to_string(), Value::from(body));
                template
                    .render(&vars)
                    .with_context(|| format!("rendering layout for {}", file.display()))?
            }
            // Sites without a layout emit the page body directly
            Err(_) => body,
        };

        let out = ctx.paths.dist.join(&layout.output_rel);
        write_file(&out, html)?;
        debug!("pages"; "rendered {}", layout.output_rel.display());
        Ok(out)
    }

    fn base_vars(
        &self,
        ctx: &BuildContext,
        layout: &PageLayout,
        locale: &str,
    ) -> BTreeMap<String, Value> {
        let mut vars = BTreeMap::new();
        vars.insert(
            "title".to_string(),
            Value::from(ctx.translations.get("meta.title", locale).to_string()),
        );
        vars.insert("root_path".to_string(), Value::from(layout.root_path.clone()));
        vars.insert(
            "asset_path".to_string(),
            Value::from(format!("{}assets/", layout.root_path)),
        );
        vars.insert("current_path".to_string(), Value::from(layout.current_path.clone()));
        vars.insert("page_url".to_string(), Value::from(layout.page_url.clone()));
        vars.insert("locale".to_string(), Value::from(locale.to_string()));
        vars.insert("tools".to_string(), Value::from_serialize(&ctx.tools.tools));
        vars.insert("global".to_string(), Value::from_serialize(&ctx.config));
        vars.insert(
            "blog_posts".to_string(),
            Value::from_serialize(&ctx.blog_posts),
        );
        vars.insert(
            "package_version".to_string(),
            Value::from(ctx.site_version().to_string()),
        );
        vars.insert("tool_config".to_string(), Value::from_serialize(Mapping::new()));
        vars.insert("feature_name".to_string(), Value::from(()));
        vars.insert("category".to_string(), Value::from(""));
        vars.insert("changelog_html".to_string(), Value::from(""));
        vars.insert("how_to_use_html".to_string(), Value::from(""));
        vars
    }

    /// Feature enrichment plus the category label and markdown sections.
    fn enrich(
        &self,
        ctx: &BuildContext,
        file: &Path,
        base_dir: &Path,
        tree: PageTree,
        locale: &str,
        layout: &PageLayout,
        vars: &mut BTreeMap<String, Value>,
    ) {
        let rel = file.strip_prefix(base_dir).unwrap_or(file);
        let mut category_key = "";

        if tree == PageTree::Features {
            let feature = rel
                .components()
                .next()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .unwrap_or_default();
            let feature_base = format!("assets/features/{feature}/");
            let asset_path = format!("{}{}", layout.root_path, feature_base);

            let mut tool_config = ctx
                .tools
                .get(&feature)
                .map(|t| serde_yaml::to_value(t).unwrap_or_default())
                .unwrap_or(serde_yaml::Value::Mapping(Mapping::new()));
            if let Some(map) = tool_config.as_mapping_mut() {
                let mut assets = Mapping::new();
                assets.insert(
                    "css".into(),
                    ctx.versions
                        .versioned_url(
                            &format!("{asset_path}style.css"),
                            &format!("{feature_base}style.css"),
                        )
                        .into(),
                );
                assets.insert(
                    "js".into(),
                    ctx.versions
                        .versioned_url(
                            &format!("{asset_path}script.js"),
                            &format!("{feature_base}script.js"),
                        )
                        .into(),
                );
                map.insert("_assets".into(), serde_yaml::Value::Mapping(assets));
            }

            if let Some(key) = ctx
                .tools
                .get(&feature)
                .and_then(|t| t.category.as_deref())
                .and_then(lookup_category_key)
            {
                category_key = key;
            }

            vars.insert("asset_path".to_string(), Value::from(asset_path));
            vars.insert("tool_config".to_string(), Value::from_serialize(&tool_config));
            vars.insert("feature_name".to_string(), Value::from(feature.clone()));

            let feature_dir = base_dir.join(&feature);
            if let Some(html) = render_markdown_file(&feature_dir.join("CHANGELOG.md")) {
                vars.insert("changelog_html".to_string(), Value::from(html));
            }
            let localized = feature_dir.join(format!("HOWTOUSE.{locale}.md"));
            let fallback = feature_dir.join("HOWTOUSE.md");
            if let Some(html) =
                render_markdown_file(&localized).or_else(|| render_markdown_file(&fallback))
            {
                vars.insert("how_to_use_html".to_string(), Value::from(html));
            }
        }

        // Directory-name fallback for entries that predate per-feature
        // configs; fires in both trees when the descriptor category
        // resolved nothing.
        if category_key.is_empty()
            && let Some(key) = lookup_legacy_category_key(&layout.dir_name)
        {
            category_key = key;
        }

        // The shared changelog page renders the project-root CHANGELOG.md
        if file.file_stem().and_then(|s| s.to_str()) == Some("changelog")
            && let Some(html) = render_markdown_file(&ctx.paths.root.join("CHANGELOG.md"))
        {
            vars.insert("changelog_html".to_string(), Value::from(html));
        }

        if !category_key.is_empty() {
            vars.insert(
                "category".to_string(),
                Value::from(ctx.translations.get(category_key, locale).to_string()),
            );
        }
    }
}

fn lookup_category_key(category: &str) -> Option<&'static str> {
    CATEGORY_KEYS
        .iter()
        .find(|(id, _)| *id == category)
        .map(|(_, key)| *key)
}

fn lookup_legacy_category_key(dir_name: &str) -> Option<&'static str> {
    LEGACY_CATEGORY_KEYS
        .iter()
        .find(|(id, _)| *id == dir_name)
        .map(|(_, key)| *key)
}

fn render_markdown_file(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let parser = pulldown_cmark::Parser::new(&content);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    Some(html)
}

/// Derived output locations and URL facts for one (source, locale) pair.
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// Output path relative to the dist root.
    pub output_rel: PathBuf,
    /// `../` chain back to the dist root from the output document.
    pub root_path: String,
    /// Locale-independent page URL (trailing slash, or `404.html`).
    pub page_url: String,
    /// Navigation id: "home" for the root index, else the source dir.
    pub current_path: String,
    /// Immediate source directory name (legacy category lookup).
    pub dir_name: String,
}

impl PageLayout {
    /// Output convention: `{locale}/{dir}/index.html`; `404.jinja` keeps
    /// its fixed name; any other non-index file becomes its own
    /// subdirectory's index.
    pub fn for_source(rel: &Path, locale: &str) -> Self {
        let file_name = rel
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent = rel.parent().unwrap_or(Path::new(""));

        let (out_dir, out_file) = if file_name == "404.jinja" {
            (parent.to_path_buf(), "404.html".to_string())
        } else if file_name == "index.jinja" {
            (parent.to_path_buf(), "index.html".to_string())
        } else {
            let slug = rel
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            (parent.join(slug), "index.html".to_string())
        };

        let output_rel = Path::new(locale).join(&out_dir).join(&out_file);

        let depth = output_rel.components().count().saturating_sub(1);
        let root_path = if depth > 0 {
            "../".repeat(depth)
        } else {
            "./".to_string()
        };

        let rel_str = rel.to_string_lossy().replace('\\', "/");
        let page_url = if let Some(prefix) = rel_str.strip_suffix("index.jinja") {
            prefix.trim_start_matches('/').to_string()
        } else if rel_str == "404.jinja" {
            "404.html".to_string()
        } else if let Some(stem) = rel_str.strip_suffix(".jinja") {
            format!("{}/", stem.trim_start_matches('/'))
        } else {
            rel_str.clone()
        };

        let dir_name = parent.to_string_lossy().replace('\\', "/");
        let current_path = if rel_str == "index.jinja" {
            "home".to_string()
        } else {
            dir_name.clone()
        };

        Self {
            output_rel,
            root_path,
            page_url,
            current_path,
            dir_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_index_page() {
        let layout = PageLayout::for_source(Path::new("index.jinja"), "en");
        assert_eq!(layout.output_rel, Path::new("en/index.html"));
        assert_eq!(layout.root_path, "../");
        assert_eq!(layout.page_url, "");
        assert_eq!(layout.current_path, "home");
    }

    #[test]
    fn test_layout_nested_index() {
        let layout = PageLayout::for_source(Path::new("bmi/index.jinja"), "vi");
        assert_eq!(layout.output_rel, Path::new("vi/bmi/index.html"));
        assert_eq!(layout.root_path, "../../");
        assert_eq!(layout.page_url, "bmi/");
        assert_eq!(layout.current_path, "bmi");
    }

    #[test]
    fn test_layout_not_found_page() {
        let layout = PageLayout::for_source(Path::new("404.jinja"), "en");
        assert_eq!(layout.output_rel, Path::new("en/404.html"));
        assert_eq!(layout.page_url, "404.html");
    }

    #[test]
    fn test_layout_named_page_becomes_subdir_index() {
        let layout = PageLayout::for_source(Path::new("about/team.jinja"), "en");
        assert_eq!(layout.output_rel, Path::new("en/about/team/index.html"));
        assert_eq!(layout.root_path, "../../../");
        assert_eq!(layout.page_url, "about/team/");
    }

    #[test]
    fn test_category_tables() {
        assert_eq!(lookup_category_key("finance"), Some("nav.menu_finance"));
        assert_eq!(lookup_category_key("unknown"), None);
        assert_eq!(lookup_legacy_category_key("bmi"), Some("nav.menu_utils"));
        assert_eq!(lookup_legacy_category_key("about"), None);
    }
}
