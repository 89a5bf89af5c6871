//! Embedded default root templates.
//!
//! These ship inside the binary and act as the base layer for the root
//! template overlay: a project-level `src/templates/` file with the same
//! name wins over the built-in default.

/// (template file name, source) pairs for the built-in defaults.
pub const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    (
        "sitemap.xml.jinja",
        include_str!("templates/sitemap.xml.jinja"),
    ),
    ("robots.txt.jinja", include_str!("templates/robots.txt.jinja")),
];
