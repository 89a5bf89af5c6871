//! Blog posts: Markdown files with a simple front matter header.
//!
//! Front matter is a `---`-delimited block of `key: value` lines. The line
//! splits at the first colon; values keep any further colons verbatim.
//! This is deliberately not full YAML — no nesting, no escaping beyond
//! whitespace trimming.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::Paths;

/// A parsed blog post. Attributes flatten into the template context, so
/// `post.title`, `post.date` etc. resolve directly.
#[derive(Debug, Clone, Serialize)]
pub struct BlogPost {
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
    pub body: String,
}

impl BlogPost {
    pub fn slug(&self) -> &str {
        self.attributes.get("slug").map(String::as_str).unwrap_or("")
    }

    pub fn date(&self) -> &str {
        self.attributes.get("date").map(String::as_str).unwrap_or("")
    }
}

/// Split content into front matter attributes and body.
///
/// Content without a leading `---` line has no attributes; the whole input
/// is the body.
pub fn parse_front_matter(content: &str) -> (BTreeMap<String, String>, String) {
    let mut attributes = BTreeMap::new();

    let Some(rest) = content.strip_prefix("---\n") else {
        return (attributes, content.to_string());
    };

    let (block, body) = if let Some(after) = rest.strip_prefix("---\n") {
        ("", after)
    } else if let Some(idx) = rest.find("\n---\n") {
        (&rest[..idx], &rest[idx + 5..])
    } else {
        return (attributes, content.to_string());
    };

    for line in block.lines() {
        if let Some((key, value)) = line.split_once(':') {
            attributes.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    (attributes, body.trim().to_string())
}

/// Load `features/blog/posts/*.md`, sorted by date descending.
///
/// A post without an explicit `slug` attribute defaults to its filename.
pub fn load_blog_posts(paths: &Paths) -> Vec<BlogPost> {
    let posts_dir = paths.features_dir().join("blog").join("posts");
    let Ok(entries) = std::fs::read_dir(&posts_dir) else {
        return Vec::new();
    };

    let mut posts = Vec::new();
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        let (mut attributes, body) = parse_front_matter(&content);
        if !attributes.contains_key("slug") {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            attributes.insert("slug".to_string(), stem);
        }
        posts.push(BlogPost { attributes, body });
    }

    // ISO-8601 dates order lexically; undated posts sink to the end
    posts.sort_by(|a, b| b.date().cmp(a.date()));
    posts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildMode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_front_matter_first_colon_splits() {
        let (attrs, body) =
            parse_front_matter("---\ntitle: Build: the sequel\ndate: 2026-01-02\n---\nBody text");
        assert_eq!(attrs["title"], "Build: the sequel");
        assert_eq!(attrs["date"], "2026-01-02");
        assert_eq!(body, "Body text");
    }

    #[test]
    fn test_no_front_matter() {
        let (attrs, body) = parse_front_matter("# Just markdown\n");
        assert!(attrs.is_empty());
        assert_eq!(body, "# Just markdown\n");
    }

    #[test]
    fn test_empty_front_matter_block() {
        let (attrs, body) = parse_front_matter("---\n---\nBody");
        assert!(attrs.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_unterminated_block_is_body() {
        let input = "---\ntitle: Dangling\nno closing fence";
        let (attrs, body) = parse_front_matter(input);
        assert!(attrs.is_empty());
        assert_eq!(body, input);
    }

    #[test]
    fn test_posts_sorted_by_date_desc_with_slug_default() {
        let dir = TempDir::new().unwrap();
        let paths = Paths::new(dir.path(), BuildMode::Dev);
        let posts_dir = paths.features_dir().join("blog").join("posts");
        fs::create_dir_all(&posts_dir).unwrap();
        fs::write(
            posts_dir.join("older.md"),
            "---\ndate: 2025-03-01\n---\nOld",
        )
        .unwrap();
        fs::write(
            posts_dir.join("newer.md"),
            "---\ndate: 2026-01-15\nslug: fresh\n---\nNew",
        )
        .unwrap();

        let posts = load_blog_posts(&paths);
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].slug(), "fresh");
        assert_eq!(posts[1].slug(), "older");
    }
}
