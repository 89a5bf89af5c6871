//! Data loading: tool descriptors, translation tables, and blog posts.

pub mod blog;
pub mod locales;
pub mod tools;

pub use blog::{BlogPost, load_blog_posts, parse_front_matter};
pub use locales::{Translations, deep_merge};
pub use tools::{ToolConfig, ToolIndex, ToolMeta, ToolMode, ToolStatus, list_feature_dirs};
