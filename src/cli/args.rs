//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DeployStrategy;

/// Sitewright static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long, global = true, default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub root: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the site
    #[command(visible_alias = "b")]
    Build {
        /// Ignore the build cache and rebuild everything
        #[arg(short, long)]
        force: bool,

        /// Production build: minify and obfuscate into dist/
        #[arg(short, long)]
        obfuscate: bool,
    },

    /// Dev build followed by the admin server
    #[command(visible_alias = "d")]
    Dev {
        /// Port for the admin server
        #[arg(short, long, default_value_t = crate::admin::DEFAULT_PORT)]
        port: u16,
    },

    /// Production build and push to the configured remote
    Deploy {
        /// Target branch on the remote
        #[arg(long)]
        branch: Option<String>,

        /// Remote name or URL
        #[arg(long)]
        remote: Option<String>,

        /// Folder to publish
        #[arg(long)]
        dist_folder: Option<String>,

        /// Push strategy (init or subtree)
        #[arg(long, value_enum)]
        strategy: Option<DeployStrategy>,
    },

    /// Scan feature health (config, locales, status)
    Status,

    /// Report per-feature asset payload sizes
    Analyze,

    /// Remove build artifacts
    Cleanup {
        /// Also delete feature directories whose status is draft
        #[arg(long)]
        drafts: bool,
    },

    /// Bump feature versions
    Version {
        /// Bump level (defaults to patch)
        #[arg(value_enum)]
        level: Option<BumpLevel>,

        /// Feature id to bump, or "all"
        id: Option<String>,
    },

    /// Scaffold a new feature
    New {
        /// Feature id (directory name under src/features/)
        id: String,
    },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpLevel {
    Major,
    Minor,
    Patch,
}
