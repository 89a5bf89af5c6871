//! Sitewright - an incremental static site generator for multi-tool,
//! multi-locale websites.

mod admin;
mod asset;
mod cli;
mod config;
mod context;
mod data;
mod embed;
mod freshness;
mod generator;
mod logger;
mod page;
mod utils;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::{BuildMode, DeployOverrides};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::set_verbose(cli.verbose);
    let root = cli.root.as_path();

    match cli.command {
        Commands::Build { force, obfuscate } => {
            let mode = if obfuscate {
                BuildMode::Secure
            } else {
                BuildMode::Dev
            };
            cli::build::run(root, mode, force)
        }
        Commands::Dev { port } => {
            cli::build::run(root, BuildMode::Dev, false)?;
            admin::serve(root, port)
        }
        Commands::Deploy {
            branch,
            remote,
            dist_folder,
            strategy,
        } => {
            let overrides = DeployOverrides {
                branch,
                remote,
                dist_folder,
                strategy,
            };
            cli::deploy::run(root, &overrides)
        }
        Commands::Status => cli::status::run(root),
        Commands::Analyze => cli::analyze::run(root),
        Commands::Cleanup { drafts } => cli::cleanup::run(root, drafts),
        Commands::Version { level, id } => {
            cli::version::run(root, level.unwrap_or(cli::BumpLevel::Patch), id.as_deref())
        }
        Commands::New { id } => cli::new::run(root, &id),
    }
}
