//! Command-line interface module.

mod args;
pub mod analyze;
pub mod build;
pub mod cleanup;
pub mod deploy;
pub mod new;
pub mod status;
pub mod version;

pub use args::{BumpLevel, Cli, Commands};
