//! Configuration: build mode, path resolution, and the global site config.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── mode      # BuildMode (dev vs secure) and cache namespaces
//! ├── paths     # Paths resolver (src/dist/cache locations)
//! ├── global    # GlobalConfig (global.yaml schema)
//! ├── deploy    # DeploymentConfig (deployment: section)
//! └── error     # ConfigError
//! ```

mod deploy;
mod error;
mod global;
mod mode;
mod paths;

pub use deploy::{DeployOverrides, DeployStrategy, DeploymentConfig};
pub use error::ConfigError;
pub use global::{BuildSection, GlobalConfig};
pub use mode::BuildMode;
pub use paths::Paths;
