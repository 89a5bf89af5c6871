//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from reading a single configuration file.
///
/// The global config loader stays tolerant and falls back to defaults;
/// per-feature descriptors surface these so callers decide whether to
/// skip the feature or abort.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("error parsing `{0}`")]
    Yaml(PathBuf, #[source] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("tool.yaml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        let display = format!("{io_err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("tool.yaml"));

        let yaml_err: serde_yaml::Error = serde_yaml::from_str::<u32>("[oops").unwrap_err();
        let display = format!("{}", ConfigError::Yaml(PathBuf::from("global.yaml"), yaml_err));
        assert!(display.contains("global.yaml"));
    }
}
