//! Errors raised while loading shell configuration

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file on the search path, or named explicitly, is unreadable.
    #[error("cannot read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("malformed config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config key {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
