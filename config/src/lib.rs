//! swish configuration
//!
//! YAML configuration for the swish shell: prompt, history and logging.
//!
//! # Configuration Loading Priority
//!
//! 1. Compiled-in defaults
//! 2. `/etc/swish/swish.yaml` (system-wide)
//! 3. `~/.config/swish/swish.yaml` (user)
//! 4. `./swish.yaml` (project-local)
//! 5. `SWISH_CONFIG=/path/to/config.yaml` or `--config` (explicit, replaces 2-4)
//! 6. Environment variables (highest priority)
//!
//! # Example Configuration
//!
//! ```yaml
//! shell:
//!   prompt: "@> "
//!   history:
//!     enabled: true
//!     file: "~/.swish_history"
//!     max_entries: 1000
//!
//! logging:
//!   level: debug
//!   format: compact
//! ```

#![allow(missing_docs)]

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use types::*;

/// Load configuration from default locations.
///
/// Searches for config files in order and merges them.
/// Environment variables override file values.
pub fn load() -> Result<SwishConfig, ConfigError> {
    ConfigLoader::new().load()
}

/// Load configuration from a specific file.
pub fn load_from_file(path: &str) -> Result<SwishConfig, ConfigError> {
    ConfigLoader::new().with_file(path).load()
}
