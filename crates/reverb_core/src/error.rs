//! # Error Types
//!
//! Runtime failures of the snapshot cache itself are not errors: an
//! unavailable snapshot is `None`, unloaded terrain is `BlockState::UNKNOWN`,
//! a stale profiler handle is a no-op. What remains is configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading the cache configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or has unexpected keys.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its allowed range.
    #[error("invalid configuration: {field} {reason}")]
    Invalid {
        /// Offending key.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
