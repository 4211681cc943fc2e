//! # Cache Configuration
//!
//! Tuning constants of the snapshot cache, read once at startup and
//! immutable afterwards.
//!
//! ## File Format
//!
//! ```toml
//! [level_cache]
//! access_mode = "snapshot"     # or "direct" (unsafe fallback, debug only)
//! clone_radius = 4             # chunks around the observer, per axis
//! max_retain_ticks = 20        # rebuild after this many ticks
//! max_retain_distance = 16     # ...or after the observer moved this many blocks
//! report_interval = 100        # log profiler stats every N rebuilds
//! ```
//!
//! Every key is optional; missing keys take the defaults from
//! `reverb_shared::constants`.

use std::path::Path;

use reverb_shared::{
    DEFAULT_CLONE_RADIUS, DEFAULT_MAX_RETAIN_DISTANCE, DEFAULT_MAX_RETAIN_TICKS,
    DEFAULT_REPORT_INTERVAL, MAX_CLONE_RADIUS,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Where reader threads get their block data from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Immutable snapshots published by the tick thread.
    #[default]
    Snapshot,
    /// Read the live world through its lock. Contends with the tick thread;
    /// fallback and debugging only.
    Direct,
}

/// Snapshot cache tuning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Snapshot or direct access.
    pub access_mode: AccessMode,
    /// Chunks captured around the observer's chunk on each axis.
    pub clone_radius: u32,
    /// Maximum snapshot age in ticks.
    pub max_retain_ticks: u64,
    /// Maximum observer drift in blocks.
    pub max_retain_distance: u32,
    /// Rebuilds between two profiler reports (0 disables reporting).
    pub report_interval: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            access_mode: AccessMode::Snapshot,
            clone_radius: DEFAULT_CLONE_RADIUS,
            max_retain_ticks: DEFAULT_MAX_RETAIN_TICKS,
            max_retain_distance: DEFAULT_MAX_RETAIN_DISTANCE,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    level_cache: CacheConfig,
}

impl CacheConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let file: ConfigFile = toml::from_str(source)?;
        file.level_cache.validate()?;
        Ok(file.level_cache)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`CacheConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded level cache configuration");
        Ok(config)
    }

    /// Checks every value is in its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.clone_radius == 0 {
            return Err(ConfigError::Invalid {
                field: "clone_radius",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.clone_radius > MAX_CLONE_RADIUS {
            return Err(ConfigError::Invalid {
                field: "clone_radius",
                reason: format!("must be at most {MAX_CLONE_RADIUS}, got {}", self.clone_radius),
            });
        }
        if self.max_retain_ticks == 0 {
            return Err(ConfigError::Invalid {
                field: "max_retain_ticks",
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}
