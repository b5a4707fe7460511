//! Engine settings

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use xsync_fs::{ConfigStore, DEFAULT_CHUNK_SIZE, NormalizedPath, RobustnessConfig};

use crate::Result;

/// Which side wins when both files differ but carry the same timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// External overwrites local
    #[default]
    External,
    /// Local overwrites external
    Local,
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External => write!(f, "external"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Lock and durability settings for copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RobustnessSettings {
    pub lock_timeout_ms: u64,
    pub enable_fsync: bool,
}

impl Default for RobustnessSettings {
    fn default() -> Self {
        let defaults = RobustnessConfig::default();
        Self {
            lock_timeout_ms: defaults.lock_timeout.as_millis() as u64,
            enable_fsync: defaults.enable_fsync,
        }
    }
}

impl RobustnessSettings {
    pub fn to_config(&self) -> RobustnessConfig {
        RobustnessConfig {
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
            enable_fsync: self.enable_fsync,
        }
    }
}

/// Settings for a reconciliation run.
///
/// Every field has a default, so a settings file only needs the keys it
/// changes:
///
/// ```toml
/// tie_break = "local"
///
/// [robustness]
/// lock_timeout_ms = 500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncSettings {
    /// Bytes read per side per comparison step
    pub chunk_size: usize,
    pub tie_break: TieBreak,
    /// Carry the source's modification time over to the copy
    pub preserve_mtime: bool,
    /// Decide and report, but never copy
    pub dry_run: bool,
    pub robustness: RobustnessSettings,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            tie_break: TieBreak::default(),
            preserve_mtime: true,
            dry_run: false,
            robustness: RobustnessSettings::default(),
        }
    }
}

impl SyncSettings {
    /// Load settings from a TOML, JSON or YAML file.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behaviour() {
        let settings = SyncSettings::default();
        assert_eq!(settings.chunk_size, 2048);
        assert_eq!(settings.tie_break, TieBreak::External);
        assert!(settings.preserve_mtime);
        assert!(!settings.dry_run);
    }

    #[test]
    fn robustness_round_trips_to_config() {
        let settings = RobustnessSettings {
            lock_timeout_ms: 750,
            enable_fsync: false,
        };
        let config = settings.to_config();
        assert_eq!(config.lock_timeout, Duration::from_millis(750));
        assert!(!config.enable_fsync);
    }
}
