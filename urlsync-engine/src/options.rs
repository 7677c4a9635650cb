use crate::error::SyncResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use urlsync_codec::ArrayFormat;

/// Quiet period before state changes are written to the location (ms).
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Quiet period used by the legacy preset (ms).
pub const LEGACY_DEBOUNCE_MS: u64 = 500;

/// Configuration for a sync router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Key-paths never synchronized in either direction.
    pub exclude: Vec<String>,
    /// Debounce interval for state-to-location writes (ms).
    pub debounce_ms: u64,
    /// How arrays appear in the query.
    pub array_format: ArrayFormat,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            array_format: ArrayFormat::Repeated,
        }
    }
}

impl SyncOptions {
    /// Preset for routers that cannot store multi-value parameters:
    /// arrays joined with the default separator and a 500 ms debounce.
    pub fn legacy() -> Self {
        Self {
            debounce_ms: LEGACY_DEBOUNCE_MS,
            array_format: ArrayFormat::joined(),
            ..Self::default()
        }
    }

    /// Reads options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> SyncResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_exclude<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.iter().any(|excluded| excluded == path)
    }
}
