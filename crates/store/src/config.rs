//! Store configuration.
//!
//! Precedence, highest first:
//! 1. **CODE**: an explicit `StoreConfig` passed to `ObjectStore::with_config`
//! 2. **ENV**: `SIMPLEDAO_CAPACITY`, `SIMPLEDAO_DEFAULT_TIMEOUT_MS`
//! 3. **FILE**: JSON via `StoreConfig::from_json`
//! 4. **DEFAULT**: unbounded store, zero default write timeout
//!
//! ```bash
//! export SIMPLEDAO_CAPACITY=10000
//! export SIMPLEDAO_DEFAULT_TIMEOUT_MS=250
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use simpledao_core::{DaoError, DaoResult};

pub const CAPACITY_ENV: &str = "SIMPLEDAO_CAPACITY";
pub const DEFAULT_TIMEOUT_ENV: &str = "SIMPLEDAO_DEFAULT_TIMEOUT_MS";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of live objects. `None` means unbounded, in which case
    /// writes never block.
    pub capacity: Option<usize>,

    /// How long a write without an explicit timeout waits for space in a
    /// full bounded store.
    pub default_timeout_ms: u64,
}

impl StoreConfig {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn validate(&self) -> DaoResult<()> {
        if self.capacity == Some(0) {
            return Err(DaoError::invalid_config("capacity must be greater than zero"));
        }
        Ok(())
    }

    /// Load from process environment variables; unset variables keep their
    /// defaults.
    pub fn from_env() -> DaoResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_json(json: &str) -> DaoResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DaoError::invalid_config(format!("bad store config json: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DaoResult<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(CAPACITY_ENV).filter(|v| !v.trim().is_empty()) {
            let capacity = raw.trim().parse::<usize>().map_err(|e| {
                DaoError::invalid_config(format!("{CAPACITY_ENV}='{raw}': {e}"))
            })?;
            config.capacity = Some(capacity);
        }

        if let Some(raw) = lookup(DEFAULT_TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
            config.default_timeout_ms = raw.trim().parse::<u64>().map_err(|e| {
                DaoError::invalid_config(format!("{DEFAULT_TIMEOUT_ENV}='{raw}': {e}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }
}
