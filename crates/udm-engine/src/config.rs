//! Engine configuration
//!
//! All knobs have defaults matching the reference panel behaviour. A config
//! may be built in code with the `with_*` methods or parsed from TOML:
//!
//! ```toml
//! tick_period_ms = 1000
//! alert_capacity = 5
//! seed = 42
//!
//! [message_pools]
//! "Boilers" = ["Drum level nominal", "Feedwater drift detected"]
//! ```

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Monitor tick period in milliseconds
    pub tick_period_ms: u64,
    /// Alerts retained per subsystem
    pub alert_capacity: usize,
    /// Log lines retained per subsystem
    pub log_capacity: usize,
    /// RNG seed; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Lines every new subsystem log starts with
    pub bootstrap_lines: Vec<String>,
    /// Buffered events per broadcast subscriber
    pub event_channel_capacity: usize,
    /// Extra or replacement message pools keyed by subsystem id
    pub message_pools: BTreeMap<String, Vec<String>>,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// - `EngineError::ConfigParse` on malformed TOML or unknown keys
    /// - `EngineError::InvalidConfig` if validation fails
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `EngineError::InvalidConfig` naming the first offending field
    pub fn validate(&self) -> EngineResult<()> {
        if self.tick_period_ms == 0 {
            return Err(EngineError::invalid_config(
                "tick_period_ms must be greater than zero",
            ));
        }
        if self.alert_capacity == 0 {
            return Err(EngineError::invalid_config(
                "alert_capacity must be greater than zero",
            ));
        }
        if self.log_capacity == 0 {
            return Err(EngineError::invalid_config(
                "log_capacity must be greater than zero",
            ));
        }
        if self.event_channel_capacity == 0 {
            return Err(EngineError::invalid_config(
                "event_channel_capacity must be greater than zero",
            ));
        }
        if let Some((id, _)) = self.message_pools.iter().find(|(_, pool)| pool.is_empty()) {
            return Err(EngineError::invalid_config(format!(
                "message pool for {id} is empty"
            )));
        }
        Ok(())
    }

    /// Tick period as a duration
    #[inline]
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// With tick period
    #[inline]
    #[must_use]
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With alert capacity
    #[inline]
    #[must_use]
    pub fn with_alert_capacity(mut self, capacity: usize) -> Self {
        self.alert_capacity = capacity;
        self
    }

    /// With log capacity
    #[inline]
    #[must_use]
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// With fixed RNG seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// With bootstrap lines
    #[must_use]
    pub fn with_bootstrap_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bootstrap_lines = lines.into_iter().map(Into::into).collect();
        self
    }

    /// With message pool for one subsystem
    #[must_use]
    pub fn with_message_pool<I, S>(mut self, subsystem: impl Into<String>, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.message_pools.insert(
            subsystem.into(),
            templates.into_iter().map(Into::into).collect(),
        );
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 2500,
            alert_capacity: 3,
            log_capacity: 50,
            seed: None,
            bootstrap_lines: vec![
                "[INIT] Universal Diagnostic Machine online".to_string(),
                "[CHECK] Sensors synced, heartbeat nominal".to_string(),
                "[INFO] Awaiting service selection...".to_string(),
            ],
            event_channel_capacity: 256,
            message_pools: BTreeMap::new(),
        }
    }
}
