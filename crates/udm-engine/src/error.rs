//! Error types for the diagnostic engine
//!
//! Steady-state operations (ticking, fan-out, queries) are total; the only
//! failures are configuration problems and starting a second monitor for a
//! subsystem that already has one.

use crate::event::SubsystemId;

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration rejected by validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration document could not be parsed
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Subsystem already has a running monitor
    #[error("subsystem already monitored: {0}")]
    AlreadyMonitored(SubsystemId),
}

impl EngineError {
    /// Create invalid-config error
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

/// Engine result alias
pub type EngineResult<T> = Result<T, EngineError>;
