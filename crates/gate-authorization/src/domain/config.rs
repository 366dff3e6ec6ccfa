//! Gate configuration with validation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigurationError;

/// Authorization pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Joins ancestor and own aliases (default: a single space)
    pub separator: String,
    /// Deadline for a single check evaluation
    ///
    /// Needs a tokio runtime with the time driver enabled.
    #[serde(with = "humantime_serde")]
    pub check_timeout: Option<Duration>,
    /// Deadline for a single cooldown evaluation
    ///
    /// Needs a tokio runtime with the time driver enabled.
    #[serde(with = "humantime_serde")]
    pub cooldown_timeout: Option<Duration>,
    /// Convert panics inside policies into faults
    pub catch_panics: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            separator: " ".to_string(),
            check_timeout: None,
            cooldown_timeout: None,
            catch_panics: true,
        }
    }
}

impl GateConfig {
    pub fn builder() -> GateConfigBuilder {
        GateConfigBuilder::default()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.separator.is_empty() {
            return Err(ConfigurationError::EmptySeparator);
        }

        if self.check_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigurationError::InvalidConfig(
                "check_timeout cannot be 0".into(),
            ));
        }

        if self.cooldown_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigurationError::InvalidConfig(
                "cooldown_timeout cannot be 0".into(),
            ));
        }

        Ok(())
    }
}

/// Fluent builder for `GateConfig`
#[derive(Debug, Default)]
pub struct GateConfigBuilder {
    config: GateConfig,
}

impl GateConfigBuilder {
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.config.separator = separator.into();
        self
    }

    pub fn check_timeout(mut self, timeout: Duration) -> Self {
        self.config.check_timeout = Some(timeout);
        self
    }

    pub fn cooldown_timeout(mut self, timeout: Duration) -> Self {
        self.config.cooldown_timeout = Some(timeout);
        self
    }

    pub fn catch_panics(mut self, enabled: bool) -> Self {
        self.config.catch_panics = enabled;
        self
    }

    pub fn build(self) -> Result<GateConfig, ConfigurationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
