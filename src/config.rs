//! Type-safe configuration value object for the driver.
//!
//! Replaces ad-hoc flag plumbing with a strongly-typed struct loaded from
//! TOML. Benefits:
//!
//! - Compile-time type safety
//! - Centralized validation logic
//! - Self-documenting configuration requirements
//!
//! # Example
//!
//! ```toml
//! port = "/dev/ttyUSB0"
//! baud_rate = 9600
//! poll_interval = "5ms"
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{AdvError, AdvResult};

fn default_baud_rate() -> u32 {
    9600
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(5)
}

/// Acquisition configuration for one Vector instrument.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdvConfig {
    /// Serial port path (e.g., "/dev/ttyUSB0", "COM3").
    pub port: String,
    /// Baud rate; the Vector ships configured for 9600.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Delay between poll passes of the acquisition loop.
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub poll_interval: Duration,
}

impl AdvConfig {
    /// Parse a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the TOML structure doesn't match the expected
    /// fields or field types are incorrect.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("Failed to parse ADV configuration")
    }

    /// Load and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&contents)
    }

    /// Validate the configuration parameters.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `port` is empty
    /// - `baud_rate` is zero
    /// - `poll_interval` is zero
    pub fn validate(&self) -> AdvResult<()> {
        if self.port.is_empty() {
            return Err(AdvError::Config("port must not be empty".into()));
        }
        if self.baud_rate == 0 {
            return Err(AdvError::Config("baud_rate must be greater than 0".into()));
        }
        if self.poll_interval.is_zero() {
            return Err(AdvError::Config(
                "poll_interval must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Load, parse and validate a configuration file in one call.
    pub fn from_file_validated(path: &Path) -> Result<Self> {
        let config = Self::from_file(path)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for AdvConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: default_baud_rate(),
            poll_interval: default_poll_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        assert!(AdvConfig::default().validate().is_ok());
    }

    #[test]
    fn validation_rejects_empty_port() {
        let config = AdvConfig {
            port: String::new(),
            ..AdvConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_zero_baud_rate() {
        let config = AdvConfig {
            baud_rate: 0,
            ..AdvConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_toml_with_defaults() {
        let config = AdvConfig::from_toml(r#"port = "/dev/ttyS2""#).unwrap();
        assert_eq!(config.port, "/dev/ttyS2");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.poll_interval, Duration::from_millis(5));
    }

    #[test]
    fn parses_humantime_poll_interval() {
        let config = AdvConfig::from_toml(
            r#"
            port = "COM3"
            baud_rate = 19200
            poll_interval = "20ms"
            "#,
        )
        .unwrap();
        assert_eq!(config.baud_rate, 19_200);
        assert_eq!(config.poll_interval, Duration::from_millis(20));
    }

    #[test]
    fn loads_and_validates_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"port = "/dev/ttyUSB1""#).unwrap();
        let config = AdvConfig::from_file_validated(file.path()).unwrap();
        assert_eq!(config.port, "/dev/ttyUSB1");
    }
}
