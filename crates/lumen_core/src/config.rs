//! Runtime configuration
//!
//! Lumen reads host-level tuning from `lumen.toml`. Every field is optional
//! and falls back to the documented default:
//!
//! ```toml
//! [readiness]
//! poll_interval_ms = 10
//! # timeout_ms = 5000   # omit to wait indefinitely
//!
//! [enhance]
//! retry_delay_ms = 100
//!
//! [countdown]
//! tick_interval_ms = 1000   # display refresh; time always runs in real seconds
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LumenError, Result};

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LumenConfig {
    #[serde(default)]
    pub readiness: ReadinessConfig,
    #[serde(default)]
    pub enhance: EnhanceConfig,
    #[serde(default)]
    pub countdown: CountdownDefaults,
}

/// Readiness gate polling
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReadinessConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Bounded wait; `None` waits indefinitely
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_poll_interval_ms() -> u64 {
    10
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: None,
        }
    }
}

impl ReadinessConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Reactive framework reprocessing
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnhanceConfig {
    /// Delay before the single retry of a failed enhancement
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_retry_delay_ms() -> u64 {
    100
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl EnhanceConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Countdown widget defaults
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CountdownDefaults {
    /// How often a running countdown re-renders
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for CountdownDefaults {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl CountdownDefaults {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl LumenConfig {
    /// Parse from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| LumenError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LumenConfig::from_toml_str("").unwrap();
        assert_eq!(config, LumenConfig::default());
        assert_eq!(config.readiness.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.readiness.timeout(), None);
        assert_eq!(config.enhance.retry_delay(), Duration::from_millis(100));
        assert_eq!(config.countdown.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_sections() {
        let config = LumenConfig::from_toml_str(
            r#"
            [readiness]
            timeout_ms = 2500

            [enhance]
            retry_delay_ms = 40
            "#,
        )
        .unwrap();

        assert_eq!(config.readiness.poll_interval_ms, 10);
        assert_eq!(config.readiness.timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.enhance.retry_delay_ms, 40);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let err = LumenConfig::from_toml_str("[readiness\npoll").unwrap_err();
        assert!(matches!(err, LumenError::ConfigParse(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = LumenConfig::default();
        config.readiness.timeout_ms = Some(1000);
        let text = config.to_toml().unwrap();
        assert_eq!(LumenConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = LumenConfig::load(Path::new("/nonexistent/lumen.toml")).unwrap_err();
        assert!(matches!(err, LumenError::ConfigRead { .. }));
    }
}
