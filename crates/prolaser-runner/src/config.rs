//! Application configuration file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use prolaser_link::{
    SerialConfig, DEFAULT_BAUD_RATE, DEFAULT_EVENT_LOG_CAPACITY, DEFAULT_RESPONSE_TIMEOUTS,
};
use serde::{Deserialize, Serialize};

use crate::error::RunnerError;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "prolaser.json";

/// Settings loaded from `prolaser.json`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Serial port of the device for direct commands.
    pub port: Option<String>,
    /// Host-side line of a tap.
    pub tap_host_port: Option<String>,
    /// Device-side line of a tap.
    pub tap_device_port: Option<String>,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    /// Empty reads tolerated while waiting for a reply.
    pub response_timeouts: u32,
    pub event_log_capacity: usize,
    /// Dispatcher verbosity (0-5).
    pub verbosity: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: None,
            tap_host_port: None,
            tap_device_port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: 20,
            response_timeouts: DEFAULT_RESPONSE_TIMEOUTS,
            event_log_capacity: DEFAULT_EVENT_LOG_CAPACITY,
            verbosity: 4,
        }
    }
}

impl AppConfig {
    /// Load `path`, or defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, RunnerError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(AppConfig::default());
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text).map_err(|source| RunnerError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), RunnerError> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        fs::write(path, text)?;
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Serial settings for `path` using this config's speed and timeout.
    pub fn serial(&self, path: &str) -> SerialConfig {
        SerialConfig {
            path: path.to_string(),
            baud_rate: self.baud_rate,
            read_timeout: self.read_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.baud_rate, 19_200);
        assert_eq!(config.response_timeouts, 25);
        assert_eq!(config.event_log_capacity, 100);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prolaser.json");
        let config = AppConfig {
            port: Some("/dev/ttyUSB0".to_string()),
            verbosity: 2,
            ..AppConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prolaser.json");
        fs::write(&path, r#"{"port": "COM3", "baud_rate": 9600}"#).unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.port.as_deref(), Some("COM3"));
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.read_timeout(), Duration::from_millis(20));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prolaser.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(RunnerError::Config { .. })
        ));
    }
}
