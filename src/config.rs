//! Monitor configuration, read from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Interface to capture on
    pub interface: String,
    /// Packets captured per monitoring cycle
    pub batch_packets: usize,
    /// Delay between cycle starts (milliseconds)
    pub cycle_delay_ms: u64,
    /// Capture read timeout; bounds how long an interrupt waits (milliseconds)
    pub read_timeout_ms: u64,
    /// Start monitoring as soon as the binary is up
    pub autostart: bool,
    /// Classifier artifacts
    pub model: ModelConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// ONNX binary classifier
    pub model_path: PathBuf,
    /// Standard-scaler parameters (JSON)
    pub scaler_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("batch_packets must be positive")]
    ZeroBatch,
    #[error("cycle_delay_ms must be positive")]
    ZeroDelay,
    #[error("interface name is empty")]
    EmptyInterface,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interface: "eth0".to_string(),
            batch_packets: 100,
            cycle_delay_ms: 2000,
            read_timeout_ms: 250,
            autostart: true,
            model: ModelConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model.onnx"),
            scaler_path: PathBuf::from("scaler.json"),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl MonitorConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config unreadable; using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str::<MonitorConfig>(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config invalid; using defaults");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interface.trim().is_empty() {
            return Err(ConfigError::EmptyInterface);
        }
        if self.batch_packets == 0 {
            return Err(ConfigError::ZeroBatch);
        }
        if self.cycle_delay_ms == 0 {
            return Err(ConfigError::ZeroDelay);
        }
        Ok(())
    }

    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(self.cycle_delay_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.max(1))
    }
}
