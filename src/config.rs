// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Airrohr Logger.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Configuration module for the logger

use crate::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "logger_config.json";

fn default_sensor_id() -> String {
    "94448".to_string()
}

fn default_data_file() -> PathBuf {
    data_dir().join("sensor_history.json")
}

fn default_24() -> u64 {
    24
}

fn default_10() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// sensor.community sensor to poll
    #[serde(default = "default_sensor_id")]
    pub sensor_id: String,

    /// Custom API base URL for testing (overrides the default sensor.community API)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Where the rolling history snapshot lives
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// How far back readings are retained (hours)
    #[serde(default = "default_24")]
    pub retention_hours: u64,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_10")]
    pub request_timeout_secs: u64,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            sensor_id: default_sensor_id(),
            api_base_url: None,
            data_file: default_data_file(),
            retention_hours: 24,
            request_timeout_secs: 10,
        }
    }
}

/// Data directory next to the executable, falling back to the working
/// directory when the executable path cannot be resolved.
pub fn data_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("data")
}

pub fn load_config() -> Result<LoggerConfig> {
    load_config_from(&data_dir().join(CONFIG_FILE))
}

pub fn load_config_from(path: &Path) -> Result<LoggerConfig> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| LoggerError::Config(format!("Failed to parse config: {e}")))
    } else {
        // Create with defaults
        let config = LoggerConfig::default();
        save_config(&config, path)?;
        Ok(config)
    }
}

pub fn save_config(config: &LoggerConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    let content = serde_json::to_string_pretty(config)?;

    // Atomic write
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;

    Ok(())
}
