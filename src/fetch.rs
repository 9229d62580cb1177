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

//! sensor.community API fetch module

use crate::config::LoggerConfig;
use crate::error::{LoggerError, Result};
use crate::reading::RawRecord;
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://data.sensor.community";
const USER_AGENT: &str = "airrohr-logger/0.1.0";

/// Fetch the recent raw records for the configured sensor.
///
/// One bounded-timeout GET; any network, status, or body-parse failure maps
/// to [`LoggerError::Fetch`] so the caller can abort the cycle without
/// touching persisted state.
pub async fn fetch_recent_records(config: &LoggerConfig) -> Result<Vec<RawRecord>> {
    let base_url = config.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE);
    let url = format!("{base_url}/airrohr/v1/sensor/{}/", config.sensor_id);
    debug!("Fetching sensor data from {url}");

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| LoggerError::Fetch(format!("Failed to build HTTP client: {e}")))?;

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| LoggerError::Fetch(format!("Request failed: {e}")))?;

    if response.status().is_client_error() || response.status().is_server_error() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        return Err(LoggerError::Fetch(format!(
            "Sensor API error {status}: {body}"
        )));
    }

    let records: Vec<RawRecord> = response
        .json()
        .await
        .map_err(|e| LoggerError::Fetch(format!("Failed to parse response: {e}")))?;

    debug!("Received {} raw records", records.len());
    Ok(records)
}
