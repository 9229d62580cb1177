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

//! Data model for raw sensor records and flattened history readings

use crate::error::{LoggerError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Timestamp format used by the sensor.community API (naive UTC, second
/// resolution). Zero-padded and fixed-width, so lexicographic order on the
/// string equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One measurement inside a raw airrohr record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorDataValue {
    pub value_type: String,
    pub value: Value,
}

/// One raw record as served by the sensor.community API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub timestamp: String,
    pub sensordatavalues: Vec<SensorDataValue>,
}

/// One flattened reading as persisted in the history file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: String,
    pub values: BTreeMap<String, Value>,
}

/// Parse a timestamp under the fixed API format
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|e| LoggerError::Timestamp {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

impl Reading {
    /// Flatten a raw record into a keyed `values` mapping. Duplicate value
    /// types within one record are last-write-wins. The timestamp is
    /// format-checked here, at the ingestion boundary, so a malformed one
    /// is rejected as [`LoggerError::Timestamp`] instead of surfacing later
    /// during pruning.
    pub fn from_raw(raw: RawRecord) -> Result<Self> {
        parse_timestamp(&raw.timestamp)?;

        let mut values = BTreeMap::new();
        for item in raw.sensordatavalues {
            values.insert(item.value_type, item.value);
        }

        Ok(Self {
            timestamp: raw.timestamp,
            values,
        })
    }
}
