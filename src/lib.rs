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

//! Airrohr Logger - rolling history for one sensor.community sensor
//!
//! One invocation fetches the sensor's recent readings, merges them into the
//! persisted history, prunes everything outside the retention window, sorts
//! the result, and rewrites the snapshot.

pub mod config;
pub mod error;
pub mod fetch;
pub mod history;
pub mod reading;
pub mod updater;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use history::{HistoryLoad, HistorySource};
pub use reading::{RawRecord, Reading, SensorDataValue};
pub use updater::{UpdateReport, run_update};
