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

//! History persistence and the merge/prune/sort core

use crate::error::Result;
use crate::reading::{RawRecord, Reading, parse_timestamp};
use chrono::{Duration, NaiveDateTime};
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

/// How the prior history was obtained, so "empty because fresh" and
/// "empty because corrupt" stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySource {
    /// No history file existed yet
    Fresh,
    /// A file existed but could not be read or parsed; reset to empty
    Recovered,
    /// Loaded from a valid history file
    Loaded,
}

#[derive(Debug)]
pub struct HistoryLoad {
    pub readings: Vec<Reading>,
    pub source: HistorySource,
}

/// Load the persisted history. Missing or unreadable content is never fatal:
/// the update proceeds from an empty history either way.
pub fn load_history(path: &Path) -> HistoryLoad {
    if !path.exists() {
        return HistoryLoad {
            readings: Vec::new(),
            source: HistorySource::Fresh,
        };
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read history file {}: {e}", path.display());
            return HistoryLoad {
                readings: Vec::new(),
                source: HistorySource::Recovered,
            };
        }
    };

    match serde_json::from_str(&content) {
        Ok(readings) => HistoryLoad {
            readings,
            source: HistorySource::Loaded,
        },
        Err(e) => {
            warn!("History file {} is corrupt, resetting: {e}", path.display());
            HistoryLoad {
                readings: Vec::new(),
                source: HistorySource::Recovered,
            }
        }
    }
}

pub fn save_history(path: &Path, history: &[Reading]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    let content = serde_json::to_string_pretty(history)?;

    // Atomic write
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;

    Ok(())
}

/// Merge a freshly fetched batch into the history, skipping timestamps that
/// are already present. The seen-set is maintained across the loop, so
/// duplicate timestamps inside one batch also collapse to the first
/// occurrence. Returns the number of readings appended.
pub fn merge(history: &mut Vec<Reading>, batch: Vec<RawRecord>) -> Result<usize> {
    let mut seen: HashSet<String> = history.iter().map(|e| e.timestamp.clone()).collect();
    let mut added = 0;

    for raw in batch {
        if seen.contains(&raw.timestamp) {
            continue;
        }
        let reading = Reading::from_raw(raw)?;
        seen.insert(reading.timestamp.clone());
        history.push(reading);
        added += 1;
    }

    Ok(added)
}

/// Retention cutoff for a run that starts at `now`
pub fn cutoff(now: NaiveDateTime, retention_hours: u64) -> NaiveDateTime {
    now - Duration::hours(retention_hours as i64)
}

/// Keep only readings strictly newer than the cutoff. A stored timestamp
/// that fails to parse is fatal for the run; the caller must not have
/// persisted anything yet. Returns the retained readings and the number
/// dropped.
pub fn prune(history: Vec<Reading>, cutoff: NaiveDateTime) -> Result<(Vec<Reading>, usize)> {
    let before = history.len();
    let mut kept = Vec::with_capacity(before);

    for entry in history {
        if parse_timestamp(&entry.timestamp)? > cutoff {
            kept.push(entry);
        }
    }

    let dropped = before - kept.len();
    Ok((kept, dropped))
}

/// Stable ascending sort by timestamp string. The fixed-width format makes
/// string order chronological.
pub fn sort(history: &mut [Reading]) {
    history.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
}
