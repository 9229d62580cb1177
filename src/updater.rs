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

//! The update cycle: fetch, merge, prune, sort, persist

use crate::config::LoggerConfig;
use crate::error::Result;
use crate::fetch::fetch_recent_records;
use crate::history::{self, HistorySource};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Outcome of one update cycle
#[derive(Debug)]
pub struct UpdateReport {
    /// Raw records received from the sensor API
    pub fetched: usize,
    /// Readings appended after dedup
    pub added: usize,
    /// Readings dropped by the retention window
    pub pruned: usize,
    /// Readings in the persisted snapshot
    pub retained: usize,
    /// How the prior history was obtained
    pub prior_source: HistorySource,
}

/// Run one update cycle against `config`.
///
/// On success the persisted history holds the merged, pruned, ascending
/// snapshot. Any error surfaces before the file is touched: the fetch runs
/// first, and persistence is the last step, so a failed run leaves the
/// previous snapshot byte-identical. Re-running with an unchanged upstream
/// result changes nothing.
pub async fn run_update(config: &LoggerConfig) -> Result<UpdateReport> {
    let batch = fetch_recent_records(config).await?;
    let fetched = batch.len();

    let prior = history::load_history(&config.data_file);
    match prior.source {
        HistorySource::Fresh => debug!("No prior history at {}", config.data_file.display()),
        HistorySource::Recovered => warn!("Prior history was unreadable, starting from empty"),
        HistorySource::Loaded => debug!("Loaded {} prior readings", prior.readings.len()),
    }

    let mut readings = prior.readings;
    let added = history::merge(&mut readings, batch)?;

    let cutoff = history::cutoff(Utc::now().naive_utc(), config.retention_hours);
    let (mut readings, pruned) = history::prune(readings, cutoff)?;
    history::sort(&mut readings);

    history::save_history(&config.data_file, &readings)?;
    let retained = readings.len();
    info!("Sensor {}: {added} added, {pruned} pruned, {retained} retained", config.sensor_id);

    Ok(UpdateReport {
        fetched,
        added,
        pruned,
        retained,
        prior_source: prior.source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::load_history;
    use crate::reading::TIMESTAMP_FORMAT;
    use chrono::Duration;
    use mockito::{Server, ServerGuard};
    use serde_json::json;
    use tempfile::TempDir;

    fn config_for(server: &ServerGuard, dir: &TempDir) -> LoggerConfig {
        LoggerConfig {
            sensor_id: "94448".to_string(),
            api_base_url: Some(server.url()),
            data_file: dir.path().join("sensor_history.json"),
            ..Default::default()
        }
    }

    fn hours_ago(hours: i64) -> String {
        (Utc::now().naive_utc() - Duration::hours(hours))
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }

    fn batch_body(timestamps: &[&str]) -> String {
        let records: Vec<_> = timestamps
            .iter()
            .map(|ts| {
                json!({
                    "timestamp": ts,
                    "sensordatavalues": [
                        { "value_type": "P1", "value": "10.5" },
                        { "value_type": "P2", "value": "5.2" }
                    ]
                })
            })
            .collect();
        json!(records).to_string()
    }

    #[tokio::test]
    async fn test_bootstrap_from_empty() {
        let mut server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let config = config_for(&server, &dir);
        let recent = hours_ago(1);

        let mock = server
            .mock("GET", "/airrohr/v1/sensor/94448/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(batch_body(&[&recent]))
            .create_async()
            .await;

        let report = run_update(&config).await.unwrap();
        assert_eq!(report.fetched, 1);
        assert_eq!(report.added, 1);
        assert_eq!(report.pruned, 0);
        assert_eq!(report.retained, 1);
        assert_eq!(report.prior_source, HistorySource::Fresh);

        let load = load_history(&config.data_file);
        assert_eq!(load.readings.len(), 1);
        assert_eq!(load.readings[0].timestamp, recent);
        assert_eq!(load.readings[0].values["P1"], json!("10.5"));
        assert_eq!(load.readings[0].values["P2"], json!("5.2"));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_idempotent_for_unchanged_upstream() {
        let mut server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let config = config_for(&server, &dir);
        let recent = hours_ago(1);

        let mock = server
            .mock("GET", "/airrohr/v1/sensor/94448/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(batch_body(&[&recent]))
            .expect(2)
            .create_async()
            .await;

        run_update(&config).await.unwrap();
        let after_first = std::fs::read_to_string(&config.data_file).unwrap();

        let report = run_update(&config).await.unwrap();
        assert_eq!(report.added, 0);
        assert_eq!(report.retained, 1);
        assert_eq!(report.prior_source, HistorySource::Loaded);

        let after_second = std::fs::read_to_string(&config.data_file).unwrap();
        assert_eq!(after_first, after_second);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_state_untouched() {
        let mut server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let config = config_for(&server, &dir);

        let existing = json!([
            { "timestamp": hours_ago(1), "values": { "P1": "10.5" } }
        ]);
        std::fs::write(
            &config.data_file,
            serde_json::to_string_pretty(&existing).unwrap(),
        )
        .unwrap();
        let before = std::fs::read_to_string(&config.data_file).unwrap();

        let mock = server
            .mock("GET", "/airrohr/v1/sensor/94448/")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let result = run_update(&config).await;
        assert!(result.is_err());

        let after = std::fs::read_to_string(&config.data_file).unwrap();
        assert_eq!(before, after);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_prunes_stale_prior_entries() {
        let mut server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let config = config_for(&server, &dir);
        let stale = hours_ago(30);
        let recent = hours_ago(1);

        let existing = json!([
            { "timestamp": stale, "values": { "P1": "10.5" } },
            { "timestamp": recent, "values": { "P1": "11.0" } }
        ]);
        std::fs::write(
            &config.data_file,
            serde_json::to_string_pretty(&existing).unwrap(),
        )
        .unwrap();

        let mock = server
            .mock("GET", "/airrohr/v1/sensor/94448/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let report = run_update(&config).await.unwrap();
        assert_eq!(report.fetched, 0);
        assert_eq!(report.added, 0);
        assert_eq!(report.pruned, 1);
        assert_eq!(report.retained, 1);

        let load = load_history(&config.data_file);
        assert_eq!(load.readings.len(), 1);
        assert_eq!(load.readings[0].timestamp, recent);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_merged_snapshot_is_sorted() {
        let mut server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let config = config_for(&server, &dir);
        let older = hours_ago(3);
        let newer = hours_ago(1);

        let existing = json!([
            { "timestamp": hours_ago(2), "values": { "P1": "9.0" } }
        ]);
        std::fs::write(
            &config.data_file,
            serde_json::to_string_pretty(&existing).unwrap(),
        )
        .unwrap();

        // Batch arrives newest-first, as the API serves it
        let mock = server
            .mock("GET", "/airrohr/v1/sensor/94448/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(batch_body(&[&newer, &older]))
            .create_async()
            .await;

        let report = run_update(&config).await.unwrap();
        assert_eq!(report.retained, 3);

        let load = load_history(&config.data_file);
        let timestamps: Vec<&str> = load.readings.iter().map(|e| e.timestamp.as_str()).collect();
        let mut sorted = timestamps.clone();
        sorted.sort_unstable();
        assert_eq!(timestamps, sorted);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_recovers_from_corrupt_history() {
        let mut server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let config = config_for(&server, &dir);
        let recent = hours_ago(1);

        std::fs::write(&config.data_file, "{ not valid json").unwrap();

        let mock = server
            .mock("GET", "/airrohr/v1/sensor/94448/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(batch_body(&[&recent]))
            .create_async()
            .await;

        let report = run_update(&config).await.unwrap();
        assert_eq!(report.prior_source, HistorySource::Recovered);
        assert_eq!(report.retained, 1);

        mock.assert_async().await;
    }
}
