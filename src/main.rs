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

//! Airrohr Logger - entry point
//!
//! Runs exactly one update cycle and exits. Periodic execution is left to an
//! external scheduler (cron, systemd timer).

use airrohr_logger::config::load_config;
use airrohr_logger::updater::run_update;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("airrohr_logger=debug".parse().unwrap()),
        )
        .init();

    info!("Starting Airrohr Logger");

    let config = load_config()?;
    info!(
        "Loaded config: sensor_id={}, data_file={}",
        config.sensor_id,
        config.data_file.display()
    );

    match run_update(&config).await {
        Ok(report) => {
            info!("Update complete. Points in history: {}", report.retained);
            Ok(())
        }
        Err(e) => {
            // Persisted state is untouched; the exit status is the signal
            // for whatever scheduled this run.
            error!("Update failed: {e}");
            std::process::exit(1);
        }
    }
}
