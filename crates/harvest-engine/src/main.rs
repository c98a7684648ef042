//! Sandbox binary for the Harvest farming task.
//!
//! Wires the tick processor to the in-memory sandbox host: a demo farm with
//! ripe and growing crops, a stash chest, and home waypoints. Scans run on
//! a background tokio worker. The run continues until the tick limit,
//! Ctrl-C, or the task aborts.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `harvest-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the sandbox host around the demo farm
//! 4. Start the background scan scheduler
//! 5. Create the tick processor from the farm settings
//! 6. Create run control and the Ctrl-C stop handler
//! 7. Start the task and run the farm loop
//! 8. Log the result

mod error;
mod progress;

use std::path::Path;
use std::sync::Arc;

use harvest_core::config::{LOG_LEVEL_ENV, LoggingConfig};
use harvest_core::runner;
use harvest_core::{
    FarmSettings, FarmTaskState, FarmTickProcessor, HarvestConfig, SandboxHost, ScanScheduler,
    SnapshotSource, TaskControl,
};
use harvest_types::ItemKind;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::ProgressCallback;

/// Ticks between progress log lines.
const REPORT_EVERY_TICKS: u64 = 100;

/// Config file looked up in the current working directory.
const CONFIG_PATH: &str = "harvest-config.yaml";

/// Application entry point for the sandbox.
///
/// # Errors
///
/// Returns an error if configuration, logging setup, or the run fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("harvest-engine starting");
    if from_file {
        info!(path = CONFIG_PATH, "Configuration loaded");
    } else {
        info!("Config file not found, using defaults");
    }
    info!(
        replant_crops = config.farm.replant_crops,
        replant_nether_wart = config.farm.replant_nether_wart,
        check_inventory = config.inventory.check_inventory,
        put_drops_in_stash = config.inventory.put_drops_in_stash,
        go_home = config.inventory.go_home,
        seed = config.simulation.seed,
        "Farm settings"
    );

    // 3. Build the sandbox host.
    let mut host = SandboxHost::demo(config.simulation.seed);
    info!(feet = %host.feet(), "Demo farm created");

    // 4. Start the scan scheduler.
    let scheduler = Arc::new(ScanScheduler::spawn(Arc::new(host.scanner())));
    let scans: Arc<dyn SnapshotSource> = scheduler.clone();

    // 5. Create the tick processor.
    let processor = FarmTickProcessor::new(FarmSettings::from(&config), scans);

    // 6. Create run control and the stop handler.
    let control = Arc::new(TaskControl::new(
        config.simulation.tick_interval_ms,
        config.simulation.max_ticks,
    ));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
            }
        });
    }
    info!(
        max_ticks = control.max_ticks(),
        tick_interval_ms = control.tick_interval_ms(),
        "Run control initialized"
    );

    // 7. Start the task and run.
    let mut state = FarmTaskState::new();
    processor.start(&mut state);
    let mut callback = ProgressCallback::new(REPORT_EVERY_TICKS);

    let result = runner::run_farm(
        &processor,
        &mut state,
        &mut host,
        &control,
        config.inventory.go_home,
        &mut callback,
    )
    .await
    .map_err(EngineError::from)?;

    // 8. Log results.
    runner::log_run_end(&result);
    callback.report(result.total_ticks);
    info!(
        scans_published = scheduler.published_count(),
        scans_discarded = scheduler.discarded_count(),
        wheat = host.player().count_of(ItemKind::Wheat),
        carrots = host.player().count_of(ItemKind::Carrot),
        potatoes = host.player().count_of(ItemKind::Potato),
        stash_slots_used = host.stash().slots().iter().flatten().count(),
        diagnostics = host.diagnostics().len(),
        elapsed_seconds = control.elapsed_seconds(),
        "harvest-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `harvest-config.yaml` in the working directory.
///
/// Returns the config and whether it came from the file.
fn load_config() -> Result<(HarvestConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((HarvestConfig::from_file(config_path)?, true))
    } else {
        let mut config = HarvestConfig::default();
        config
            .logging
            .apply_level_override(std::env::var(LOG_LEVEL_ENV).ok());
        Ok((config, false))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}
