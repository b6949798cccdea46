//! CyberMix Daemon - keeps the fader board and host volumes in sync.
//!
//! This is the main entry point for the CyberMix daemon. It loads the
//! configuration and saved fader settings, starts the sync engine on its own
//! thread, logs status transitions, and shuts everything down on SIGTERM or
//! SIGINT.

use anyhow::{Context, Result};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod signals;
mod status;

use cybermix_audio::{PactlBackend, ProcfsProcessLister};
use cybermix_core::{AssignmentTable, EngineCommand, SyncEngine, runtime};
use cybermix_serial::SerialTransport;
use cybermix_store::SettingsStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::load_config()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("cybermix={}", config.daemon.log_level).parse()?)
                .add_directive("cybermix_daemon=debug".parse()?),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting CyberMix daemon");

    // Open settings store
    let store = match &config.storage.path {
        Some(path) => SettingsStore::open_at(path.clone()),
        None => SettingsStore::open().context("Failed to locate settings file")?,
    };

    let table = store.load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to read saved settings, using defaults");
        AssignmentTable::default()
    });
    info!(
        assigned = table.slots().iter().filter(|s| s.channel().is_some()).count(),
        page = table.page(),
        "Fader settings loaded"
    );

    // Build and start the sync engine
    let transport = SerialTransport::new(config.device.signatures.clone(), config.device.read_timeout());
    let engine = SyncEngine::new(
        transport,
        Box::new(PactlBackend::default()),
        Box::new(ProcfsProcessLister::default()),
        Box::new(store),
        table,
        config.engine_config(),
    );
    info!(channels = engine.directory().len(), "Channel directory built");

    let handle = runtime::spawn(engine).context("Failed to start sync engine thread")?;
    let mut status_rx = handle.subscribe();
    let mut last_status = status_rx.borrow_and_update().clone();

    // Periodic directory refresh
    let mut refresh = config.directory_refresh().map(|period| {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer
    });

    // Set up signal handling
    let mut shutdown_rx = signals::setup_signal_handlers();

    info!("Daemon running. Press Ctrl+C to exit.");

    // Main event loop
    loop {
        tokio::select! {
            changed = status_rx.changed() => {
                if changed.is_err() {
                    warn!("Sync engine stopped unexpectedly");
                    break;
                }
                let status = status_rx.borrow_and_update().clone();
                for change in status::diff(&last_status, &status) {
                    status::log_change(&change);
                }
                last_status = status;
            }

            () = async {
                match refresh.as_mut() {
                    Some(timer) => {
                        timer.tick().await;
                    }
                    None => std::future::pending().await,
                }
            } => {
                if !handle.send(EngineCommand::RefreshDirectory) {
                    warn!("Sync engine is not accepting commands");
                    break;
                }
            }

            // Handle shutdown signal
            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    // Stop the engine; joining blocks until the board is released.
    tokio::task::spawn_blocking(move || handle.shutdown())
        .await
        .context("Sync engine shutdown task failed")?;

    info!("CyberMix daemon stopped");
    Ok(())
}
