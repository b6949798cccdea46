//! Dedicated engine thread.
//!
//! Serial reads and volume backend calls block, so the engine runs on its own
//! OS thread. Commands arrive over a channel and are applied between ticks;
//! status leaves through the engine's watch channel.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{error, info};

use crate::command::EngineCommand;
use crate::engine::SyncEngine;
use crate::state::EngineStatus;
use crate::transport::Transport;

/// Handle to a running engine thread.
///
/// Dropping the handle stops the engine and waits for the thread.
pub struct EngineHandle {
    commands: mpsc::Sender<EngineCommand>,
    status: watch::Receiver<EngineStatus>,
    thread: Option<JoinHandle<()>>,
}

/// Move an engine onto its own thread and start ticking.
///
/// # Errors
/// Returns an error if the thread cannot be spawned.
pub fn spawn<T>(engine: SyncEngine<T>) -> std::io::Result<EngineHandle>
where
    T: Transport + 'static,
{
    let (commands, rx) = mpsc::channel();
    let status = engine.subscribe();

    let thread = thread::Builder::new()
        .name("cybermix-engine".to_string())
        .spawn(move || run(engine, &rx))?;

    Ok(EngineHandle { commands, status, thread: Some(thread) })
}

fn run<T: Transport>(mut engine: SyncEngine<T>, commands: &mpsc::Receiver<EngineCommand>) {
    let period = engine.config().tick;
    info!(tick = ?period, "Sync engine started");

    let mut next_tick = Instant::now();
    loop {
        let timeout = next_tick.saturating_duration_since(Instant::now());
        match commands.recv_timeout(timeout) {
            Ok(command) => {
                if engine.handle(command).is_break() {
                    break;
                }
                // A steady command stream must not starve the poll.
                if Instant::now() >= next_tick {
                    tick(&mut engine, &mut next_tick, period);
                }
            }
            Err(RecvTimeoutError::Timeout) => tick(&mut engine, &mut next_tick, period),
            Err(RecvTimeoutError::Disconnected) => {
                engine.disconnect();
                break;
            }
        }
    }

    info!("Sync engine stopped");
}

fn tick<T: Transport>(engine: &mut SyncEngine<T>, next_tick: &mut Instant, period: Duration) {
    engine.tick();
    *next_tick += period;
    // Skip ticks missed while a call blocked.
    let now = Instant::now();
    if *next_tick < now {
        *next_tick = now + period;
    }
}

impl EngineHandle {
    /// Queue a command. Returns `false` if the engine has already stopped.
    pub fn send(&self, command: EngineCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<EngineStatus> {
        self.status.clone()
    }

    /// Latest published status.
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        self.status.borrow().clone()
    }

    /// Stop the engine, release the device and wait for the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        let _ = self.commands.send(EngineCommand::Shutdown);
        if thread.join().is_err() {
            error!("Sync engine thread panicked");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
