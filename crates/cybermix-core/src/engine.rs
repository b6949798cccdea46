//! Device/host synchronization engine.
//!
//! [`SyncEngine`] owns the device connection, the assignment table and the
//! channel directory. Each [`tick`](SyncEngine::tick) either retries the
//! connection or drains the newest fader report and mirrors it onto host
//! volumes and the per-fader displays. Failures of one subsystem never stop
//! the others: a volume error skips one slot, a write error drops the link,
//! a persistence error is logged. Volume and persistence failures are also
//! carried in the published [`EngineStatus`] until the next success.

use std::mem;
use std::ops::ControlFlow;
use std::time::Duration;

use bytes::BytesMut;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::assignment::{AssignmentState, AssignmentTable};
use crate::channel::ChannelId;
use crate::command::EngineCommand;
use crate::directory::{ChannelDirectory, ProcessLister};
use crate::display;
use crate::error::{PersistenceError, TransportError, VolumeError};
use crate::protocol::{self, BAUD_RATE, FADER_COUNT, FaderReport, ScreenUpdate};
use crate::state::{EngineStatus, LinkStatus};
use crate::transport::{Connection, Transport};
use crate::volume::{self, VolumeBackend};

/// Default poll period.
pub const DEFAULT_TICK: Duration = Duration::from_millis(500);

/// Default number of ticks between reconnect attempts (10 s at 500 ms).
pub const DEFAULT_RECONNECT_INTERVAL_TICKS: u32 = 20;

/// Engine tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Serial line speed
    pub baud_rate: u32,
    /// Poll period
    pub tick: Duration,
    /// Ticks between reconnect attempts while disconnected
    pub reconnect_interval_ticks: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            baud_rate: BAUD_RATE,
            tick: DEFAULT_TICK,
            reconnect_interval_ticks: DEFAULT_RECONNECT_INTERVAL_TICKS,
        }
    }
}

/// Durable home for the assignment table.
#[cfg_attr(test, mockall::automock)]
pub trait StateStore: Send {
    /// Persist a snapshot.
    ///
    /// # Errors
    /// Returns an error if the snapshot could not be written.
    fn save(&self, state: &AssignmentState) -> Result<(), PersistenceError>;
}

enum ConnectionState<C> {
    Disconnected,
    Connecting,
    Connected(C),
}

/// Keeps the control surface and the host mixer in step.
pub struct SyncEngine<T: Transport> {
    transport: T,
    volume: Box<dyn VolumeBackend>,
    processes: Box<dyn ProcessLister>,
    store: Box<dyn StateStore>,
    config: EngineConfig,
    table: AssignmentTable,
    directory: ChannelDirectory,
    connection: ConnectionState<T::Connection>,
    rx_buffer: BytesMut,
    reconnect_countdown: u32,
    volume_errors: [Option<String>; FADER_COUNT],
    persistence_error: Option<String>,
    status_tx: watch::Sender<EngineStatus>,
}

impl<T: Transport> SyncEngine<T> {
    /// Create an engine around a restored assignment table.
    ///
    /// The channel directory is built immediately. The first connection
    /// attempt happens on the first tick.
    pub fn new(
        transport: T,
        volume: Box<dyn VolumeBackend>,
        processes: Box<dyn ProcessLister>,
        store: Box<dyn StateStore>,
        mut table: AssignmentTable,
        config: EngineConfig,
    ) -> Self {
        let directory = ChannelDirectory::refresh(volume.as_ref(), processes.as_ref());
        table.clamp_page(directory.page_count());

        let status = EngineStatus::capture(LinkStatus::Disconnected, &table, &directory);
        let (status_tx, _) = watch::channel(status);

        Self {
            transport,
            volume,
            processes,
            store,
            config,
            table,
            directory,
            connection: ConnectionState::Disconnected,
            rx_buffer: BytesMut::with_capacity(64),
            reconnect_countdown: 0,
            volume_errors: Default::default(),
            persistence_error: None,
            status_tx,
        }
    }

    /// Watch engine status. A new value is published after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<EngineStatus> {
        self.status_tx.subscribe()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn table(&self) -> &AssignmentTable {
        &self.table
    }

    #[must_use]
    pub fn directory(&self) -> &ChannelDirectory {
        &self.directory
    }

    #[must_use]
    pub fn link_status(&self) -> LinkStatus {
        match &self.connection {
            ConnectionState::Disconnected => LinkStatus::Disconnected,
            ConnectionState::Connecting => LinkStatus::Connecting,
            ConnectionState::Connected(conn) => {
                LinkStatus::Connected { port: conn.port_name().to_string() }
            }
        }
    }

    /// Run one poll cycle.
    pub fn tick(&mut self) {
        if matches!(self.connection, ConnectionState::Connected(_)) {
            self.poll();
        } else {
            self.try_reconnect();
        }
    }

    /// Apply a user command. Returns `Break` once the engine has shut down.
    pub fn handle(&mut self, command: EngineCommand) -> ControlFlow<()> {
        match command {
            EngineCommand::Assign { slot, channel } => {
                match self.table.assign(slot, channel.clone()) {
                    Ok(()) => {
                        info!(slot, channel = %channel, "Fader assigned");
                        self.set_volume_error(slot, None);
                        self.slot_changed(slot);
                    }
                    Err(e) => warn!(slot, error = %e, "Rejected fader assignment"),
                }
            }
            EngineCommand::Unassign { slot } => match self.table.unassign(slot) {
                Ok(()) => {
                    info!(slot, "Fader unassigned");
                    self.set_volume_error(slot, None);
                    self.slot_changed(slot);
                }
                Err(e) => warn!(slot, error = %e, "Rejected fader unassignment"),
            },
            EngineCommand::SetValue { slot, value } => match self.table.record_value(slot, value) {
                Ok(_) => {
                    let fader = &self.table.slots()[slot];
                    let (channel, value) = (fader.channel().cloned(), fader.last_value());
                    self.apply_volume(slot, channel.as_ref(), value);
                    self.slot_changed(slot);
                }
                Err(e) => warn!(slot, error = %e, "Rejected fader value"),
            },
            EngineCommand::NextPage => {
                if self.table.next_page(self.directory.page_count()) {
                    self.persist();
                    self.publish();
                }
            }
            EngineCommand::PrevPage => {
                if self.table.prev_page() {
                    self.persist();
                    self.publish();
                }
            }
            EngineCommand::RefreshDirectory => self.refresh_directory(),
            EngineCommand::Shutdown => {
                info!("Sync engine shutting down");
                self.disconnect();
                self.publish();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Rebuild the channel directory and keep the page in range.
    pub fn refresh_directory(&mut self) {
        self.directory = ChannelDirectory::refresh(self.volume.as_ref(), self.processes.as_ref());
        if self.table.clamp_page(self.directory.page_count()) {
            self.persist();
        }
        self.publish();
    }

    /// Release the device, if connected.
    pub fn disconnect(&mut self) {
        if let ConnectionState::Connected(conn) =
            mem::replace(&mut self.connection, ConnectionState::Disconnected)
        {
            info!(port = conn.port_name(), "Closing CyberMix device");
            conn.close();
        }
        self.rx_buffer.clear();
    }

    fn slot_changed(&mut self, slot: usize) {
        self.send_screen(slot);
        self.persist();
        self.publish();
    }

    fn try_reconnect(&mut self) {
        if self.reconnect_countdown > 0 {
            self.reconnect_countdown -= 1;
            return;
        }
        self.reconnect_countdown = self.config.reconnect_interval_ticks.saturating_sub(1);

        let Some(port) = self.transport.discover() else {
            debug!("No CyberMix device found");
            return;
        };

        info!(port = %port.name, description = %port.description, "CyberMix device found");
        self.connection = ConnectionState::Connecting;
        self.publish();

        match self.transport.open(&port, self.config.baud_rate) {
            Ok(conn) => {
                info!(port = %port.name, baud_rate = self.config.baud_rate, "Connected to CyberMix");
                self.connection = ConnectionState::Connected(conn);
                self.rx_buffer.clear();
                self.refresh_screens();
            }
            Err(e) => {
                warn!(port = %port.name, error = %e, "Failed to open CyberMix device");
                self.connection = ConnectionState::Disconnected;
            }
        }
        self.publish();
    }

    fn poll(&mut self) {
        let ConnectionState::Connected(conn) = &mut self.connection else {
            return;
        };

        match conn.read_available() {
            Ok(bytes) => self.rx_buffer.extend_from_slice(&bytes),
            Err(e) => {
                self.connection_lost(&e);
                return;
            }
        }

        let drained = protocol::drain_latest(&mut self.rx_buffer);
        if drained.malformed > 0 {
            debug!(dropped = drained.malformed, "Discarded malformed fader frames");
        }
        if let Some(report) = drained.latest {
            self.apply_report(&report);
        }
    }

    fn apply_report(&mut self, report: &FaderReport) {
        let mut changed = false;

        for (index, &value) in report.values.iter().enumerate() {
            changed |= matches!(self.table.record_value(index, value), Ok(true));

            let slot = &self.table.slots()[index];
            let (channel, value) = (slot.channel().cloned(), slot.last_value());
            changed |= self.apply_volume(index, channel.as_ref(), value);
            self.send_screen(index);
        }

        if changed {
            self.persist();
            self.publish();
        }
    }

    /// Push a slot's value to the host. Returns whether the slot's error
    /// state changed.
    fn apply_volume(&mut self, slot: usize, channel: Option<&ChannelId>, value: u8) -> bool {
        let error = channel.and_then(|channel| {
            let level = volume::fader_to_scalar(value);
            match self.volume.set_volume(channel, level) {
                Ok(()) => {
                    debug!(slot, channel = %channel, level, "Volume applied");
                    None
                }
                // Assigned app not running right now; keep the assignment.
                Err(VolumeError::SessionNotFound(_)) => {
                    debug!(slot, channel = %channel, "No audio session for channel");
                    None
                }
                Err(e) => {
                    warn!(slot, channel = %channel, error = %e, "Failed to set volume");
                    Some(e.to_string())
                }
            }
        });
        self.set_volume_error(slot, error)
    }

    fn set_volume_error(&mut self, slot: usize, error: Option<String>) -> bool {
        let Some(current) = self.volume_errors.get_mut(slot) else {
            return false;
        };
        if *current == error {
            return false;
        }
        *current = error;
        true
    }

    fn refresh_screens(&mut self) {
        for index in 0..FADER_COUNT {
            self.send_screen(index);
        }
    }

    fn send_screen(&mut self, index: usize) {
        let ConnectionState::Connected(conn) = &mut self.connection else {
            return;
        };

        let slot = &self.table.slots()[index];
        let update =
            ScreenUpdate::new(slot.index(), display::slot_label(slot.channel(), slot.last_value()));

        if let Err(e) = conn.write(&update.to_bytes()) {
            self.connection_lost(&e);
        }
    }

    fn connection_lost(&mut self, error: &TransportError) {
        warn!(error = %error, "Lost connection to CyberMix device");
        self.disconnect();
        self.reconnect_countdown = 0;
        self.publish();
    }

    fn persist(&mut self) {
        match self.store.save(&self.table.snapshot()) {
            Ok(()) => self.persistence_error = None,
            Err(e) => {
                warn!(error = %e, "Failed to save fader settings");
                self.persistence_error = Some(e.to_string());
            }
        }
    }

    fn publish(&self) {
        let mut status = EngineStatus::capture(self.link_status(), &self.table, &self.directory);
        for (view, error) in status.slots.iter_mut().zip(&self.volume_errors) {
            view.volume_error.clone_from(error);
        }
        status.persistence_error.clone_from(&self.persistence_error);
        self.status_tx.send_replace(status);
    }
}

impl<T: Transport> Drop for SyncEngine<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
