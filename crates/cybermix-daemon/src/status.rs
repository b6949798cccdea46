//! Logging of engine status transitions.

use cybermix_core::{EngineStatus, LinkStatus};
use tracing::{debug, info, trace, warn};

/// One observable difference between two status snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    Link(LinkStatus),
    Slot { index: u8, channel: Option<String>, label: String },
    VolumeError { index: u8, error: Option<String> },
    Meter(u8),
    Directory { entries: usize, page: u32, page_count: u32 },
    Persistence(Option<String>),
}

/// Compare two snapshots.
pub fn diff(prev: &EngineStatus, next: &EngineStatus) -> Vec<StatusChange> {
    let mut changes = Vec::new();

    if prev.link != next.link {
        changes.push(StatusChange::Link(next.link.clone()));
    }

    for (before, after) in prev.slots.iter().zip(&next.slots) {
        if before.channel != after.channel
            || before.value != after.value
            || before.label != after.label
        {
            changes.push(StatusChange::Slot {
                index: after.index,
                channel: after.channel.clone(),
                label: after.label.clone(),
            });
        }
        if before.volume_error != after.volume_error {
            changes.push(StatusChange::VolumeError {
                index: after.index,
                error: after.volume_error.clone(),
            });
        }
    }

    if prev.meter_level != next.meter_level {
        changes.push(StatusChange::Meter(next.meter_level));
    }

    if prev.directory != next.directory
        || prev.page != next.page
        || prev.page_count != next.page_count
    {
        changes.push(StatusChange::Directory {
            entries: next.directory.len(),
            page: next.page,
            page_count: next.page_count,
        });
    }

    if prev.persistence_error != next.persistence_error {
        changes.push(StatusChange::Persistence(next.persistence_error.clone()));
    }

    changes
}

/// Emit a log line for a change.
pub fn log_change(change: &StatusChange) {
    match change {
        StatusChange::Link(LinkStatus::Connected { port }) => {
            info!(port = %port, "Fader board online");
        }
        StatusChange::Link(LinkStatus::Connecting) => debug!("Opening fader board"),
        StatusChange::Link(LinkStatus::Disconnected) => {
            warn!("Fader board offline, waiting for it to reappear");
        }
        StatusChange::Slot { index, channel, label } => {
            debug!(slot = index, channel = ?channel, label = %label, "Fader updated");
        }
        StatusChange::VolumeError { index, error: Some(error) } => {
            warn!(slot = index, error = %error, "Fader volume not applied");
        }
        StatusChange::VolumeError { index, error: None } => {
            info!(slot = index, "Fader volume applied again");
        }
        StatusChange::Meter(level) => trace!(level, "Meter level"),
        StatusChange::Directory { entries, page, page_count } => {
            debug!(entries, page, page_count, "Channel directory updated");
        }
        StatusChange::Persistence(Some(error)) => {
            warn!(error = %error, "Fader settings are not being saved");
        }
        StatusChange::Persistence(None) => info!("Fader settings saved again"),
    }
}
