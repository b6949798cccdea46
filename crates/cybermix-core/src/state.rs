//! Observable engine state.

use serde::{Deserialize, Serialize};

use crate::assignment::AssignmentTable;
use crate::channel::ChannelId;
use crate::directory::ChannelDirectory;
use crate::display;

/// Connection status of the control surface as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum LinkStatus {
    /// No device; reconnect attempts are running
    #[default]
    Disconnected,
    /// A matching port was found and is being opened
    Connecting,
    /// Device is online
    Connected { port: String },
}

impl LinkStatus {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// One fader slot as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotView {
    pub index: u8,
    pub channel: Option<String>,
    pub value: u8,
    /// Same text that is sent to the slot's display
    pub label: String,
    /// Last failure applying this slot's volume, cleared on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_error: Option<String>,
}

/// Complete snapshot of the engine, published after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    /// Device link
    pub link: LinkStatus,
    /// All five slots
    pub slots: Vec<SlotView>,
    /// Lit LEDs on the meter bar (follows slot 0)
    pub meter_level: u8,
    /// Assignable channels, master first
    pub directory: Vec<String>,
    /// Directory page being browsed
    pub page: u32,
    /// Total directory pages
    pub page_count: u32,
    /// Last failure saving fader settings, cleared on the next good save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistence_error: Option<String>,
}

impl EngineStatus {
    /// Build a snapshot from engine-owned state.
    #[must_use]
    pub fn capture(link: LinkStatus, table: &AssignmentTable, directory: &ChannelDirectory) -> Self {
        let slots = table
            .slots()
            .iter()
            .map(|slot| SlotView {
                index: slot.index(),
                channel: slot.channel().map(|c| c.as_str().to_string()),
                value: slot.last_value(),
                label: display::slot_label(slot.channel(), slot.last_value()),
                volume_error: None,
            })
            .collect();

        Self {
            link,
            slots,
            meter_level: display::meter_level(table.values()[0]),
            directory: directory.entries().iter().map(ChannelId::to_string).collect(),
            page: table.page(),
            page_count: directory.page_count(),
            persistence_error: None,
        }
    }
}

impl Default for EngineStatus {
    fn default() -> Self {
        Self::capture(
            LinkStatus::Disconnected,
            &AssignmentTable::default(),
            &ChannelDirectory::default(),
        )
    }
}
