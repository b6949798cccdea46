//! Commands for state mutations.
//!
//! The sync engine is the only owner of the assignment table. Presentation
//! code requests changes by sending commands, which the engine applies
//! between ticks.

use crate::channel::ChannelId;

/// A request to change engine-owned state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    /// Point a fader slot at a channel
    Assign { slot: usize, channel: ChannelId },
    /// Clear a fader slot
    Unassign { slot: usize },
    /// Override a slot's value from the UI (as if the fader had moved)
    SetValue { slot: usize, value: u8 },
    /// Browse the next directory page
    NextPage,
    /// Browse the previous directory page
    PrevPage,
    /// Rebuild the channel directory
    RefreshDirectory,
    /// Stop the engine and release the device
    Shutdown,
}
