//! CyberMix Core - wire protocol, fader assignments, and the sync engine.
//!
//! This crate holds everything that does not touch hardware or the OS audio
//! stack. The serial port, the host mixer, the process list and the settings
//! file are reached through traits implemented by the sibling crates.

pub mod assignment;
pub mod channel;
pub mod command;
pub mod directory;
pub mod display;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod runtime;
pub mod state;
pub mod transport;
pub mod volume;

#[cfg(test)]
mod testing;

pub use assignment::{AssignmentState, AssignmentTable, FaderSlot};
pub use channel::ChannelId;
pub use command::EngineCommand;
pub use directory::{ChannelDirectory, ProcessLister};
pub use engine::{EngineConfig, StateStore, SyncEngine};
pub use error::{Error, PersistenceError, ProtocolError, Result, TransportError, VolumeError};
pub use runtime::EngineHandle;
pub use state::{EngineStatus, LinkStatus, SlotView};
pub use transport::{Connection, PortDescriptor, Transport};
pub use volume::{AudioSession, VolumeBackend};
