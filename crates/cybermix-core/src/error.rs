//! Error types for CyberMix core.
//!
//! Each failure kind the bridge can hit has its own enum so callers (and
//! tests) can tell a dropped serial link from a bad frame or a missing audio
//! session. None of them is fatal to the engine.

use thiserror::Error;

/// Misuse of the assignment table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid fader slot: {0} (must be 0-4)")]
    InvalidSlot(usize),
}

/// Serial transport failures. Always recoverable through reconnect.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to open {port}: {reason}")]
    Open { port: String, reason: String },

    #[error("Serial read failed: {0}")]
    Read(String),

    #[error("Serial write failed: {0}")]
    Write(String),

    #[error("Device disconnected")]
    Disconnected,
}

/// Malformed frame on the wire. Treated as "no frame this tick".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unexpected frame tag 0x{0:02x}")]
    UnexpectedTag(u8),
}

/// The volume backend could not resolve or set a channel.
#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("Volume backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("No audio session matches {0}")]
    SessionNotFound(String),

    #[error("Volume command failed: {0}")]
    Command(String),
}

/// Settings could not be read or written. In-memory state stays authoritative.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Could not determine settings directory")]
    NoConfigDir,
}

/// Result type alias for CyberMix core operations.
pub type Result<T> = std::result::Result<T, Error>;
