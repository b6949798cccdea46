//! Audio channel identifiers.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Name of the distinguished master-volume channel.
pub const MASTER_VOLUME: &str = "System Master Volume";

/// An addressable volume target: the OS master output or a process name.
///
/// Equality and hashing ignore case; the original spelling is kept for
/// display and persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Create a channel identifier from a process or channel name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The master-volume channel.
    #[must_use]
    pub fn master() -> Self {
        Self(MASTER_VOLUME.to_string())
    }

    /// Whether this identifier routes to the OS default output.
    #[must_use]
    pub fn is_master(&self) -> bool {
        self.key() == MASTER_VOLUME.to_lowercase()
    }

    /// The name as originally spelled.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased deduplication key.
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Whether the name is empty or only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Whether this channel names the given process.
    ///
    /// Matches when the channel name is a case-insensitive substring of the
    /// process name, so `chrome` also matches helper processes. A blank name
    /// matches nothing.
    #[must_use]
    pub fn matches_process(&self, process_name: &str) -> bool {
        !self.is_blank() && process_name.to_lowercase().contains(&self.key())
    }
}

impl PartialEq for ChannelId {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ChannelId {}

impl Hash for ChannelId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ChannelId {
    fn from(name: String) -> Self {
        Self(name)
    }
}
