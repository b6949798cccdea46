//! Volume backend capability.
//!
//! The engine never talks to the OS mixer directly; it goes through
//! [`VolumeBackend`] so the sync logic can run against any audio stack.

use serde::{Deserialize, Serialize};

use crate::channel::ChannelId;
use crate::error::VolumeError;
use crate::protocol::FADER_MAX;

/// A running application's audio session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSession {
    /// Executable name of the owning process
    pub process_name: String,
    /// Current volume (0.0 - 1.0)
    pub volume: f32,
}

/// OS audio control consumed by the sync engine.
#[cfg_attr(test, mockall::automock)]
pub trait VolumeBackend: Send {
    /// List applications that currently have an audio session.
    ///
    /// # Errors
    /// Returns an error if the audio system cannot be queried.
    fn list_sessions(&self) -> Result<Vec<AudioSession>, VolumeError>;

    /// Set a channel's volume.
    ///
    /// [`ChannelId::master`] targets the default output device. Any other
    /// channel targets the first session whose process name contains the
    /// channel name, ignoring case.
    ///
    /// # Errors
    /// Returns an error if no session matches or the volume cannot be applied.
    fn set_volume(&self, channel: &ChannelId, volume: f32) -> Result<(), VolumeError>;
}

/// Map a raw fader reading onto a linear 0.0-1.0 volume.
#[must_use]
pub fn fader_to_scalar(value: u8) -> f32 {
    f32::from(value.min(FADER_MAX)) / f32::from(FADER_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fader_to_scalar_is_linear() {
        assert!((fader_to_scalar(0) - 0.0).abs() < f32::EPSILON);
        assert!((fader_to_scalar(127) - 1.0).abs() < f32::EPSILON);
        assert!((fader_to_scalar(10) - 10.0 / 127.0).abs() < f32::EPSILON);
        assert!((fader_to_scalar(255) - 1.0).abs() < f32::EPSILON);
    }
}
