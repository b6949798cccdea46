//! Sink inputs (per-application playback streams).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use cybermix_core::AudioSession;

/// Volume value meaning 100% (`PA_VOLUME_NORM`).
pub const VOLUME_NORM: u32 = 0x10000;

/// Per-channel volume as printed by `pactl -f json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelVolume {
    /// Raw volume, [`VOLUME_NORM`] is 100%
    pub value: u32,
}

/// One entry of `pactl -f json list sink-inputs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkInput {
    /// Server-side sink input index
    pub index: u32,
    /// Volume per channel position (front-left, front-right, ...)
    #[serde(default)]
    pub volume: HashMap<String, ChannelVolume>,
    /// All stream properties
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

impl SinkInput {
    fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    /// Binary name of the owning process.
    #[must_use]
    pub fn binary_name(&self) -> Option<&str> {
        self.property("application.process.binary")
    }

    /// Application name advertised by the client.
    #[must_use]
    pub fn application_name(&self) -> Option<&str> {
        self.property("application.name")
    }

    /// Name used to match channels: the binary, falling back to the
    /// application name.
    #[must_use]
    pub fn process_name(&self) -> Option<&str> {
        self.binary_name().or_else(|| self.application_name())
    }

    /// Mean channel volume as 0.0-1.0 (values above 100% are clamped).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn volume_scalar(&self) -> f32 {
        if self.volume.is_empty() {
            return 1.0;
        }
        let total: u64 = self.volume.values().map(|c| u64::from(c.value)).sum();
        let mean = total as f32 / self.volume.len() as f32;
        (mean / VOLUME_NORM as f32).clamp(0.0, 1.0)
    }

    /// Convert to the engine's session type. Streams without any name are skipped.
    #[must_use]
    pub fn to_session(&self) -> Option<AudioSession> {
        self.process_name()
            .map(|name| AudioSession { process_name: name.to_string(), volume: self.volume_scalar() })
    }
}

/// Parse the JSON printed by `pactl -f json list sink-inputs`.
///
/// # Errors
/// Returns an error if the output is not a JSON array of sink inputs.
pub fn parse_sink_inputs(json: &str) -> serde_json::Result<Vec<SinkInput>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(json)
}

/// Convert a 0.0-1.0 volume to a raw `pactl` volume.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn raw_volume(volume: f32) -> u32 {
    (volume.clamp(0.0, 1.0) * VOLUME_NORM as f32).round() as u32
}
