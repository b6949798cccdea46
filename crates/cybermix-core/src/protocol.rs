//! Serial wire protocol between the host and the control surface.
//!
//! ```text
//! device -> host   'F' (0x46) | v0 v1 v2 v3 v4          6 bytes, values 0-127
//! host -> device   'S' (0x53) | slot | text (<= 16 B)   <= 18 bytes
//! ```
//!
//! There is no checksum or acknowledgement layer. A report is recognized only
//! by its leading tag byte; a corrupted tag loses that 6-byte window and the
//! stream is not resynchronized beyond that.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::ProtocolError;

/// Number of physical faders (and display slots) on the surface.
pub const FADER_COUNT: usize = 5;

/// Tag byte of a device-to-host fader report.
pub const FADER_TAG: u8 = b'F';

/// Tag byte of a host-to-device screen update.
pub const SCREEN_TAG: u8 = b'S';

/// Wire length of a fader report: tag + one byte per fader.
pub const FADER_REPORT_LEN: usize = 1 + FADER_COUNT;

/// Maximum UTF-8 payload of a screen update.
pub const SCREEN_TEXT_MAX: usize = 16;

/// Maximum wire length of a screen update: tag + slot + text.
pub const SCREEN_UPDATE_MAX_LEN: usize = 2 + SCREEN_TEXT_MAX;

/// Highest raw fader value the firmware reports.
pub const FADER_MAX: u8 = 127;

/// Serial line rate used by the firmware.
pub const BAUD_RATE: u32 = 115_200;

/// One sample of all five fader positions, in slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaderReport {
    pub values: [u8; FADER_COUNT],
}

/// Text for one of the per-slot OLED displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenUpdate {
    pub slot: u8,
    pub text: String,
}

impl ScreenUpdate {
    /// Create a screen update for a slot.
    #[must_use]
    pub fn new(slot: u8, text: impl Into<String>) -> Self {
        Self { slot, text: text.into() }
    }

    /// Encode into the wire format.
    ///
    /// The text is cut at [`SCREEN_TEXT_MAX`] bytes without regard for
    /// character boundaries; the display firmware tolerates a split sequence.
    pub fn encode(&self, dst: &mut BytesMut) {
        let text = self.text.as_bytes();
        let len = text.len().min(SCREEN_TEXT_MAX);

        dst.reserve(2 + len);
        dst.put_u8(SCREEN_TAG);
        dst.put_u8(self.slot);
        dst.put_slice(&text[..len]);
    }

    /// Encode into a freshly allocated buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(SCREEN_UPDATE_MAX_LEN);
        self.encode(&mut buf);
        buf.freeze()
    }
}

/// Decode one fader report from the front of `src`.
///
/// Returns `Ok(None)` while fewer than [`FADER_REPORT_LEN`] bytes are
/// buffered; those bytes are left in place. Otherwise exactly one 6-byte
/// window is consumed, whether or not its tag is valid.
///
/// # Errors
/// Returns [`ProtocolError::UnexpectedTag`] if the window does not start with
/// [`FADER_TAG`].
pub fn decode_fader_report(src: &mut BytesMut) -> Result<Option<FaderReport>, ProtocolError> {
    if src.len() < FADER_REPORT_LEN {
        return Ok(None);
    }

    let tag = src.get_u8();
    let mut values = [0u8; FADER_COUNT];
    src.copy_to_slice(&mut values);

    if tag != FADER_TAG {
        return Err(ProtocolError::UnexpectedTag(tag));
    }

    Ok(Some(FaderReport { values }))
}

/// Outcome of draining every complete window from a receive buffer.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Drained {
    /// Most recent well-formed report, if any.
    pub latest: Option<FaderReport>,
    /// Number of windows dropped for a bad tag.
    pub malformed: usize,
}

/// Decode all complete windows in `src`, keeping only the newest report.
///
/// The firmware samples far faster than the host polls, so older reports in
/// the buffer are stale by the time they are read.
pub fn drain_latest(src: &mut BytesMut) -> Drained {
    let mut drained = Drained::default();

    while src.len() >= FADER_REPORT_LEN {
        match decode_fader_report(src) {
            Ok(Some(report)) => drained.latest = Some(report),
            Ok(None) => break,
            Err(_) => drained.malformed += 1,
        }
    }

    drained
}
