//! Text and meter rendering for the on-device displays.

use crate::channel::ChannelId;
use crate::protocol::FADER_MAX;

/// Label shown for a slot with no channel.
pub const UNASSIGNED_LABEL: &str = "---";

/// Characters of the channel name kept on the display.
pub const LABEL_NAME_CHARS: usize = 8;

/// LEDs in the meter bar on the surface.
pub const METER_LED_COUNT: u8 = 8;

/// Fader position as a whole percentage, rounded to nearest.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percent(value: u8) -> u8 {
    (f32::from(value.min(FADER_MAX)) * 100.0 / f32::from(FADER_MAX)).round() as u8
}

/// Display text for a slot, e.g. `"Spotify: 50%"`.
#[must_use]
pub fn slot_label(channel: Option<&ChannelId>, value: u8) -> String {
    let name: String = match channel {
        Some(channel) => channel.as_str().chars().take(LABEL_NAME_CHARS).collect(),
        None => UNASSIGNED_LABEL.to_string(),
    };
    format!("{name}: {}%", percent(value))
}

/// Number of meter LEDs lit for a fader position.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn meter_level(value: u8) -> u8 {
    (u16::from(value.min(FADER_MAX)) * u16::from(METER_LED_COUNT) / u16::from(FADER_MAX)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds() {
        assert_eq!(percent(0), 0);
        assert_eq!(percent(10), 8);
        assert_eq!(percent(64), 50);
        assert_eq!(percent(127), 100);
        assert_eq!(percent(200), 100);
    }

    #[test]
    fn test_label_truncates_name_to_eight_chars() {
        assert_eq!(slot_label(Some(&ChannelId::master()), 10), "System M: 8%");
        assert_eq!(slot_label(Some(&ChannelId::new("vlc.exe")), 127), "vlc.exe: 100%");
    }

    #[test]
    fn test_label_counts_characters_not_bytes() {
        assert_eq!(slot_label(Some(&ChannelId::new("ééééééééééé")), 0), "éééééééé: 0%");
    }

    #[test]
    fn test_label_for_unassigned_slot() {
        assert_eq!(slot_label(None, 64), "---: 50%");
    }

    #[test]
    fn test_meter_level() {
        assert_eq!(meter_level(0), 0);
        assert_eq!(meter_level(15), 0);
        assert_eq!(meter_level(16), 1);
        assert_eq!(meter_level(126), 7);
        assert_eq!(meter_level(127), 8);
    }
}
