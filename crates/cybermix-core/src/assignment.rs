//! Fader slot assignments and their persisted form.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::channel::ChannelId;
use crate::error::{Error, Result};
use crate::protocol::{FADER_COUNT, FADER_MAX};

/// Value a slot holds before the first report arrives (fader mid-travel).
pub const DEFAULT_FADER_VALUE: u8 = 64;

/// One of the five physical fader positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaderSlot {
    index: u8,
    assigned_channel: Option<ChannelId>,
    last_value: u8,
}

impl FaderSlot {
    fn new(index: u8, assigned_channel: Option<ChannelId>) -> Self {
        Self { index, assigned_channel, last_value: DEFAULT_FADER_VALUE }
    }

    /// Slot position, 0-4.
    #[must_use]
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Channel this fader controls, if any.
    #[must_use]
    pub fn channel(&self) -> Option<&ChannelId> {
        self.assigned_channel.as_ref()
    }

    /// Most recent raw fader reading (0-127).
    #[must_use]
    pub fn last_value(&self) -> u8 {
        self.last_value
    }
}

/// Serialized shape of the assignment table.
///
/// ```json
/// { "fader_assignments": ["System Master Volume", null, null, null, null],
///   "fader_values": [64, 64, 64, 64, 64], "page": 0 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentState {
    pub fader_assignments: Vec<Option<String>>,
    pub fader_values: Vec<i64>,
    pub page: u32,
}

impl Default for AssignmentState {
    fn default() -> Self {
        AssignmentTable::default().snapshot()
    }
}

/// Authoritative slot-to-channel mapping plus last known fader values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentTable {
    slots: [FaderSlot; FADER_COUNT],
    page: u32,
}

impl Default for AssignmentTable {
    /// Slot 0 controls master volume; the rest start unassigned.
    #[allow(clippy::cast_possible_truncation)]
    fn default() -> Self {
        let slots = std::array::from_fn(|i| {
            let channel = (i == 0).then(ChannelId::master);
            FaderSlot::new(i as u8, channel)
        });
        Self { slots, page: 0 }
    }
}

impl AssignmentTable {
    /// Create the first-run table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a table from persisted state.
    ///
    /// State with the wrong number of slots is treated as corrupt and yields
    /// the default table. Stored values outside 0-127 are clamped and blank
    /// channel names are read as unassigned.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn restore(state: AssignmentState) -> Self {
        if state.fader_assignments.len() != FADER_COUNT || state.fader_values.len() != FADER_COUNT
        {
            warn!(
                assignments = state.fader_assignments.len(),
                values = state.fader_values.len(),
                "Persisted fader state has wrong slot count, using defaults"
            );
            return Self::default();
        }

        let mut table = Self { page: state.page, ..Self::default() };
        for (slot, (channel, value)) in
            table.slots.iter_mut().zip(state.fader_assignments.into_iter().zip(state.fader_values))
        {
            slot.assigned_channel = channel.map(ChannelId::from).filter(|c| !c.is_blank());
            slot.last_value = value.clamp(0, i64::from(FADER_MAX)) as u8;
        }
        table
    }

    /// Rebuild a table from a persisted JSON blob.
    ///
    /// Empty or unparsable input yields the default table.
    #[must_use]
    pub fn restore_json(blob: &[u8]) -> Self {
        if blob.iter().all(u8::is_ascii_whitespace) {
            return Self::default();
        }
        match serde_json::from_slice::<AssignmentState>(blob) {
            Ok(state) => Self::restore(state),
            Err(e) => {
                warn!(error = %e, "Persisted fader state is unreadable, using defaults");
                Self::default()
            }
        }
    }

    /// Capture the table for persistence.
    #[must_use]
    pub fn snapshot(&self) -> AssignmentState {
        AssignmentState {
            fader_assignments: self
                .slots
                .iter()
                .map(|s| s.assigned_channel.as_ref().map(|c| c.as_str().to_string()))
                .collect(),
            fader_values: self.slots.iter().map(|s| i64::from(s.last_value)).collect(),
            page: self.page,
        }
    }

    /// All five slots in index order.
    #[must_use]
    pub fn slots(&self) -> &[FaderSlot] {
        &self.slots
    }

    /// Last known values of all faders.
    #[must_use]
    pub fn values(&self) -> [u8; FADER_COUNT] {
        std::array::from_fn(|i| self.slots[i].last_value)
    }

    /// Point a fader at a channel. A blank name leaves the fader unassigned.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSlot`] if `index >= 5`.
    pub fn assign(&mut self, index: usize, channel: ChannelId) -> Result<()> {
        self.slot_mut(index)?.assigned_channel = (!channel.is_blank()).then_some(channel);
        Ok(())
    }

    /// Clear a fader's channel.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSlot`] if `index >= 5`.
    pub fn unassign(&mut self, index: usize) -> Result<()> {
        self.slot_mut(index)?.assigned_channel = None;
        Ok(())
    }

    /// Store a fader reading, clamped to 0-127.
    ///
    /// Returns whether the stored value changed.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSlot`] if `index >= 5`.
    pub fn record_value(&mut self, index: usize, value: u8) -> Result<bool> {
        let slot = self.slot_mut(index)?;
        let value = value.min(FADER_MAX);
        let changed = slot.last_value != value;
        slot.last_value = value;
        Ok(changed)
    }

    /// Directory page currently being browsed.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Move to the next directory page if there is one.
    pub fn next_page(&mut self, page_count: u32) -> bool {
        if self.page.saturating_add(1) < page_count {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous directory page if there is one.
    pub fn prev_page(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Pull the page back into range after the directory shrank.
    pub fn clamp_page(&mut self, page_count: u32) -> bool {
        let last = page_count.saturating_sub(1);
        if self.page > last {
            self.page = last;
            true
        } else {
            false
        }
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut FaderSlot> {
        self.slots.get_mut(index).ok_or(Error::InvalidSlot(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_table() {
        let table = AssignmentTable::new();

        assert_eq!(table.slots()[0].channel(), Some(&ChannelId::master()));
        for slot in &table.slots()[1..] {
            assert!(slot.channel().is_none());
        }
        assert_eq!(table.values(), [DEFAULT_FADER_VALUE; FADER_COUNT]);
        assert_eq!(table.page(), 0);
    }

    #[test]
    fn test_assign_updates_snapshot() {
        let mut table = AssignmentTable::new();

        for i in 0..FADER_COUNT {
            let name = format!("app{i}.exe");
            table.assign(i, ChannelId::new(name.clone())).unwrap();
            assert_eq!(table.snapshot().fader_assignments[i], Some(name));
        }
    }

    #[test]
    fn test_assign_rejects_out_of_range_slot() {
        let mut table = AssignmentTable::new();

        assert_matches!(table.assign(5, "x".into()), Err(Error::InvalidSlot(5)));
        assert_matches!(table.assign(usize::MAX, "x".into()), Err(Error::InvalidSlot(_)));
        assert_matches!(table.unassign(7), Err(Error::InvalidSlot(7)));
        assert_matches!(table.record_value(5, 10), Err(Error::InvalidSlot(5)));
        assert_eq!(table, AssignmentTable::new());
    }

    #[test]
    fn test_assign_blank_name_unassigns() {
        let mut table = AssignmentTable::new();

        table.assign(0, "".into()).unwrap();
        table.assign(1, "   ".into()).unwrap();

        assert!(table.slots()[0].channel().is_none());
        assert!(table.slots()[1].channel().is_none());
        assert_eq!(table.snapshot().fader_assignments, vec![None; FADER_COUNT]);
    }

    #[test]
    fn test_unassign() {
        let mut table = AssignmentTable::new();
        table.unassign(0).unwrap();

        assert!(table.slots()[0].channel().is_none());
        assert_eq!(table.snapshot().fader_assignments, vec![None; FADER_COUNT]);
    }

    #[test]
    fn test_record_value_clamps() {
        let mut table = AssignmentTable::new();

        assert!(table.record_value(1, 200).unwrap());
        assert_eq!(table.slots()[1].last_value(), 127);

        assert!(!table.record_value(1, 255).unwrap());
        assert!(table.record_value(1, 0).unwrap());
        assert_eq!(table.slots()[1].last_value(), 0);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut table = AssignmentTable::new();
        table.assign(3, "Spotify.exe".into()).unwrap();
        table.record_value(3, 99).unwrap();
        table.next_page(4);

        let restored = AssignmentTable::restore(table.snapshot());

        assert_eq!(restored, table);
        assert_eq!(restored.slots()[3].channel().map(ChannelId::as_str), Some("Spotify.exe"));
    }

    #[test]
    fn test_restore_json_garbage_yields_default() {
        for blob in [&b""[..], b"   ", b"not json", b"{\"fader_assignments\": 3}", b"[1,2,3]"] {
            assert_eq!(AssignmentTable::restore_json(blob), AssignmentTable::default());
        }
    }

    #[test]
    fn test_restore_wrong_slot_count_yields_default() {
        let state = AssignmentState {
            fader_assignments: vec![Some("discord.exe".into()); 3],
            fader_values: vec![0; 3],
            page: 2,
        };

        assert_eq!(AssignmentTable::restore(state), AssignmentTable::default());
    }

    #[test]
    fn test_restore_json_clamps_values_and_fills_missing_fields() {
        let blob = br#"{"fader_assignments": [null, "vlc.exe", null, null, null],
                        "fader_values": [-4, 500, 10, 20, 30]}"#;

        let table = AssignmentTable::restore_json(blob);

        assert!(table.slots()[0].channel().is_none());
        assert_eq!(table.slots()[1].channel(), Some(&ChannelId::new("VLC.exe")));
        assert_eq!(table.values(), [0, 127, 10, 20, 30]);
        assert_eq!(table.page(), 0);
    }

    #[test]
    fn test_restore_blank_assignment_is_unassigned() {
        let blob = br#"{"fader_assignments": ["", " ", "vlc", null, null],
                        "fader_values": [1, 2, 3, 4, 5], "page": 0}"#;

        let table = AssignmentTable::restore_json(blob);

        assert!(table.slots()[0].channel().is_none());
        assert!(table.slots()[1].channel().is_none());
        assert_eq!(table.slots()[2].channel(), Some(&ChannelId::new("vlc")));
    }

    #[test]
    fn test_paging_stays_in_range() {
        let mut table = AssignmentTable::new();

        assert!(!table.prev_page());
        assert!(table.next_page(2));
        assert!(!table.next_page(2));
        assert_eq!(table.page(), 1);

        assert!(table.clamp_page(1));
        assert_eq!(table.page(), 0);
        assert!(!table.clamp_page(0));
    }
}
