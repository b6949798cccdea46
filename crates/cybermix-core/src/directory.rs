//! Directory of assignable volume channels.
//!
//! The directory is rebuilt from scratch on every refresh: master volume
//! first, then applications with an audio session, then other running
//! processes that look like user-facing applications. Each group is sorted
//! case-insensitively and names are deduplicated ignoring case.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::channel::ChannelId;
use crate::volume::VolumeBackend;

/// Number of directory entries shown per page (one per fader).
pub const PAGE_SIZE: usize = 5;

/// Substrings of system, driver, and background service processes.
const EXCLUDED_KEYWORDS: &[&str] = &[
    "system", "svchost", "wininit", "winlogon", "lsass", "csrss", "smss", "services",
    "ntoskrnl", "conhost", "dwm", "explorer", "taskhostw", "rundll32", "dllhost", "wmiprvse",
    "sihost", "wuauserv", "spoolsv", "searchindexer", "vds", "nvda", "nvidia", "amd", "intel",
    "realtek", "qualcomm", "razer", "corsair", "msi", "asus", "lenovo", "dell", "hp", "acer",
    "microsoft edge", "windowsapps", "host", "service", "daemon", "agent", "monitor", "update",
    "defender", "antimalware", "bits", "trustedinstaller", "ngscryptoapi", "kworker",
    "kthreadd", "pipewire", "wireplumber", "pulseaudio", "dbus", "xorg", "xwayland",
];

/// Substrings of well-known consumer applications.
const USER_APP_KEYWORDS: &[&str] = &[
    "chrome", "firefox", "edge", "safari", "opera", "brave", "discord", "slack", "teams",
    "zoom", "skype", "telegram", "spotify", "youtube", "vlc", "obs", "audacity", "steam",
    "epic", "uplay", "battlenet", "blender", "adobe", "gimp", "logic", "ableton", "cubase",
    "reaper", "fl studio", "finale", "notion", "messenger", "whatsapp", "handbrake", "ffmpeg",
    "potplayer", "winamp", "foobar", "mediamonkey", "musicbee", "itunes", "groove",
    "amazon music", "twitch", "xsplit", "streamlabs", "dexpot", "rainmeter", "mpv",
    "rhythmbox", "audacious", "clementine", "strawberry",
];

/// Source of running process names.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessLister: Send {
    /// Executable names of all running processes, in any order.
    fn process_names(&self) -> Vec<String>;
}

/// Verdict of the user-facing application heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Known system or background process
    Exclude,
    /// Known consumer application
    Include,
    /// Unknown; only listed if it has an audio session
    Undecided,
}

/// Guess whether a process is something a user would want on a fader.
///
/// Best effort only. A trailing `.exe` is ignored so Windows and Linux
/// names are judged alike.
#[must_use]
pub fn classify_process(name: &str) -> Admission {
    let lower = name.to_lowercase();
    let stem = lower.strip_suffix(".exe").unwrap_or(&lower);

    if EXCLUDED_KEYWORDS.iter().any(|k| stem.contains(k)) {
        Admission::Exclude
    } else if USER_APP_KEYWORDS.iter().any(|k| stem.contains(k)) {
        Admission::Include
    } else {
        Admission::Undecided
    }
}

/// Ordered, deduplicated snapshot of assignable channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDirectory {
    entries: Vec<ChannelId>,
}

impl Default for ChannelDirectory {
    fn default() -> Self {
        Self { entries: vec![ChannelId::master()] }
    }
}

impl ChannelDirectory {
    /// Query the audio backend and process list and build a fresh directory.
    ///
    /// A failing session query is logged and treated as "no sessions".
    pub fn refresh(backend: &dyn VolumeBackend, processes: &dyn ProcessLister) -> Self {
        let sessions = match backend.list_sessions() {
            Ok(sessions) => sessions.into_iter().map(|s| s.process_name).collect(),
            Err(e) => {
                warn!(error = %e, "Failed to list audio sessions");
                Vec::new()
            }
        };

        let directory = Self::build(sessions, processes.process_names());
        debug!(entries = directory.len(), "Channel directory refreshed");
        directory
    }

    /// Build a directory from session owners and running processes.
    ///
    /// Session owners are always listed. Other processes are listed only if
    /// [`classify_process`] admits them.
    pub fn build(
        sessions: impl IntoIterator<Item = String>,
        processes: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(ChannelId::master().key());

        let mut with_session = Vec::new();
        for name in sessions {
            if !name.is_empty() && seen.insert(name.to_lowercase()) {
                with_session.push(ChannelId::new(name));
            }
        }

        let mut others = Vec::new();
        for name in processes {
            if name.is_empty() || classify_process(&name) != Admission::Include {
                continue;
            }
            if seen.insert(name.to_lowercase()) {
                others.push(ChannelId::new(name));
            }
        }

        with_session.sort_by_key(ChannelId::key);
        others.sort_by_key(ChannelId::key);

        let mut entries = Vec::with_capacity(1 + with_session.len() + others.len());
        entries.push(ChannelId::master());
        entries.extend(with_session);
        entries.extend(others);
        Self { entries }
    }

    /// All entries, master first.
    #[must_use]
    pub fn entries(&self) -> &[ChannelId] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a channel is currently listed (ignoring case).
    #[must_use]
    pub fn contains(&self, channel: &ChannelId) -> bool {
        self.entries.contains(channel)
    }

    /// Number of [`PAGE_SIZE`] windows; at least one.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn page_count(&self) -> u32 {
        self.entries.len().div_ceil(PAGE_SIZE).max(1) as u32
    }

    /// Entries on the given page; empty past the end.
    #[must_use]
    pub fn page(&self, page: u32) -> &[ChannelId] {
        let start = (page as usize).saturating_mul(PAGE_SIZE).min(self.entries.len());
        let end = start.saturating_add(PAGE_SIZE).min(self.entries.len());
        &self.entries[start..end]
    }
}
