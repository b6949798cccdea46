//! CyberMix Store - fader settings persistence.
//!
//! Fader assignments, last fader values and the browsed directory page are
//! kept in a small JSON file so they survive restarts:
//!
//! ```json
//! {
//!   "fader_assignments": ["System Master Volume", "spotify", null, null, null],
//!   "fader_values": [64, 100, 64, 64, 64],
//!   "page": 0
//! }
//! ```

pub mod error;

pub use error::{StoreError, StoreResult};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cybermix_core::{AssignmentState, AssignmentTable, PersistenceError, StateStore};
use directories::ProjectDirs;
use tracing::{debug, info};

/// Settings file name inside the data directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// JSON-file home for the assignment table.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Use the settings file at the default location.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be determined.
    pub fn open() -> StoreResult<Self> {
        Ok(Self::open_at(Self::default_path()?))
    }

    /// Use the settings file at a specific path. Nothing is created until the
    /// first save.
    #[must_use]
    pub fn open_at(path: PathBuf) -> Self {
        info!(?path, "Using settings file");
        Self { path }
    }

    /// Get the default settings path.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be determined.
    pub fn default_path() -> StoreResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "cybermix", "CyberMix").ok_or(StoreError::NoDataDir)?;
        Ok(dirs.data_dir().join(SETTINGS_FILE))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the assignment table.
    ///
    /// A missing file yields the first-run table. A corrupt file is logged
    /// and also yields the first-run table.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read.
    pub fn load(&self) -> StoreResult<AssignmentTable> {
        match fs::read(&self.path) {
            Ok(blob) => {
                debug!(path = ?self.path, bytes = blob.len(), "Loaded settings");
                Ok(AssignmentTable::restore_json(&blob))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = ?self.path, "No saved settings, starting fresh");
                Ok(AssignmentTable::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write a snapshot, replacing the previous file atomically.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn write(&self, state: &AssignmentState) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = ?self.path, "Saved settings");
        Ok(())
    }
}

impl StateStore for SettingsStore {
    fn save(&self, state: &AssignmentState) -> Result<(), PersistenceError> {
        Ok(self.write(state)?)
    }
}
