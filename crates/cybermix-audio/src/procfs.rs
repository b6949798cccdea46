//! Running process names from `/proc`.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use cybermix_core::ProcessLister;

/// Lists processes by reading `/proc/<pid>/comm`.
#[derive(Debug, Clone)]
pub struct ProcfsProcessLister {
    root: PathBuf,
}

impl Default for ProcfsProcessLister {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl ProcfsProcessLister {
    /// Read processes from an alternate proc root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ProcessLister for ProcfsProcessLister {
    fn process_names(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(root = %self.root.display(), error = %e, "Cannot read process list");
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(pid) = file_name.to_str() else {
                continue;
            };
            if pid.is_empty() || !pid.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }

            // Processes exit between read_dir and here.
            if let Ok(comm) = fs::read_to_string(entry.path().join("comm")) {
                let name = comm.trim();
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }
        names
    }
}
