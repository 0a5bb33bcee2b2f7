//! Passenger storage selection.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `storage.mode` as written in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum StorageKind {
    /// Records live for the lifetime of the process.
    #[default]
    Memory,
    /// Records persist in a JSON snapshot.
    File,
}

/// Resolved passenger storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PassengerStorageMode {
    /// In-memory store.
    #[default]
    Memory,
    /// JSON snapshot at the given path.
    File(PathBuf),
}

impl PassengerStorageMode {
    /// Snapshot path, if any.
    #[must_use]
    pub fn snapshot_path(&self) -> Option<&Path> {
        match self {
            Self::Memory => None,
            Self::File(path) => Some(path),
        }
    }

    /// Short label for status output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File(_) => "file",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_mode_has_no_snapshot() {
        assert_eq!(PassengerStorageMode::default().snapshot_path(), None);
        assert_eq!(PassengerStorageMode::Memory.label(), "memory");
    }

    #[test]
    fn file_mode_exposes_its_path() {
        let mode = PassengerStorageMode::File(PathBuf::from("/var/checkin/passengers.json"));
        assert_eq!(
            mode.snapshot_path(),
            Some(Path::new("/var/checkin/passengers.json"))
        );
        assert_eq!(mode.label(), "file");
    }
}
