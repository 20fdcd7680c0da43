//! services/api/src/adapters/kv_file.rs
//!
//! This module contains the file-backed storage adapter, the concrete
//! implementation of the `StorageBackend` port from the `core` crate.
//! Each storage slot maps to one JSON file inside the data directory,
//! mirroring the one-value-per-key layout the planner was designed around.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use kinderplan_core::ports::{PortError, PortResult, StorageBackend};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A storage adapter that keeps every slot as `<data_dir>/<slot>.json`.
///
/// Reads and writes are serialized through an internal lock; the system
/// assumes a single active process, so no cross-process coordination is
/// attempted.
pub struct FileBackend {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FileBackend {
    /// Creates the adapter, creating the data directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            lock: Mutex::new(()),
        })
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        // Slot names are ours, but sanitize anyway so a slot can never
        // escape the data directory.
        let name: String = slot
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{name}.json"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn io_error(err: std::io::Error) -> PortError {
    PortError::Storage(err.to_string())
}

//=========================================================================================
// `StorageBackend` Trait Implementation
//=========================================================================================

impl StorageBackend for FileBackend {
    fn read(&self, slot: &str) -> PortResult<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| {
            PortError::Storage("storage lock poisoned".to_string())
        })?;
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(err)),
        }
    }

    fn write(&self, slot: &str, value: &str) -> PortResult<()> {
        let _guard = self.lock.lock().map_err(|_| {
            PortError::Storage("storage lock poisoned".to_string())
        })?;
        let path = self.slot_path(slot);
        // Write through a sibling temp file so a crash mid-write cannot
        // leave a truncated slot behind.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(io_error)?;
        fs::rename(&tmp, &path).map_err(io_error)
    }

    fn remove(&self, slot: &str) -> PortResult<()> {
        let _guard = self.lock.lock().map_err(|_| {
            PortError::Storage("storage lock poisoned".to_string())
        })?;
        match fs::remove_file(self.slot_path(slot)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_backend() -> FileBackend {
        let dir = std::env::temp_dir().join(format!("kinderplan_kv_{}", Uuid::new_v4().simple()));
        FileBackend::new(dir).unwrap()
    }

    #[test]
    fn read_write_remove_round_trip() {
        let backend = temp_backend();
        assert_eq!(backend.read("dpb_plans_v1").unwrap(), None);

        backend.write("dpb_plans_v1", "[]").unwrap();
        assert_eq!(backend.read("dpb_plans_v1").unwrap().as_deref(), Some("[]"));

        backend.write("dpb_plans_v1", r#"[{"id":"p1"}]"#).unwrap();
        assert_eq!(
            backend.read("dpb_plans_v1").unwrap().as_deref(),
            Some(r#"[{"id":"p1"}]"#)
        );

        backend.remove("dpb_plans_v1").unwrap();
        assert_eq!(backend.read("dpb_plans_v1").unwrap(), None);
        // Removing an absent slot is fine.
        backend.remove("dpb_plans_v1").unwrap();
    }

    #[test]
    fn slot_names_cannot_escape_the_data_directory() {
        let backend = temp_backend();
        backend.write("../escape", "x").unwrap();
        assert!(backend.root().join("___escape.json").exists());
    }
}
