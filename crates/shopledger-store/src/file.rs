//! Flat-file implementation of the Store trait.
//!
//! The whole state is written as text (see [`crate::text`]) to a sibling
//! temporary file which is then renamed over the target, so a crash mid-save
//! leaves either the old file or the new one, never a torn mix.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use shopledger_core::LedgerState;

use crate::error::{Result, StoreError};
use crate::text;
use crate::traits::Store;

/// Text-file store at a fixed path.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store for `path`. The file is not touched until the first
    /// load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl Store for FileStore {
    fn load(&self) -> Result<LedgerState> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no ledger file, starting fresh");
                return Ok(LedgerState::new());
            }
            Err(e) => return Err(e.into()),
        };

        let contents = String::from_utf8(bytes).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
            StoreError::corrupt(format!("line {line}"), "not valid UTF-8")
        })?;

        let state = text::decode(&contents)?;
        tracing::debug!(
            path = %self.path.display(),
            products = state.inventory().len(),
            actions = state.actions().len(),
            "loaded ledger file"
        );
        Ok(state)
    }

    fn save(&self, state: &LedgerState) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(self.dir())?;
        tmp.write_all(text::encode(state).as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::debug!(
            path = %self.path.display(),
            actions = state.actions().len(),
            "saved ledger file"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopledger_core::Command;

    fn sample_state() -> LedgerState {
        let mut state = LedgerState::new();
        state.apply(Command::deposit(100.0)).unwrap();
        state.apply(Command::purchase("Widget", 2.5, 10)).unwrap();
        state.apply(Command::sale("Widget", 4.0, 3)).unwrap();
        state
    }

    #[test]
    fn test_missing_file_loads_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("ledger.txt"));

        assert!(store.load().unwrap().is_fresh());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("ledger.txt"));
        let state = sample_state();

        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);

        // A second save overwrites rather than appends.
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("ledger.txt"));
        store.save(&sample_state()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("ledger.txt")]);
    }

    #[test]
    fn test_corrupt_file_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.txt");
        fs::write(&path, "Balance: 1.0\nInventory:\nHistory:\n[\"refund\",1.0]\n").unwrap();

        let err = FileStore::new(&path).load().unwrap_err();
        assert!(err.is_corrupt_state());
        assert!(matches!(err, StoreError::CorruptState { ref location, .. } if location == "line 4"));
    }

    #[test]
    fn test_invalid_utf8_is_corrupt_at_its_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.txt");
        fs::write(&path, b"Balance: 1.0\nInventory:\nProduct: Wid\xffget, 1.0, 2\nHistory:\n").unwrap();

        let err = FileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::CorruptState { ref location, .. } if location == "line 3"));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("missing").join("ledger.txt"));

        assert!(matches!(store.save(&sample_state()), Err(StoreError::Io(_))));
    }

    #[test]
    fn test_relative_path_uses_current_dir() {
        let store = FileStore::new("ledger.txt");
        assert_eq!(store.dir(), Path::new("."));
        assert_eq!(store.describe(), "file:ledger.txt");
    }
}
