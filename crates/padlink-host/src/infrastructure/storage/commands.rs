//! JSON persistence of the per-slot command map.
//!
//! Command slots only carry kind byte 3 on the wire; the command text the
//! host runs on `CMD:<index>` lives in `commands.json` next to the config
//! file.  The format is a flat object of slot index (as a string) to
//! command line, pretty-printed:
//!
//! ```json
//! {
//!   "10": "explorer.exe",
//!   "12": "shutdown /s /t 0"
//! }
//! ```
//!
//! Loading is lenient: a missing file means an empty map, and entries with
//! non-numeric or out-of-range indices are ignored rather than failing the
//! load.  The map is saved after every configuration push.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use padlink_core::SLOT_COUNT;

/// Error type for command map persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error accessing command map at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse command map JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// File-backed slot-index to command-text map.
#[derive(Debug, Clone)]
pub struct CommandStore {
    path: PathBuf,
}

impl CommandStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted map.  A missing file yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] for file-system errors other than
    /// "not found" and [`StoreError::Parse`] for malformed JSON.
    pub fn load(&self) -> Result<HashMap<u8, String>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        let raw: HashMap<String, String> = serde_json::from_str(&content)?;
        let mut map = HashMap::with_capacity(raw.len());
        for (key, command) in raw {
            match key.parse::<u8>() {
                Ok(index) if (index as usize) < SLOT_COUNT => {
                    map.insert(index, command);
                }
                _ => warn!(key = %key, "ignoring command entry with invalid slot index"),
            }
        }
        Ok(map)
    }

    /// Persists the given command entries, overwriting the file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] for file-system failures.
    pub fn save<'a>(
        &self,
        entries: impl Iterator<Item = (u8, &'a str)>,
    ) -> Result<(), StoreError> {
        let map: HashMap<String, &str> = entries
            .map(|(index, command)| (index.to_string(), command))
            .collect();

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(&map)?;
        std::fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> CommandStore {
        let dir = std::env::temp_dir().join(format!(
            "padlink_test_{name}_{}",
            std::process::id()
        ));
        CommandStore::new(dir.join("commands.json"))
    }

    fn cleanup(store: &CommandStore) {
        if let Some(dir) = store.path().parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_load_missing_file_yields_empty_map() {
        let store = CommandStore::new("/nonexistent/padlink/commands.json");
        let map = store.load().expect("missing file is not an error");
        assert!(map.is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let store = temp_store("roundtrip");

        store
            .save([(2u8, "echo hi"), (12u8, "explorer.exe")].into_iter())
            .expect("save");
        let map = store.load().expect("load");

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&2).map(String::as_str), Some("echo hi"));
        assert_eq!(map.get(&12).map(String::as_str), Some("explorer.exe"));

        cleanup(&store);
    }

    #[test]
    fn test_save_writes_string_keys() {
        let store = temp_store("stringkeys");

        store.save([(5u8, "calc.exe")].into_iter()).expect("save");
        let content = std::fs::read_to_string(store.path()).expect("read");

        assert!(content.contains("\"5\""), "keys must be strings: {content}");

        cleanup(&store);
    }

    #[test]
    fn test_load_ignores_invalid_indices() {
        let store = temp_store("invalid");
        if let Some(dir) = store.path().parent() {
            std::fs::create_dir_all(dir).unwrap();
        }
        std::fs::write(
            store.path(),
            r#"{"3": "ok.exe", "abc": "bad", "99": "out of range"}"#,
        )
        .unwrap();

        let map = store.load().expect("load");

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&3).map(String::as_str), Some("ok.exe"));

        cleanup(&store);
    }

    #[test]
    fn test_load_malformed_json_is_an_error() {
        let store = temp_store("malformed");
        if let Some(dir) = store.path().parent() {
            std::fs::create_dir_all(dir).unwrap();
        }
        std::fs::write(store.path(), "not json").unwrap();

        assert!(matches!(store.load(), Err(StoreError::Parse(_))));

        cleanup(&store);
    }

    #[test]
    fn test_save_overwrites_previous_content() {
        let store = temp_store("overwrite");

        store.save([(1u8, "old.exe")].into_iter()).expect("save");
        store.save([(2u8, "new.exe")].into_iter()).expect("save");

        let map = store.load().expect("load");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&2).map(String::as_str), Some("new.exe"));

        cleanup(&store);
    }
}
