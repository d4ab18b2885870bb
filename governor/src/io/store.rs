//! Deterministic state store: one canonical JSON document per key.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::core::canonical::{canonical_json, content_hash, is_canonical};
use crate::error::StoreError;

/// A stored document.
pub type Document = Map<String, Value>;

const EXTENSION: &str = "json";

/// Directory-backed store of named JSON documents (`{root}/{key}.json`).
///
/// One writer per directory. Writes go through a temp file and a rename, so
/// a reader never observes a half-written document.
#[derive(Debug, Clone)]
pub struct StateStore {
    root: PathBuf,
}

impl StateStore {
    /// Open a store rooted at `root`, creating the directory if absent.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        create_dir(&root)?;
        debug!(root = %root.display(), "opened state store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{EXTENSION}")))
    }

    pub fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.path_for(key)?.is_file())
    }

    /// Persist `state` under `key`, replacing any previous document.
    pub fn write_state(&self, key: &str, state: &Document) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let bytes = canonical_json(&Value::Object(state.clone()));
        debug!(key, path = %path.display(), bytes = bytes.len(), "writing state");
        create_dir(&self.root)?;
        write_atomic(&path, &bytes)
    }

    /// Load the document stored under `key`.
    pub fn read_state(&self, key: &str) -> Result<Document, StoreError> {
        let path = self.path_for(key)?;
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    key: key.to_string(),
                    path,
                });
            }
            Err(source) => {
                return Err(StoreError::Io {
                    action: "read state",
                    path,
                    source,
                });
            }
        };
        let value: Value = serde_json::from_slice(&raw).map_err(|source| StoreError::Malformed {
            key: key.to_string(),
            source,
        })?;
        // Hand-edited files still load; only the snapshot is canonical.
        debug!(
            key,
            bytes = raw.len(),
            canonical = is_canonical(&raw, &value),
            "state loaded"
        );
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::NotAnObject {
                key: key.to_string(),
            }),
        }
    }

    /// SHA-256 of the canonical encoding of the document under `key`.
    ///
    /// Computed from the decoded document, not the file bytes, so formatting
    /// drift on disk does not change the result.
    pub fn create_snapshot(&self, key: &str) -> Result<String, StoreError> {
        let state = self.read_state(key)?;
        let hash = content_hash(&Value::Object(state));
        debug!(key, %hash, "snapshot");
        Ok(hash)
    }

    /// Keys of all stored documents, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::Io {
            action: "list store",
            path: self.root.clone(),
            source,
        })?;
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                action: "list store",
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if validate_key(key).is_ok() && path.is_file() {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Keys are file stems: `[A-Za-z0-9._-]`, non-empty, not `.` or `..`.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let reason = if key.is_empty() {
        Some("must not be empty")
    } else if key == "." || key == ".." {
        Some("must not be a relative path component")
    } else if key
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-'))
    {
        Some("must be [A-Za-z0-9._-] only")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(StoreError::InvalidKey {
            key: key.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn create_dir(path: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(path).map_err(|source| StoreError::Io {
        action: "create directory",
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents).map_err(|source| StoreError::Io {
        action: "write temp state",
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| StoreError::Io {
        action: "replace state",
        path: path.to_path_buf(),
        source,
    })
}
