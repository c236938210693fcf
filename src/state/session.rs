/// Session persistence for the slider state
///
/// The current render parameters are written to a small JSON file in the
/// user's config directory after every change, and restored (clamped) on
/// the next launch. A missing or corrupt file falls back to the defaults
/// with a logged warning, never an error dialog.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::params::RenderParams;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("session file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk layout of the session file
#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    /// When the session was last written
    saved_at: DateTime<Utc>,
    /// The slider state to restore
    params: RenderParams,
}

/// Loads and saves the session file.
///
/// The file lives in the user's config directory:
/// - Linux: ~/.config/ray-viewer/session.json
/// - macOS: ~/Library/Application Support/ray-viewer/session.json
/// - Windows: %APPDATA%\ray-viewer\session.json
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store pointing at the per-user session file
    pub fn new() -> Self {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        path.push("ray-viewer");
        path.push("session.json");

        Self { path }
    }

    /// Create a store at an explicit path
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this store reads and writes
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved parameters. `Ok(None)` means no session file exists.
    pub fn load(&self) -> Result<Option<RenderParams>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|source| SessionError::Io {
            path: self.path.clone(),
            source,
        })?;

        let file: SessionFile =
            serde_json::from_str(&contents).map_err(|source| SessionError::Parse {
                path: self.path.clone(),
                source,
            })?;

        Ok(Some(file.params))
    }

    /// Read the saved parameters, falling back to defaults on any failure.
    /// Restored values are clamped back into their slider ranges.
    pub fn load_or_default(&self) -> RenderParams {
        match self.load() {
            Ok(Some(params)) => params.clamped(),
            Ok(None) => RenderParams::default(),
            Err(e) => {
                log::warn!("ignoring session file: {e}");
                RenderParams::default()
            }
        }
    }

    /// Write the current parameters, creating the directory if needed
    pub fn save(&self, params: &RenderParams) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SessionError::Io {
                path: self.path.clone(),
                source,
            })?;
        }

        let file = SessionFile {
            saved_at: Utc::now(),
            params: *params,
        };

        // SessionFile only holds plain scalars, so serialization cannot fail
        let json = serde_json::to_string_pretty(&file).expect("session file is always serializable");

        fs::write(&self.path, json).map_err(|source| SessionError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at_path(dir.path().join("session.json"));

        let params = RenderParams {
            red: 0.3,
            green: 0.8,
            blue: 0.5,
            depth: 2,
        };

        store.save(&params).unwrap();
        let restored = store.load().unwrap();

        assert_eq!(restored, Some(params));
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at_path(dir.path().join("missing.json"));

        assert_eq!(store.load().unwrap(), None);
        assert!(store.load_or_default().is_default());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json at all").unwrap();

        let store = SessionStore::at_path(&path);

        assert!(matches!(store.load(), Err(SessionError::Parse { .. })));
        assert!(store.load_or_default().is_default());
    }

    #[test]
    fn test_out_of_range_session_values_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(
            &path,
            r#"{
                "saved_at": "2024-01-01T00:00:00Z",
                "params": { "red": 7.0, "green": -1.0, "blue": 0.5, "depth": 50 }
            }"#,
        )
        .unwrap();

        let store = SessionStore::at_path(&path);
        let params = store.load_or_default();

        assert_eq!(params.red, 1.0);
        assert_eq!(params.green, 0.0);
        assert_eq!(params.blue, 0.5);
        assert_eq!(params.depth, crate::state::params::MAX_TRACE_DEPTH);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at_path(dir.path().join("nested").join("session.json"));

        store.save(&RenderParams::default()).unwrap();

        assert!(store.path().exists());
    }
}
