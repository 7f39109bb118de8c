//! File-backed key-value store.
//!
//! Each key maps to one JSON file below a root directory:
//! - Linux: ~/.local/share/pokedex/<key>.json
//! - macOS: ~/Library/Application Support/pokedex/<key>.json
//! - Windows: %APPDATA%/pokedex/<key>.json

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use pokedex_application::{KeyValueStore, StorageError};
use tokio::fs;

/// Key-value store keeping one file per key.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Creates a store rooted at `root`. The directory is created on first
    /// write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a store in the platform data directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the platform has no data
    /// directory.
    pub fn in_data_dir() -> Result<Self, StorageError> {
        dirs::data_dir()
            .map(|dir| Self::new(dir.join("pokedex")))
            .ok_or_else(|| {
                StorageError::Unavailable("could not determine data directory".to_string())
            })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file that backs `key`.
    ///
    /// # Errors
    ///
    /// Returns an error for keys with no usable characters.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let file_stem = sanitize_key(key);
        if file_stem.chars().all(|c| c == '_') {
            return Err(StorageError::Io(format!("unusable storage key: {key:?}")));
        }
        Ok(self.root.join(format!("{file_stem}.json")))
    }
}

/// Maps a key to a file stem, replacing anything outside `[A-Za-z0-9._-]`.
fn sanitize_key(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn io_error(path: &Path, error: &std::io::Error) -> StorageError {
    StorageError::Io(format!("{}: {error}", path.display()))
}

impl KeyValueStore for FileKeyValueStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, &e)),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(&self.root, &e))?;

        // Replace via rename so readers never see a half-written file.
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, value)
            .await
            .map_err(|e| io_error(&temp, &e))?;
        fs::rename(&temp, &path)
            .await
            .map_err(|e| io_error(&path, &e))
    }
}
