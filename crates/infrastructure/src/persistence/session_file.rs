//! File-based session storage.
//!
//! Tokens live in a single JSON object on disk, keyed by the fixed session
//! keys:
//! ```json
//! {
//!   "access_token": "A1",
//!   "refresh_token": "R1"
//! }
//! ```

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use agrisky_application::ports::{SessionStorage, StorageError};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

type Entries = BTreeMap<String, String>;

/// Owner read/write only; the file holds bearer credentials.
#[cfg(unix)]
const SESSION_FILE_MODE: u32 = 0o600;

/// Session storage backed by a JSON file.
///
/// Every write is a read-modify-write of the whole file, serialized by an
/// internal lock.
#[derive(Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStorage {
    /// Creates storage backed by the file at `path`.
    ///
    /// The file and its parent directory are created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Entries, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(content) if content.iter().all(u8::is_ascii_whitespace) => Ok(Entries::new()),
            Ok(content) => {
                from_json_bytes(&content).map_err(|e| StorageError::Serialization(e.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn write_entries(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = to_json_stable_bytes(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(SESSION_FILE_MODE);
        let mut file = options.open(&self.path).await?;
        // Files created before the mode was applied keep their old bits.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(SESSION_FILE_MODE))
                .await?;
        }
        file.write_all(&content).await?;
        file.flush().await?;

        debug!(path = %self.path.display(), keys = entries.len(), "session file written");
        Ok(())
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_many(&[(key, value)]).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove_many(&[key]).await
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut stored = self.read_entries().await?;
        for (key, value) in entries {
            stored.insert((*key).to_string(), (*value).to_string());
        }
        self.write_entries(&stored).await
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut stored = self.read_entries().await?;
        let before = stored.len();
        for key in keys {
            stored.remove(*key);
        }
        if stored.len() == before {
            return Ok(());
        }
        self.write_entries(&stored).await
    }
}
