use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{KeyValueStore, StorageError};

/// JSON-file backed key-value store.
///
/// The whole file is one JSON object (`{"key": "value", ...}`). Every write
/// rewrites the file through a temp file and a rename so a crash never leaves
/// a half-written store behind.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    /// Maximum store file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::metadata(&self.path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(StorageError::TooLarge {
                    size: meta.len(),
                    max: Self::MAX_FILE_SIZE,
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StorageError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Write the map via temp-file-then-rename.
    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let content = serde_json::to_vec_pretty(map)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Unpredictable temp name; create_new refuses to follow a planted file.
        use std::time::{SystemTime, UNIX_EPOCH};
        let random_suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let temp_path = self
            .path
            .with_extension(format!("tmp.{:016x}", random_suffix));

        let result = (|| -> Result<(), StorageError> {
            let mut temp_file = std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&temp_path)?;
            temp_file.write_all(&content)?;
            temp_file.sync_all()?;
            drop(temp_file);

            // Windows refuses to rename over an existing file
            #[cfg(windows)]
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }

            std::fs::rename(&temp_path, &self.path)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = std::fs::remove_file(&temp_path);
        }
        result
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let map = self.read_map()?;
        Ok(map.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        // A corrupt file is replaced rather than blocking every future write.
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Store file is corrupt, starting from an empty store"
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)?;
        tracing::debug!(path = %self.path.display(), key, "Persisted store item");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> (PathBuf, FileStore) {
        let dir = std::env::temp_dir().join(format!("newsdesk_file_store_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let store = FileStore::new(dir.join("store.json"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let (dir, store) = temp_store("missing");
        assert_eq!(store.get_item("newsSettings").unwrap(), None);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_then_get() {
        let (dir, store) = temp_store("set_get");
        store.set_item("a", "1").unwrap();
        store.set_item("b", "2").unwrap();
        store.set_item("a", "3").unwrap();

        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("3"));
        assert_eq!(store.get_item("b").unwrap().as_deref(), Some("2"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_values_survive_new_instance() {
        let (dir, store) = temp_store("reopen");
        store.set_item("k", "v").unwrap();
        let path = store.path().to_path_buf();
        drop(store);

        let reopened = FileStore::new(path);
        assert_eq!(reopened.get_item("k").unwrap().as_deref(), Some("v"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_file_errors_on_read_and_is_replaced_on_write() {
        let (dir, store) = temp_store("corrupt");
        std::fs::write(store.path(), "not json {{").unwrap();

        assert!(matches!(
            store.get_item("k"),
            Err(StorageError::Corrupt(_))
        ));

        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let (dir, store) = temp_store("no_temp");
        store.set_item("k", "v").unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains("tmp"))
            .collect();
        assert!(leftovers.is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_creates_parent_directory() {
        let (dir, _) = temp_store("parent");
        let store = FileStore::new(dir.join("nested").join("store.json"));
        store.set_item("k", "v").unwrap();
        assert!(store.path().exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
