//! Key-value persistence for client-side state.
//!
//! The reader persists a handful of string values under well-known keys
//! (currently only `newsSettings`). [`FileStore`] keeps them in a single JSON
//! object on disk; [`MemoryStore`] is the in-process equivalent used by tests
//! and by `--ephemeral` runs.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Errors surfaced by a [`KeyValueStore`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a JSON object of strings.
    #[error("Storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Storage file too large ({size} bytes, max {max})")]
    TooLarge { size: u64, max: u64 },
}

/// A string-keyed, string-valued store with last-writer-wins semantics.
///
/// Reads and writes are synchronous and atomic from the caller's point of view.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key was never written.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
