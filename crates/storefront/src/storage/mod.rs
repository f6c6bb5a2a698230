//! Local key-value persistence.
//!
//! The storefront keeps a handful of values (the cart, the bearer token) in
//! a small browser-style key-value store. [`KeyValueStore`] is the port;
//! [`FileStore`] keeps one file per key on disk and [`MemoryStore`] keeps
//! everything in a map for tests and throwaway sessions.
//!
//! Writes are synchronous and replace the previous value wholesale. There is
//! no cross-process coordination: the last writer wins.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Keys under which the storefront persists its state.
pub mod keys {
    /// Serialized cart (JSON array of lines).
    pub const CART: &str = "cart";

    /// Bearer token from the last successful login.
    pub const TOKEN: &str = "token";
}

/// Errors from a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Value could not be serialized.
    #[error("failed to serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Key contains characters that cannot be used as a file name.
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

/// A synchronous string key-value store.
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}
