//! Persisted key-value storage.
//!
//! The storefront keeps exactly two entries, both JSON encoded:
//! - [`keys::USER`] - the logged-in user, written on explicit login
//! - [`keys::CART`] - the cart line items, written after every cart mutation
//!
//! [`KeyValueStore`] abstracts over the backing medium: [`MemoryStore`] for
//! tests and embedded front ends, [`FileStore`] for the CLI.

mod file;
mod memory;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Keys used in the persisted store.
pub mod keys {
    /// JSON-serialized session user.
    pub const USER: &str = "_digi_user";

    /// JSON-serialized array of cart line items.
    pub const CART: &str = "_digi_cart";
}

/// Errors raised by the persisted store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A stored value could not be encoded or decoded.
    #[error("stored value for key {key} is not valid JSON: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The key cannot be used as a storage entry name.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// A string key-value store with browser local-storage semantics.
///
/// Removing an absent key is not an error.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key` entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared handle to the persisted store.
pub type Storage = Arc<dyn KeyValueStore>;

/// Read and decode a JSON value.
///
/// # Errors
///
/// Returns an error if the value cannot be read or is not valid JSON for `T`.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    store
        .get(key)?
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|source| StorageError::Json {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
}

/// Encode and store a JSON value.
///
/// # Errors
///
/// Returns an error if encoding fails or the store cannot be written.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Json {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        write_json(&store, keys::CART, &vec![1, 2, 3]).unwrap();

        assert_eq!(store.get(keys::CART).unwrap().as_deref(), Some("[1,2,3]"));
        let decoded: Option<Vec<u32>> = read_json(&store, keys::CART).unwrap();
        assert_eq!(decoded, Some(vec![1, 2, 3]));

        let missing: Option<Vec<u32>> = read_json(&store, keys::USER).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_read_json_reports_corrupt_values() {
        let store = MemoryStore::new();
        store.set(keys::USER, "{not json").unwrap();

        let err = read_json::<serde_json::Value>(&store, keys::USER).unwrap_err();
        assert!(matches!(err, StorageError::Json { ref key, .. } if key == keys::USER));
    }
}
