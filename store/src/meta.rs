//! Metadata storage trait.

use crate::StoreError;

/// Generic key-value store for internal bookkeeping (replay checkpoint,
/// schema version) that doesn't belong in any domain-specific store.
pub trait MetaStore {
    /// Store a metadata value.
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Retrieve a metadata value; `Ok(None)` when the key was never written.
    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Delete a metadata entry.
    fn delete_meta(&self, key: &str) -> Result<(), StoreError>;
}
