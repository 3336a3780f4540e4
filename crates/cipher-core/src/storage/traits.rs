//! Storage trait definitions

use crate::error::Result;

/// Trait for key storage backends
///
/// Derivation calls [`KeyStore::store`] exactly once per key and never reads
/// back; the other methods are for the embedding application.
pub trait KeyStore: Send + Sync {
    /// Store a value under the given label
    fn store(&self, label: &str, value: &[u8]) -> Result<()>;

    /// Retrieve a value by label
    fn retrieve(&self, label: &str) -> Result<Option<Vec<u8>>>;

    /// Delete a value by label
    fn delete(&self, label: &str) -> Result<()>;

    /// Get a human-readable name for this storage backend
    fn backend_name(&self) -> &'static str;
}

impl<S: KeyStore + ?Sized> KeyStore for &S {
    fn store(&self, label: &str, value: &[u8]) -> Result<()> {
        (**self).store(label, value)
    }

    fn retrieve(&self, label: &str) -> Result<Option<Vec<u8>>> {
        (**self).retrieve(label)
    }

    fn delete(&self, label: &str) -> Result<()> {
        (**self).delete(label)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
