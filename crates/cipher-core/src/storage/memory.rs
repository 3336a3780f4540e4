//! In-memory storage backend and closure adapter

use std::collections::HashMap;
use std::sync::RwLock;

use zeroize::Zeroize;

use super::KeyStore;
use crate::error::{CipherError, Result};

/// In-process map of label -> value; contents are zeroed when replaced or dropped
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> CipherError {
    CipherError::KeyStorageError("memory store lock poisoned".to_string())
}

impl KeyStore for MemoryStore {
    fn store(&self, label: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        if let Some(mut old) = entries.insert(label.to_string(), value.to_vec()) {
            old.zeroize();
        }
        Ok(())
    }

    fn retrieve(&self, label: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(label).cloned())
    }

    fn delete(&self, label: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        if let Some(mut old) = entries.remove(label) {
            old.zeroize();
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "In-Memory"
    }
}

impl Drop for MemoryStore {
    fn drop(&mut self) {
        if let Ok(entries) = self.entries.get_mut() {
            entries.values_mut().for_each(|v| v.zeroize());
        }
    }
}

/// Adapts a plain `Fn(label, value)` callback into a write-only [`KeyStore`]
pub struct CallbackStore<F> {
    callback: F,
}

impl<F> CallbackStore<F>
where
    F: Fn(&str, &[u8]) -> Result<()> + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> KeyStore for CallbackStore<F>
where
    F: Fn(&str, &[u8]) -> Result<()> + Send + Sync,
{
    fn store(&self, label: &str, value: &[u8]) -> Result<()> {
        (self.callback)(label, value)
    }

    fn retrieve(&self, _label: &str) -> Result<Option<Vec<u8>>> {
        Err(CipherError::KeyStorageError(
            "callback store is write-only".to_string(),
        ))
    }

    fn delete(&self, _label: &str) -> Result<()> {
        Err(CipherError::KeyStorageError(
            "callback store is write-only".to_string(),
        ))
    }

    fn backend_name(&self) -> &'static str {
        "Callback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.store("a", b"one").unwrap();
        store.store("a", b"two").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.retrieve("a").unwrap(), Some(b"two".to_vec()));

        store.delete("a").unwrap();
        assert_eq!(store.retrieve("a").unwrap(), None);
    }

    #[test]
    fn test_callback_store_invokes_callback() {
        let seen = Mutex::new(Vec::new());
        let store = CallbackStore::new(|label: &str, value: &[u8]| {
            seen.lock().unwrap().push((label.to_string(), value.to_vec()));
            Ok(())
        });

        store.store("KEY", b"abc").unwrap();
        assert!(store.retrieve("KEY").is_err());
        assert_eq!(
            seen.into_inner().unwrap(),
            vec![("KEY".to_string(), b"abc".to_vec())]
        );
    }
}
