//! OS Keychain storage backend
//!
//! Uses the system keychain for secure storage:
//! - macOS: Keychain
//! - Windows: Credential Manager (DPAPI)
//! - Linux: Secret Service (GNOME Keyring, KWallet)

use keyring::Entry;
use tracing::debug;

use super::KeyStore;
use crate::error::{CipherError, Result};

/// Default service name used for keychain entries
pub const DEFAULT_SERVICE: &str = "charlotte-cipher";

/// OS Keychain storage backend
pub struct KeychainStore {
    /// Keychain service the entries are filed under
    service: String,
}

impl KeychainStore {
    /// Create a keychain store filing entries under `service`
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Get a keyring entry for a label
    fn get_entry(&self, label: &str) -> Result<Entry> {
        Entry::new(&self.service, label).map_err(|e| CipherError::KeychainError(e.to_string()))
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

impl Default for KeychainStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

impl KeyStore for KeychainStore {
    fn store(&self, label: &str, value: &[u8]) -> Result<()> {
        // Keychains store strings; encoded keys are always ASCII
        let value = std::str::from_utf8(value)
            .map_err(|e| CipherError::KeyStorageError(format!("value is not text: {}", e)))?;

        self.get_entry(label)?
            .set_password(value)
            .map_err(|e| CipherError::KeychainError(e.to_string()))?;

        debug!("Stored key in keychain: {}", label);
        Ok(())
    }

    fn retrieve(&self, label: &str) -> Result<Option<Vec<u8>>> {
        match self.get_entry(label)?.get_password() {
            Ok(value) => {
                debug!("Retrieved key from keychain: {}", label);
                Ok(Some(value.into_bytes()))
            }
            Err(keyring::Error::NoEntry) => {
                debug!("Key not found in keychain: {}", label);
                Ok(None)
            }
            Err(e) => Err(CipherError::KeychainError(e.to_string())),
        }
    }

    fn delete(&self, label: &str) -> Result<()> {
        match self.get_entry(label)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CipherError::KeychainError(e.to_string())),
        }
    }

    fn backend_name(&self) -> &'static str {
        #[cfg(target_os = "macos")]
        return "macOS Keychain";

        #[cfg(target_os = "windows")]
        return "Windows Credential Manager";

        #[cfg(target_os = "linux")]
        return "Linux Secret Service";

        #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
        return "System Keychain";
    }
}
