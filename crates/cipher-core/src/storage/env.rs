//! Process environment storage backend
//!
//! Keeps keys in environment variables of the current process, so child
//! processes spawned afterwards inherit them.

use tracing::debug;

use super::KeyStore;
use crate::error::{CipherError, Result};

/// Environment variable storage backend
#[derive(Debug, Default)]
pub struct EnvStore {
    /// Prefix prepended to every variable name
    prefix: String,
}

impl EnvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespace all variables under `prefix` (e.g. `MYAPP_`)
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, label: &str) -> Result<String> {
        let name = format!("{}{}", self.prefix, label);
        if name.is_empty() || name.contains('=') || name.contains('\0') {
            return Err(CipherError::KeyStorageError(format!(
                "invalid environment variable name: {:?}",
                name
            )));
        }
        Ok(name)
    }
}

impl KeyStore for EnvStore {
    fn store(&self, label: &str, value: &[u8]) -> Result<()> {
        let name = self.var_name(label)?;
        let value = std::str::from_utf8(value)
            .map_err(|e| CipherError::KeyStorageError(format!("value is not text: {}", e)))?;
        if value.contains('\0') {
            return Err(CipherError::KeyStorageError(
                "value contains a NUL byte".to_string(),
            ));
        }

        std::env::set_var(&name, value);
        debug!("Stored key in environment: {}", name);
        Ok(())
    }

    fn retrieve(&self, label: &str) -> Result<Option<Vec<u8>>> {
        let name = self.var_name(label)?;
        match std::env::var(&name) {
            Ok(value) => Ok(Some(value.into_bytes())),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(CipherError::KeyStorageError(e.to_string())),
        }
    }

    fn delete(&self, label: &str) -> Result<()> {
        std::env::remove_var(self.var_name(label)?);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Process Environment"
    }
}
