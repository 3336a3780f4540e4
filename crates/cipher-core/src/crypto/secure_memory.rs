//! Secure memory handling with automatic zeroization

use zeroize::{Zeroize, ZeroizeOnDrop};

/// URL-safe base64 text of a 32-byte derived key - zeroed when dropped
///
/// This is the only form of the key that encryption and decryption accept.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EncodedKey {
    value: String,
}

impl EncodedKey {
    /// Wrap an already-encoded key
    pub fn new(value: String) -> Self {
        Self { value }
    }

    /// Get the key text (use carefully - avoid copying)
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Consume and return the inner text
    pub fn into_inner(mut self) -> String {
        std::mem::take(&mut self.value)
    }
}

impl From<String> for EncodedKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for EncodedKey {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl AsRef<str> for EncodedKey {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Debug for EncodedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedKey")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Caller-supplied passphrase - zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Passphrase {
    value: String,
}

impl Passphrase {
    /// Create a new passphrase
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Get the passphrase (use carefully)
    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Passphrase")
            .field("value", &"[REDACTED]")
            .finish()
    }
}
