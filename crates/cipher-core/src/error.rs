//! Error types for cipher-core

use thiserror::Error;

/// Result type alias for cipher operations
pub type Result<T> = std::result::Result<T, CipherError>;

/// Broad category a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Producing a key from a passphrase (including handing it to the store)
    Derivation,
    /// Wrapping plaintext
    Encryption,
    /// Unwrapping ciphertext
    Decryption,
    /// Loading or validating settings
    Config,
}

/// Cipher error types
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("Passphrase must not be empty")]
    EmptyPassphrase,

    #[error("KDF policy too weak: {iterations} iterations (minimum {minimum})")]
    WeakKdfPolicy { iterations: u32, minimum: u32 },

    #[error("Entropy source failed: {0}")]
    EntropyError(String),

    #[error("Invalid salt: {0}")]
    InvalidSalt(String),

    #[error("Key storage failed: {0}")]
    KeyStorageError(String),

    #[error("Keychain error: {0}")]
    KeychainError(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    #[error("Authentication failed - wrong key, tampered data, or expired token")]
    AuthenticationFailed,

    #[error("Decrypted data is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    SettingsError(String),
}

impl CipherError {
    /// Category of this error
    ///
    /// `InvalidKey` is reported as an encryption failure; callers that hit it
    /// while decrypting know which operation they ran.
    pub fn stage(&self) -> Stage {
        match self {
            Self::EmptyPassphrase
            | Self::EntropyError(_)
            | Self::InvalidSalt(_)
            | Self::KeyStorageError(_)
            | Self::KeychainError(_) => Stage::Derivation,
            Self::InvalidKey(_) => Stage::Encryption,
            Self::MalformedCiphertext(_) | Self::AuthenticationFailed | Self::InvalidUtf8(_) => {
                Stage::Decryption
            }
            Self::WeakKdfPolicy { .. }
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::SettingsError(_) => Stage::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CipherError::WeakKdfPolicy {
            iterations: 1000,
            minimum: 100_000,
        };
        assert_eq!(
            err.to_string(),
            "KDF policy too weak: 1000 iterations (minimum 100000)"
        );
    }

    #[test]
    fn test_stage_mapping() {
        assert_eq!(CipherError::EmptyPassphrase.stage(), Stage::Derivation);
        assert_eq!(
            CipherError::KeyStorageError("x".into()).stage(),
            Stage::Derivation
        );
        assert_eq!(CipherError::InvalidKey("x".into()).stage(), Stage::Encryption);
        assert_eq!(CipherError::AuthenticationFailed.stage(), Stage::Decryption);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CipherError = io_err.into();
        assert!(matches!(err, CipherError::IoError(_)));
        assert_eq!(err.stage(), Stage::Config);
    }
}
