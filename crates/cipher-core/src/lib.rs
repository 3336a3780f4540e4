//! # cipher-core
//!
//! Protect short strings with a passphrase:
//! - PBKDF2-HMAC-SHA512 key derivation with fresh 128-byte salts
//! - Double-wrapped Fernet authenticated encryption
//! - Pluggable key storage (OS keychain, environment, memory, callback)
//! - Failure reporting for callers that want `Option` instead of `Result`
//!
//! ```no_run
//! use cipher_core::{Cipher, MemoryStore};
//!
//! let cipher = Cipher::new(MemoryStore::new());
//! let key = cipher.keygen("APP_KEY", "correct horse battery staple", true).unwrap();
//! let sealed = cipher.encrypt("hello world", key.as_str()).unwrap();
//! assert_eq!(cipher.decrypt(&sealed, key.as_str()).unwrap(), "hello world");
//! ```

pub mod crypto;
pub mod error;
pub mod report;
pub mod settings;
pub mod storage;
mod cipher;

pub use cipher::Cipher;
pub use crypto::{
    decrypt, derive_key, derive_key_with_salt, encrypt, DerivedKey, EncodedKey, KdfPolicy,
    Passphrase, Salt,
};
pub use error::{CipherError, Result, Stage};
pub use report::{ErrorReporter, Failure, Operation, TracingReporter};
pub use settings::{CipherSettings, SettingsManager, DEFAULT_KEY_LABEL};
pub use storage::{CallbackStore, EnvStore, KeyStore, KeychainStore, MemoryStore};
