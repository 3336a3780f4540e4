//! Cryptographic primitives for passphrase-protected strings
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA512 key derivation with fresh 128-byte salts
//! - Double-wrapped Fernet authenticated encryption
//! - Secure memory handling with zeroize

mod encryption;
mod key_derivation;
mod secure_memory;

pub use encryption::{
    decrypt, decrypt_bytes, decrypt_with_ttl, encrypt, encrypt_bytes, sealed_len,
};
pub use key_derivation::{
    decode_key, derive_key, derive_key_with_salt, DerivedKey, KdfPolicy, Salt, KEY_LEN,
    MIN_ITERATIONS, SALT_LEN,
};
pub use secure_memory::{EncodedKey, Passphrase};
