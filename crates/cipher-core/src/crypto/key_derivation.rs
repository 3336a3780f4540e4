//! Password-based key derivation using PBKDF2-HMAC-SHA512

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use tracing::debug;
use zeroize::Zeroizing;

use super::{EncodedKey, Passphrase};
use crate::error::{CipherError, Result};

/// Length of the random salt in bytes
pub const SALT_LEN: usize = 128;

/// Length of the derived key in bytes (a Fernet key)
pub const KEY_LEN: usize = 32;

/// Iteration floor; no policy may go below this
pub const MIN_ITERATIONS: u32 = 100_000;

/// Iteration policy for PBKDF2
///
/// The count is configuration, never a per-call argument. Policies loaded
/// from disk are re-checked before every derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdfPolicy {
    pub iterations: u32,
}

impl Default for KdfPolicy {
    fn default() -> Self {
        Self {
            iterations: MIN_ITERATIONS,
        }
    }
}

impl KdfPolicy {
    /// Create a policy, rejecting counts below [`MIN_ITERATIONS`]
    pub fn new(iterations: u32) -> Result<Self> {
        let policy = Self { iterations };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations < MIN_ITERATIONS {
            return Err(CipherError::WeakKdfPolicy {
                iterations: self.iterations,
                minimum: MIN_ITERATIONS,
            });
        }
        Ok(())
    }
}

/// Random salt mixed into every derivation
#[derive(Clone, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Draw a fresh salt from the OS CSPRNG
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CipherError::EntropyError(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }

    /// Standard base64 text of the salt
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Parse a salt previously produced by [`Salt::to_base64`]
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| CipherError::InvalidSalt(e.to_string()))?;
        let bytes: [u8; SALT_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            CipherError::InvalidSalt(format!(
                "expected {} bytes, got {}",
                SALT_LEN,
                b.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Salt").field(&self.to_base64()).finish()
    }
}

/// Output of a derivation: the encoded key plus what produced it
///
/// Only `key` is handed to a key store. The salt is kept so callers that
/// want passphrase-based re-derivation can persist it themselves.
#[derive(Debug, Clone)]
pub struct DerivedKey {
    pub key: EncodedKey,
    pub salt: Salt,
    pub iterations: u32,
}

/// Derive a key from a passphrase with a freshly generated salt
///
/// Two calls with the same passphrase produce different keys.
pub fn derive_key(passphrase: &Passphrase, policy: &KdfPolicy) -> Result<DerivedKey> {
    let salt = Salt::generate()?;
    derive_key_with_salt(passphrase, &salt, policy)
}

/// Derive a key deterministically from a passphrase and a known salt
///
/// # Returns
/// The 32-byte PBKDF2-HMAC-SHA512 output, URL-safe base64 encoded
pub fn derive_key_with_salt(
    passphrase: &Passphrase,
    salt: &Salt,
    policy: &KdfPolicy,
) -> Result<DerivedKey> {
    if passphrase.is_empty() {
        return Err(CipherError::EmptyPassphrase);
    }
    policy.validate()?;

    let mut raw = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha512>(
        passphrase.expose().as_bytes(),
        salt.as_bytes(),
        policy.iterations,
        &mut raw[..],
    );

    let key = EncodedKey::new(URL_SAFE.encode(&raw[..]));
    debug!(iterations = policy.iterations, "Derived key from passphrase");

    Ok(DerivedKey {
        key,
        salt: salt.clone(),
        iterations: policy.iterations,
    })
}

/// Decode an encoded key back to its raw bytes, checking the length
pub fn decode_key(key: &str) -> Result<Zeroizing<Vec<u8>>> {
    let raw = Zeroizing::new(
        URL_SAFE
            .decode(key)
            .map_err(|e| CipherError::InvalidKey(format!("not URL-safe base64: {}", e)))?,
    );
    if raw.len() != KEY_LEN {
        return Err(CipherError::InvalidKey(format!(
            "expected {} bytes, got {}",
            KEY_LEN,
            raw.len()
        )));
    }
    Ok(raw)
}
