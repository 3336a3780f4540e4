//! Double-wrapped Fernet encryption
//!
//! Output format: a Fernet token whose payload is itself a Fernet token over
//! the plaintext, both under the same key. Each token is URL-safe base64 of
//! `0x80 | timestamp (8) | IV (16) | AES-128-CBC ciphertext | HMAC-SHA256 (32)`.
//!
//! Decryption removes the outer layer first, then the inner one.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use fernet::Fernet;
use tracing::debug;

use super::key_derivation::decode_key;
use crate::error::{CipherError, Result};

/// Fernet version byte
const TOKEN_VERSION: u8 = 0x80;

/// Version + timestamp + IV + HMAC
const TOKEN_OVERHEAD: usize = 1 + 8 + 16 + 32;

/// AES block size; CBC with PKCS#7 always adds at least one byte of padding
const BLOCK_LEN: usize = 16;

fn token_raw_len(payload_len: usize) -> usize {
    TOKEN_OVERHEAD + (payload_len / BLOCK_LEN + 1) * BLOCK_LEN
}

fn encoded_len(raw_len: usize) -> usize {
    raw_len.div_ceil(3) * 4
}

/// Exact text length of [`encrypt`] output for a plaintext of `plaintext_len` bytes
pub fn sealed_len(plaintext_len: usize) -> usize {
    let inner = encoded_len(token_raw_len(plaintext_len));
    encoded_len(token_raw_len(inner))
}

/// Build a Fernet instance from an encoded key
fn fernet_for(key: &str) -> Result<Fernet> {
    decode_key(key)?;
    Fernet::new(key).ok_or_else(|| CipherError::InvalidKey("rejected by Fernet".to_string()))
}

/// Check a token's framing before it reaches the MAC check
///
/// `URL_SAFE` decoding requires canonical padding and zero trailing bits, so
/// distinct token strings always decode to distinct bytes.
fn check_token(token: &str) -> Result<()> {
    let raw = URL_SAFE
        .decode(token)
        .map_err(|e| CipherError::MalformedCiphertext(format!("invalid token encoding: {}", e)))?;

    if raw.len() < token_raw_len(0) {
        return Err(CipherError::MalformedCiphertext(format!(
            "token too short: {} bytes",
            raw.len()
        )));
    }
    if raw[0] != TOKEN_VERSION {
        return Err(CipherError::MalformedCiphertext(format!(
            "unsupported token version: {:#04x}",
            raw[0]
        )));
    }
    Ok(())
}

fn open_layer(fernet: &Fernet, token: &str, ttl_secs: Option<u64>) -> Result<Vec<u8>> {
    check_token(token)?;
    let opened = match ttl_secs {
        Some(ttl) => fernet.decrypt_with_ttl(token, ttl),
        None => fernet.decrypt(token),
    };
    opened.map_err(|_| CipherError::AuthenticationFailed)
}

fn unwrap_layers(encrypted: &str, key: &str, ttl_secs: Option<u64>) -> Result<Vec<u8>> {
    let fernet = fernet_for(key)?;

    let inner = open_layer(&fernet, encrypted, ttl_secs)?;
    let inner = String::from_utf8(inner).map_err(|_| {
        CipherError::MalformedCiphertext("inner layer is not a token".to_string())
    })?;
    let plaintext = open_layer(&fernet, &inner, ttl_secs)?;

    debug!(len = plaintext.len(), "Unwrapped both layers");
    Ok(plaintext)
}

/// Encrypt raw bytes with two Fernet layers
///
/// # Arguments
/// * `plaintext` - The data to protect
/// * `key` - URL-safe base64 of a 32-byte key
///
/// # Returns
/// The outer token as text
///
/// # Panics
/// The `fernet` crate draws each IV with `getrandom` and panics if the OS
/// entropy source is unavailable; that failure cannot be reported as an error.
pub fn encrypt_bytes(plaintext: &[u8], key: &str) -> Result<String> {
    let fernet = fernet_for(key)?;

    let inner = fernet.encrypt(plaintext);
    let outer = fernet.encrypt(inner.as_bytes());

    debug!(len = plaintext.len(), "Wrapped plaintext in two layers");
    Ok(outer)
}

/// Encrypt a string with two Fernet layers
pub fn encrypt(message: &str, key: &str) -> Result<String> {
    encrypt_bytes(message.as_bytes(), key)
}

/// Remove both layers and return the raw plaintext
pub fn decrypt_bytes(encrypted: &str, key: &str) -> Result<Vec<u8>> {
    unwrap_layers(encrypted, key, None)
}

/// Remove both layers and return the plaintext as a string
pub fn decrypt(encrypted: &str, key: &str) -> Result<String> {
    into_text(decrypt_bytes(encrypted, key)?)
}

/// Like [`decrypt`], but rejects either layer if it is older than `ttl_secs`
pub fn decrypt_with_ttl(encrypted: &str, key: &str, ttl_secs: u64) -> Result<String> {
    into_text(unwrap_layers(encrypted, key, Some(ttl_secs))?)
}

fn into_text(plaintext: Vec<u8>) -> Result<String> {
    String::from_utf8(plaintext).map_err(|e| CipherError::InvalidUtf8(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> String {
        Fernet::generate_key()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = test_key();

        let encrypted = encrypt("sk-proj-abc123xyz789", &key).unwrap();
        let decrypted = decrypt(&encrypted, &key).unwrap();

        assert_eq!(decrypted, "sk-proj-abc123xyz789");
        assert_ne!(encrypted, "sk-proj-abc123xyz789");
    }

    #[test]
    fn test_empty_and_unicode_roundtrip() {
        let key = test_key();

        for message in ["", "héllo wörld ✓", "line\nbreak\ttab"] {
            let encrypted = encrypt(message, &key).unwrap();
            assert_eq!(decrypt(&encrypted, &key).unwrap(), message);
        }
    }

    #[test]
    fn test_bytes_roundtrip() {
        let key = test_key();
        let plaintext: Vec<u8> = (0..=255).collect();

        let encrypted = encrypt_bytes(&plaintext, &key).unwrap();
        assert_eq!(decrypt_bytes(&encrypted, &key).unwrap(), plaintext);
    }

    #[test]
    fn test_non_utf8_plaintext_reported() {
        let key = test_key();
        let encrypted = encrypt_bytes(&[0xff, 0xfe], &key).unwrap();

        assert!(matches!(
            decrypt(&encrypted, &key),
            Err(CipherError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_layers_unwrap_outer_first() {
        let key = test_key();
        let fernet = Fernet::new(&key).unwrap();

        let encrypted = encrypt("layered", &key).unwrap();

        // Outer layer holds the inner token, which holds the plaintext
        let inner = String::from_utf8(fernet.decrypt(&encrypted).unwrap()).unwrap();
        assert_eq!(fernet.decrypt(&inner).unwrap(), b"layered");
    }

    #[test]
    fn test_single_layer_token_rejected() {
        let key = test_key();
        let fernet = Fernet::new(&key).unwrap();

        let single = fernet.encrypt(b"only one layer");
        assert!(matches!(
            decrypt(&single, &key),
            Err(CipherError::MalformedCiphertext(_))
        ));
    }

    #[test]
    fn test_different_ciphertexts_each_call() {
        let key = test_key();

        let encrypted1 = encrypt("same plaintext", &key).unwrap();
        let encrypted2 = encrypt("same plaintext", &key).unwrap();

        // Random IVs on both layers
        assert_ne!(encrypted1, encrypted2);
    }

    #[test]
    fn test_wrong_key_fails_decryption() {
        let key1 = test_key();
        let key2 = test_key();

        let encrypted = encrypt("secret data", &key1).unwrap();
        let result = decrypt(&encrypted, &key2);

        assert!(matches!(result, Err(CipherError::AuthenticationFailed)));
    }

    #[test]
    fn test_tampering_any_byte_fails_decryption() {
        let key = test_key();
        let encrypted = encrypt("hello world", &key).unwrap();

        for i in 0..encrypted.len() {
            let mut bytes = encrypted.clone().into_bytes();
            bytes[i] ^= 0x01;
            let tampered = String::from_utf8(bytes).unwrap();

            assert!(
                decrypt(&tampered, &key).is_err(),
                "tampering at byte {} went undetected",
                i
            );
        }
    }

    #[test]
    fn test_truncated_ciphertext_fails() {
        let key = test_key();
        let encrypted = encrypt("hello world", &key).unwrap();

        assert!(decrypt(&encrypted[..encrypted.len() - 4], &key).is_err());
        assert!(matches!(
            decrypt("", &key),
            Err(CipherError::MalformedCiphertext(_))
        ));
        assert!(matches!(
            decrypt("gAAAAA==", &key),
            Err(CipherError::MalformedCiphertext(_))
        ));
    }

    #[test]
    fn test_malformed_key_fails() {
        assert!(matches!(
            encrypt("message", "not-a-valid-key"),
            Err(CipherError::InvalidKey(_))
        ));
        assert!(matches!(
            decrypt("anything", "not-a-valid-key"),
            Err(CipherError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_sealed_len_matches_output() {
        let key = test_key();

        for len in [0, 1, 11, 15, 16, 17, 100] {
            let message = "x".repeat(len);
            let encrypted = encrypt(&message, &key).unwrap();
            assert_eq!(encrypted.len(), sealed_len(len), "plaintext length {}", len);
        }
        assert_eq!(sealed_len(11), 228);
    }

    #[test]
    fn test_ttl_accepts_fresh_token() {
        let key = test_key();
        let encrypted = encrypt("fresh", &key).unwrap();

        assert_eq!(decrypt_with_ttl(&encrypted, &key, 60).unwrap(), "fresh");
    }

    /// Outer layer stamped now, inner layer stamped `age_secs` ago
    fn stale_inner_token(key: &str, message: &str, age_secs: u64) -> String {
        let fernet = Fernet::new(key).unwrap();
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let inner = fernet.encrypt_at_time(message.as_bytes(), now - age_secs);
        fernet.encrypt(inner.as_bytes())
    }

    #[test]
    fn test_ttl_rejects_expired_token() {
        let key = test_key();
        let fernet = Fernet::new(&key).unwrap();
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let inner = fernet.encrypt_at_time(b"old", now - 10_000);
        let outer = fernet.encrypt_at_time(inner.as_bytes(), now - 10_000);

        assert!(matches!(
            decrypt_with_ttl(&outer, &key, 60),
            Err(CipherError::AuthenticationFailed)
        ));
        assert_eq!(decrypt(&outer, &key).unwrap(), "old");
    }

    #[test]
    fn test_ttl_rejects_stale_inner_layer() {
        let key = test_key();
        let outer = stale_inner_token(&key, "old", 10_000);

        assert!(matches!(
            decrypt_with_ttl(&outer, &key, 60),
            Err(CipherError::AuthenticationFailed)
        ));
        assert_eq!(decrypt(&outer, &key).unwrap(), "old");
    }
}
