//! Passphrase cipher orchestration
//!
//! Ties settings, a key store and an error reporter to the three operations.
//! Every operation comes in two forms:
//! - `try_*` returns a [`Result`] carrying the failure
//! - the plain form reports the failure and returns `None`, so "failed" and
//!   "no key requested" look the same to callers of `keygen`

use std::panic::Location;

use tracing::info;

use crate::crypto::{self, derive_key, DerivedKey, EncodedKey, Passphrase};
use crate::error::Result;
use crate::report::{ErrorReporter, Failure, Operation, TracingReporter};
use crate::settings::CipherSettings;
use crate::storage::{KeyStore, KeychainStore};

/// Passphrase cipher bound to a key store and an error reporter
pub struct Cipher<S, R = TracingReporter> {
    settings: CipherSettings,
    store: S,
    reporter: R,
}

impl<S: KeyStore> Cipher<S, TracingReporter> {
    /// Create a cipher with default settings
    pub fn new(store: S) -> Self {
        Self {
            settings: CipherSettings::default(),
            store,
            reporter: TracingReporter,
        }
    }

    /// Create a cipher with custom settings, rejecting unusable ones
    pub fn with_settings(settings: CipherSettings, store: S) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            store,
            reporter: TracingReporter,
        })
    }
}

impl Cipher<KeychainStore, TracingReporter> {
    /// Create a cipher that stores keys in the OS keychain under the
    /// configured service name
    pub fn keychain(settings: CipherSettings) -> Result<Self> {
        let store = KeychainStore::new(settings.keychain_service.clone());
        Self::with_settings(settings, store)
    }
}

impl<S: KeyStore, R: ErrorReporter> Cipher<S, R> {
    /// Swap the error reporter
    pub fn with_reporter<R2: ErrorReporter>(self, reporter: R2) -> Cipher<S, R2> {
        Cipher {
            settings: self.settings,
            store: self.store,
            reporter,
        }
    }

    pub fn settings(&self) -> &CipherSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Derive a key from `passphrase` with a fresh salt and store it under
    /// `label` (or the default label when empty)
    pub fn try_keygen(&self, label: &str, passphrase: &str) -> Result<DerivedKey> {
        let passphrase = Passphrase::new(passphrase);
        let derived = derive_key(&passphrase, &self.settings.kdf)?;

        let label = self.settings.resolve_label(label);
        self.store.store(label, derived.key.as_str().as_bytes())?;

        info!(
            label,
            backend = self.store.backend_name(),
            "Derived and stored key"
        );
        Ok(derived)
    }

    /// Derive and store a key, returning it only when `return_key` is set
    #[track_caller]
    pub fn keygen(&self, label: &str, passphrase: &str, return_key: bool) -> Option<EncodedKey> {
        let location = Location::caller();
        let result = self.try_keygen(label, passphrase);
        let derived = self.reported(Operation::Keygen, location, result)?;
        return_key.then_some(derived.key)
    }

    /// Double-wrap `message` under `key`
    pub fn try_encrypt(&self, message: &str, key: &str) -> Result<String> {
        crypto::encrypt(message, key)
    }

    #[track_caller]
    pub fn encrypt(&self, message: &str, key: &str) -> Option<String> {
        let location = Location::caller();
        self.reported(Operation::Encrypt, location, self.try_encrypt(message, key))
    }

    /// Unwrap both layers of `encrypted_text`, honouring the configured TTL
    pub fn try_decrypt(&self, encrypted_text: &str, key: &str) -> Result<String> {
        match self.settings.token_ttl_secs {
            Some(ttl) => crypto::decrypt_with_ttl(encrypted_text, key, ttl),
            None => crypto::decrypt(encrypted_text, key),
        }
    }

    #[track_caller]
    pub fn decrypt(&self, encrypted_text: &str, key: &str) -> Option<String> {
        let location = Location::caller();
        self.reported(Operation::Decrypt, location, self.try_decrypt(encrypted_text, key))
    }

    fn reported<T>(
        &self,
        operation: Operation,
        location: &'static Location<'static>,
        result: Result<T>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.reporter.report(&Failure {
                    operation,
                    error: &error,
                    location,
                });
                None
            }
        }
    }
}
