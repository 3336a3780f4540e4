//! Cipher settings management
//!
//! Stores non-sensitive configuration in a plain JSON file. Nothing here is
//! secret: no keys, salts or passphrases are ever written by this module.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::crypto::KdfPolicy;
use crate::error::{CipherError, Result};
use crate::storage::DEFAULT_SERVICE;

/// Label used when a key is derived without one
pub const DEFAULT_KEY_LABEL: &str = "ADMIN_USER_KEY";

const SETTINGS_VERSION: u32 = 1;

/// Cipher settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CipherSettings {
    /// Settings file version
    pub version: u32,
    /// PBKDF2 iteration policy
    pub kdf: KdfPolicy,
    /// Label used when `keygen` is called with an empty one
    pub default_key_label: String,
    /// Keychain service name for [`crate::storage::KeychainStore`]
    pub keychain_service: String,
    /// Reject ciphertext older than this many seconds (None = no limit)
    pub token_ttl_secs: Option<u64>,
}

impl Default for CipherSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            kdf: KdfPolicy::default(),
            default_key_label: DEFAULT_KEY_LABEL.to_string(),
            keychain_service: DEFAULT_SERVICE.to_string(),
            token_ttl_secs: None,
        }
    }
}

impl CipherSettings {
    /// Check the settings are usable
    pub fn validate(&self) -> Result<()> {
        self.kdf.validate()?;
        if self.default_key_label.is_empty() {
            return Err(CipherError::SettingsError(
                "defaultKeyLabel must not be empty".to_string(),
            ));
        }
        if self.token_ttl_secs == Some(0) {
            return Err(CipherError::SettingsError(
                "tokenTtlSecs must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the label a key is stored under
    pub fn resolve_label<'a>(&'a self, label: &'a str) -> &'a str {
        if label.is_empty() {
            &self.default_key_label
        } else {
            label
        }
    }
}

/// Settings manager
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: CipherSettings,
}

impl SettingsManager {
    /// Load settings from `storage_dir/settings.json`, falling back to defaults
    /// if the file is missing
    pub fn new(storage_dir: &Path) -> Result<Self> {
        let settings_file = storage_dir.join("settings.json");
        let settings = Self::load_from_file(&settings_file)?;

        Ok(Self {
            settings_file,
            settings,
        })
    }

    /// Open the settings in the platform config directory
    pub fn open_default() -> Result<Self> {
        Self::new(&Self::default_dir()?)
    }

    /// Get the default settings directory
    pub fn default_dir() -> Result<PathBuf> {
        ProjectDirs::from("com", "charlotte", "cipher")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| {
                CipherError::SettingsError("Could not determine config directory".to_string())
            })
    }

    /// Load settings from file
    fn load_from_file(path: &Path) -> Result<CipherSettings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(CipherSettings::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: CipherSettings = serde_json::from_str(&contents)?;
        settings.validate()?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self) -> Result<()> {
        self.settings.validate()?;
        let contents = serde_json::to_string_pretty(&self.settings)?;

        if let Some(dir) = self.settings_file.parent() {
            std::fs::create_dir_all(dir)?;
        }

        // Write atomically using temp file
        let temp_path = self.settings_file.with_extension("tmp");
        std::fs::write(&temp_path, &contents)?;
        std::fs::rename(&temp_path, &self.settings_file)?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &CipherSettings {
        &self.settings
    }

    /// Get mutable settings
    pub fn get_mut(&mut self) -> &mut CipherSettings {
        &mut self.settings
    }

    /// Update settings and save
    pub fn update(&mut self, settings: CipherSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.save()
    }

    /// Raise the iteration count and save; lowering below the floor fails
    pub fn set_kdf_iterations(&mut self, iterations: u32) -> Result<()> {
        self.settings.kdf = KdfPolicy::new(iterations)?;
        self.save()
    }

    /// Reset settings to defaults and delete settings file
    pub fn reset(&mut self) -> Result<()> {
        self.settings = CipherSettings::default();

        if self.settings_file.exists() {
            std::fs::remove_file(&self.settings_file)?;
        }

        Ok(())
    }

    /// Consume the manager, keeping only the settings
    pub fn into_settings(self) -> CipherSettings {
        self.settings
    }
}
