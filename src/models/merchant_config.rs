use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::error::{AppError, Result};
use crate::util::mask_secret;

/// Merchant-configured gateway settings.
///
/// Exactly one key pair is active at a time, chosen by `test_mode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantConfig {
    pub enabled: bool,
    pub test_mode: bool,
    pub live_secret_key: String,
    pub live_public_key: String,
    pub test_secret_key: String,
    pub test_public_key: String,
}

impl Default for MerchantConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            test_mode: true,
            live_secret_key: String::new(),
            live_public_key: String::new(),
            test_secret_key: String::new(),
            test_public_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CredentialMode {
    Test,
    Live,
}

/// The active key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub secret_key: String,
    pub public_key: String,
    pub mode: CredentialMode,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("secret_key", &mask_secret(&self.secret_key))
            .field("public_key", &self.public_key)
            .field("mode", &self.mode)
            .finish()
    }
}

impl MerchantConfig {
    pub fn mode(&self) -> CredentialMode {
        if self.test_mode {
            CredentialMode::Test
        } else {
            CredentialMode::Live
        }
    }

    /// Select the key pair for the current mode.
    ///
    /// Does not look at `enabled`; callers check that first and never reach
    /// the provider for a disabled gateway.
    pub fn resolve_credentials(&self) -> Result<Credentials> {
        let mode = self.mode();
        let (secret_key, public_key) = match mode {
            CredentialMode::Test => (&self.test_secret_key, &self.test_public_key),
            CredentialMode::Live => (&self.live_secret_key, &self.live_public_key),
        };

        if secret_key.trim().is_empty() || public_key.trim().is_empty() {
            return Err(AppError::Configuration(format!(
                "missing credentials for {} mode",
                mode
            )));
        }

        Ok(Credentials {
            secret_key: secret_key.trim().to_string(),
            public_key: public_key.trim().to_string(),
            mode,
        })
    }

    pub fn apply(&mut self, update: UpdateMerchantConfig) {
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        if let Some(test_mode) = update.test_mode {
            self.test_mode = test_mode;
        }
        if let Some(key) = update.live_secret_key {
            self.live_secret_key = key;
        }
        if let Some(key) = update.live_public_key {
            self.live_public_key = key;
        }
        if let Some(key) = update.test_secret_key {
            self.test_secret_key = key;
        }
        if let Some(key) = update.test_public_key {
            self.test_public_key = key;
        }
    }

    /// Settings view for the admin API: secret keys are masked.
    pub fn masked(&self) -> MaskedMerchantConfig {
        MaskedMerchantConfig {
            enabled: self.enabled,
            test_mode: self.test_mode,
            active_mode: self.mode(),
            live_secret_key: mask_secret(&self.live_secret_key),
            live_public_key: self.live_public_key.clone(),
            test_secret_key: mask_secret(&self.test_secret_key),
            test_public_key: self.test_public_key.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMerchantConfig {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub test_mode: Option<bool>,
    #[serde(default)]
    pub live_secret_key: Option<String>,
    #[serde(default)]
    pub live_public_key: Option<String>,
    #[serde(default)]
    pub test_secret_key: Option<String>,
    #[serde(default)]
    pub test_public_key: Option<String>,
}

impl UpdateMerchantConfig {
    /// Names of the fields this update touches, for the audit log.
    /// Key values themselves are never logged.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.enabled.is_some() {
            fields.push("enabled");
        }
        if self.test_mode.is_some() {
            fields.push("test_mode");
        }
        if self.live_secret_key.is_some() {
            fields.push("live_secret_key");
        }
        if self.live_public_key.is_some() {
            fields.push("live_public_key");
        }
        if self.test_secret_key.is_some() {
            fields.push("test_secret_key");
        }
        if self.test_public_key.is_some() {
            fields.push("test_public_key");
        }
        fields
    }
}

#[derive(Debug, Serialize)]
pub struct MaskedMerchantConfig {
    pub enabled: bool,
    pub test_mode: bool,
    pub active_mode: CredentialMode,
    pub live_secret_key: Option<String>,
    pub live_public_key: String,
    pub test_secret_key: Option<String>,
    pub test_public_key: String,
}
