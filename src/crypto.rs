//! Envelope encryption for merchant secret keys stored in the settings table.
//!
//! Ciphertexts are `enc:v1:` followed by base64(nonce || ciphertext). The
//! AES-256-GCM key is derived from the master key with HKDF-SHA256 so the raw
//! master key is never used directly.

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;

use crate::error::{AppError, Result};

const CIPHERTEXT_PREFIX: &str = "enc:v1:";
const HKDF_SALT: &[u8] = b"payhand-master-key-v1";
const SETTINGS_INFO: &[u8] = b"merchant-settings";
const NONCE_LEN: usize = 12;

#[derive(Clone)]
pub struct MasterKey {
    key: [u8; 32],
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey([redacted])")
    }
}

impl MasterKey {
    /// Parse a base64-encoded 32-byte master key.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AppError::Configuration("master key is not valid base64".into()))?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AppError::Configuration("master key must be 32 bytes".into()))?;
        Ok(Self { key })
    }

    /// Fresh random key, base64-encoded. Used by `payhand gen-master-key`
    /// and for ephemeral dev-mode keys.
    pub fn generate_base64() -> String {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        STANDARD.encode(key)
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), &self.key);
        let mut okm = [0u8; 32];
        hk.expand(SETTINGS_INFO, &mut okm)
            .map_err(|_| AppError::Internal("key derivation failed".into()))?;
        Ok(Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&okm)))
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let cipher = self.cipher()?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| AppError::Internal("encryption failed".into()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(format!("{}{}", CIPHERTEXT_PREFIX, STANDARD.encode(out)))
    }

    pub fn decrypt(&self, stored: &str) -> Result<String> {
        let encoded = stored
            .strip_prefix(CIPHERTEXT_PREFIX)
            .ok_or_else(|| AppError::Internal("stored secret is not encrypted".into()))?;
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|_| AppError::Internal("stored secret is corrupt".into()))?;
        if bytes.len() <= NONCE_LEN {
            return Err(AppError::Internal("stored secret is corrupt".into()));
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher()?
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                AppError::Configuration("stored secret cannot be decrypted with this master key".into())
            })?;

        String::from_utf8(plaintext)
            .map_err(|_| AppError::Internal("stored secret is not UTF-8".into()))
    }
}
