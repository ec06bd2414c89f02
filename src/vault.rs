//! Client-side encryption for vault entries.
//!
//! A per-entry random salt feeds PBKDF2-HMAC-SHA256 to derive an AES-256-GCM
//! key from the user's key; each entry also gets a fresh 96-bit IV. All
//! binary values travel as standard base64.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::strength::CharClasses;

pub const PBKDF2_ITERATIONS: u32 = 100_000;
pub const SALT_LEN: usize = 32;
pub const IV_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

pub const MIN_USER_KEY_CHARS: usize = 8;
pub const MAX_USER_KEY_CHARS: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VaultError {
    #[error("User key must be at least 8 characters long")]
    UserKeyTooShort,

    #[error("User key must be less than 128 characters")]
    UserKeyTooLong,

    #[error("Please enter a label for this password")]
    EmptyLabel,

    #[error("Invalid base64 in {field}")]
    InvalidEncoding { field: &'static str },

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed. Invalid user key or corrupted data.")]
    DecryptionFailed,
}

pub type Result<T> = std::result::Result<T, VaultError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedData {
    pub encrypted_password: String,
    pub salt: String,
    pub iv: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordMetadata {
    pub length: usize,
    pub has_uppercase: bool,
    pub has_lowercase: bool,
    pub has_numbers: bool,
    pub has_special_chars: bool,
}

impl PasswordMetadata {
    pub fn from_password(password: &str) -> Self {
        let classes = CharClasses::of(password);
        Self {
            length: password.chars().count(),
            has_uppercase: classes.uppercase,
            has_lowercase: classes.lowercase,
            has_numbers: classes.digits,
            has_special_chars: classes.special,
        }
    }
}

/// Record handed to the vault store. Carries only ciphertext and metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePasswordRequest {
    pub label: String,
    pub encrypted_password: String,
    pub salt: String,
    pub iv: String,
    pub metadata: PasswordMetadata,
}

impl SavePasswordRequest {
    pub fn new(label: &str, encrypted: EncryptedData, metadata: PasswordMetadata) -> Result<Self> {
        let label = label.trim();
        if label.is_empty() {
            return Err(VaultError::EmptyLabel);
        }

        Ok(Self {
            label: label.to_string(),
            encrypted_password: encrypted.encrypted_password,
            salt: encrypted.salt,
            iv: encrypted.iv,
            metadata,
        })
    }

    pub fn encrypted_data(&self) -> EncryptedData {
        EncryptedData {
            encrypted_password: self.encrypted_password.clone(),
            salt: self.salt.clone(),
            iv: self.iv.clone(),
        }
    }
}

pub fn validate_user_key(user_key: &str) -> Result<()> {
    let chars = user_key.chars().count();
    if chars < MIN_USER_KEY_CHARS {
        return Err(VaultError::UserKeyTooShort);
    }
    if chars > MAX_USER_KEY_CHARS {
        return Err(VaultError::UserKeyTooLong);
    }
    Ok(())
}

pub fn generate_salt() -> String {
    STANDARD.encode(random_bytes::<SALT_LEN>())
}

fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

pub fn derive_key(user_key: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(user_key.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key[..]);
    key
}

pub fn encrypt_password(password: &str, user_key: &str) -> Result<EncryptedData> {
    let salt = random_bytes::<SALT_LEN>();
    let iv = random_bytes::<IV_LEN>();
    let key = derive_key(user_key, &salt);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), password.as_bytes())
        .map_err(|_| VaultError::EncryptionFailed)?;

    debug!(
        plaintext_len = password.len(),
        ciphertext_len = ciphertext.len(),
        "encrypted vault entry"
    );

    Ok(EncryptedData {
        encrypted_password: STANDARD.encode(ciphertext),
        salt: STANDARD.encode(salt),
        iv: STANDARD.encode(iv),
    })
}

pub fn decrypt_password(data: &EncryptedData, user_key: &str) -> Result<Zeroizing<String>> {
    let salt = decode("salt", &data.salt)?;
    let iv = decode("iv", &data.iv)?;
    let ciphertext = decode("encryptedPassword", &data.encrypted_password)?;

    if iv.len() != IV_LEN {
        warn!(iv_len = iv.len(), "unexpected IV length");
        return Err(VaultError::DecryptionFailed);
    }

    let key = derive_key(user_key, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));

    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(&iv), ciphertext.as_slice())
            .map_err(|_| VaultError::DecryptionFailed)?,
    );

    let password = std::str::from_utf8(&plaintext).map_err(|_| VaultError::DecryptionFailed)?;

    Ok(Zeroizing::new(password.to_string()))
}

fn decode(field: &'static str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|_| VaultError::InvalidEncoding { field })
}
