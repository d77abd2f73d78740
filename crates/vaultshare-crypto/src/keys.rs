//! Key material: per-file base keys, IVs, and PBKDF2 working keys.
//!
//! A file's stored [`EncryptionKey`] is never fed to the block cipher
//! directly. Each encryption draws a fresh [`InitVector`] and derives a
//! [`WorkingKey`] from `(base key, iv)`, so decrypting needs both stored
//! values.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::{BLOCK_SIZE, KEY_SIZE, PBKDF2_ROUNDS};

/// A per-file 256-bit base key. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey {
    bytes: [u8; KEY_SIZE],
}

impl EncryptionKey {
    /// Generate a random key from the OS-seeded CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Base64 form persisted on file and version records.
    pub fn to_encoded(&self) -> String {
        STANDARD.encode(self.bytes)
    }

    /// Parse a stored base64 key.
    pub fn from_encoded(encoded: &str) -> Result<Self, CryptoError> {
        let mut decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| CryptoError::MalformedKey)?;
        let result = <[u8; KEY_SIZE]>::try_from(decoded.as_slice())
            .map(Self::from_bytes)
            .map_err(|_| CryptoError::MalformedKey);
        decoded.zeroize();
        result
    }
}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// A 128-bit CBC initialization vector. Not secret, but unique per
/// encryption.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct InitVector {
    bytes: [u8; BLOCK_SIZE],
}

impl InitVector {
    /// Draw a fresh random IV.
    pub fn generate() -> Self {
        let mut bytes = [0u8; BLOCK_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    pub fn from_bytes(bytes: [u8; BLOCK_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.bytes
    }

    pub fn to_encoded(&self) -> String {
        STANDARD.encode(self.bytes)
    }

    pub fn from_encoded(encoded: &str) -> Result<Self, CryptoError> {
        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| CryptoError::MalformedIv)?;
        <[u8; BLOCK_SIZE]>::try_from(decoded.as_slice())
            .map(Self::from_bytes)
            .map_err(|_| CryptoError::MalformedIv)
    }
}

impl std::fmt::Debug for InitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InitVector({})", self.to_encoded())
    }
}

/// The key actually handed to AES. Zeroized on drop.
pub struct WorkingKey {
    bytes: [u8; KEY_SIZE],
}

impl WorkingKey {
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for WorkingKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for WorkingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkingKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive a working key with PBKDF2-HMAC-SHA256 (100,000 rounds, 32 bytes).
///
/// Deterministic in `(secret, salt)`; callers pass the IV of the
/// encryption as the salt.
pub fn derive_key(secret: &[u8], salt: &[u8]) -> WorkingKey {
    let mut bytes = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(secret, salt, PBKDF2_ROUNDS, &mut bytes);
    WorkingKey { bytes }
}
