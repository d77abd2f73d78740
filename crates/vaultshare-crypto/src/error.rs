//! Crypto error type.

use thiserror::Error;
use vaultshare_core::error::{AppError, ErrorKind};

/// Failures raised while decoding key material or decrypting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Stored key is not valid base64 or has the wrong length.
    #[error("malformed encryption key")]
    MalformedKey,
    /// Stored IV is not valid base64 or has the wrong length.
    #[error("malformed initialization vector")]
    MalformedIv,
    /// Ciphertext is empty or not a whole number of AES blocks.
    #[error("ciphertext length {len} is not a positive multiple of the block size")]
    InvalidCiphertextLength {
        /// Length of the rejected ciphertext.
        len: usize,
    },
    /// PKCS7 padding check failed (tampered data or wrong key).
    #[error("invalid padding")]
    InvalidPadding,
}

impl From<CryptoError> for AppError {
    fn from(err: CryptoError) -> Self {
        AppError::with_source(
            ErrorKind::Decryption,
            format!("Decryption failed: {err}"),
            err,
        )
    }
}
