//! # vaultshare-crypto
//!
//! At-rest encryption primitives for VaultShare:
//!
//! - [`keys`]: per-file base keys, initialization vectors, and PBKDF2
//!   working-key derivation.
//! - [`hasher`]: bounded-memory SHA-256 content hashing.
//! - [`cipher`]: AES-256-CBC with PKCS7 padding, keyed by a working key
//!   derived from the base key and the IV of each encryption.
//!
//! Encrypted artifacts are raw ciphertext; keys and IVs travel as base64
//! strings and checksums as lowercase hex.

pub mod cipher;
pub mod error;
pub mod hasher;
pub mod keys;

pub use cipher::{Encrypted, decrypt, decrypt_encoded, encrypt};
pub use error::CryptoError;
pub use hasher::{ContentHasher, hash_bytes, hash_reader};
pub use keys::{EncryptionKey, InitVector, WorkingKey, derive_key};

/// Size of a base encryption key and of a derived working key, in bytes.
pub const KEY_SIZE: usize = 32;

/// AES block size and IV length, in bytes.
pub const BLOCK_SIZE: usize = 16;

/// PBKDF2-HMAC-SHA256 rounds used to derive a working key.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Read buffer used by the content hasher.
pub const HASH_BLOCK_SIZE: usize = 4096;
