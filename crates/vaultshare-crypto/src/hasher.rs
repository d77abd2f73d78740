//! Streaming SHA-256 content hashing.
//!
//! Whether fed a single chunk, an assembled file, or a reader, the digest is
//! the lowercase hex SHA-256 of the bytes seen, independent of how they were
//! split.

use std::io::Read;

use sha2::{Digest, Sha256};

use crate::HASH_BLOCK_SIZE;

/// Incremental hasher for content arriving in pieces.
#[derive(Debug, Clone, Default)]
pub struct ContentHasher {
    inner: Sha256,
    bytes: u64,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
        self.bytes += data.len() as u64;
    }

    /// Total number of bytes hashed so far.
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes
    }

    /// Consume the hasher and return the lowercase hex digest.
    pub fn finalize_hex(self) -> String {
        hex::encode(self.inner.finalize())
    }
}

/// Hash an in-memory buffer.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = ContentHasher::new();
    hasher.update(data);
    hasher.finalize_hex()
}

/// Hash a reader in 4 KiB blocks, returning the digest and byte count.
pub fn hash_reader<R: Read>(mut reader: R) -> std::io::Result<(String, u64)> {
    let mut hasher = ContentHasher::new();
    let mut buf = [0u8; HASH_BLOCK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    let bytes = hasher.bytes_hashed();
    Ok((hasher.finalize_hex(), bytes))
}
