//! Chunk assembler: concatenates staged chunks into the plaintext of a file.

use bytes::{Bytes, BytesMut};

use vaultshare_core::result::AppResult;
use vaultshare_core::types::id::FileId;
use vaultshare_crypto::ContentHasher;
use vaultshare_entity::file::chunk::FileChunk;

use super::store::ChunkStore;

/// Plaintext produced by assembly, with its authoritative digest and size.
#[derive(Debug, Clone)]
pub struct AssembledContent {
    /// Concatenated chunk bytes.
    pub data: Bytes,
    /// Lowercase hex SHA-256 of `data`.
    pub checksum_sha256: String,
    /// Length of `data`.
    pub size_bytes: u64,
}

/// Assembles staged chunks in chunk-number order.
#[derive(Debug, Clone)]
pub struct ChunkAssembler {
    store: ChunkStore,
}

impl ChunkAssembler {
    /// Create a new chunk assembler.
    pub fn new(store: ChunkStore) -> Self {
        Self { store }
    }

    /// Read `chunks` (already ordered by number) and hash the concatenation
    /// as it is built.
    pub async fn assemble(
        &self,
        file_id: FileId,
        chunks: &[FileChunk],
    ) -> AppResult<AssembledContent> {
        tracing::info!(file_id = %file_id, chunks = chunks.len(), "Assembling chunks");

        let total: i64 = chunks.iter().map(|c| c.size_bytes).sum();
        let mut buffer = BytesMut::with_capacity(usize::try_from(total).unwrap_or(0));
        let mut hasher = ContentHasher::new();

        for chunk in chunks {
            let data = self.store.read_chunk(chunk).await?;
            hasher.update(&data);
            buffer.extend_from_slice(&data);
        }

        let size_bytes = hasher.bytes_hashed();
        let checksum_sha256 = hasher.finalize_hex();
        tracing::info!(
            file_id = %file_id,
            bytes = size_bytes,
            checksum = %checksum_sha256,
            "Assembly complete"
        );

        Ok(AssembledContent {
            data: buffer.freeze(),
            checksum_sha256,
            size_bytes,
        })
    }
}

/// Most absent chunk numbers listed in a gap report.
pub const MAX_REPORTED_MISSING: usize = 100;

/// Gaps in a staged chunk set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkGaps {
    /// The lowest absent numbers, at most [`MAX_REPORTED_MISSING`].
    pub missing: Vec<i32>,
    /// How many numbers in `0..=max` are absent.
    pub missing_count: usize,
}

impl ChunkGaps {
    /// Whether the set is exactly `0..N-1`.
    pub fn is_empty(&self) -> bool {
        self.missing_count == 0
    }
}

/// Chunk numbers absent from `0..=max` when the staged set is not exactly
/// `0..N-1`. Work is bounded by the number of staged chunks and
/// [`MAX_REPORTED_MISSING`], not by the highest chunk number.
pub fn chunk_gaps(chunks: &[FileChunk]) -> ChunkGaps {
    let mut numbers: Vec<i32> = chunks.iter().map(|c| c.chunk_number).collect();
    numbers.sort_unstable();
    numbers.dedup();

    let Some(&max) = numbers.last() else {
        return ChunkGaps::default();
    };
    let span = usize::try_from(max).map_or(0, |m| m + 1);
    let missing_count = span.saturating_sub(numbers.len());
    if missing_count == 0 {
        return ChunkGaps::default();
    }

    let missing = (0..=max)
        .filter(|n| numbers.binary_search(n).is_err())
        .take(MAX_REPORTED_MISSING)
        .collect();
    ChunkGaps {
        missing,
        missing_count,
    }
}
