//! Chunked upload staging and assembly.

pub mod assembler;
pub mod store;

pub use assembler::{AssembledContent, ChunkAssembler, ChunkGaps, MAX_REPORTED_MISSING, chunk_gaps};
pub use store::ChunkStore;
