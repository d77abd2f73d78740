//! Repository implementations for VaultShare entities.

pub mod chunk;
pub mod file;
pub mod version;

pub use chunk::{ChunkInsert, ChunkRepository};
pub use file::FileRepository;
pub use version::VersionRepository;
