//! File domain entities.

pub mod chunk;
pub mod metadata;
pub mod model;
pub mod status;
pub mod version;

pub use chunk::{CreateChunk, FileChunk};
pub use metadata::FileMetadata;
pub use model::{CreateFile, File};
pub use status::FileStatus;
pub use version::{CreateVersion, FileVersion};
