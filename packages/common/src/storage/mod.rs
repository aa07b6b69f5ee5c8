mod checksum;
mod content_type;
mod error;
mod model;
mod traits;

pub mod memory;

pub use checksum::Checksum;
pub use content_type::{ALLOWED_CONTENT_TYPES, normalize_content_type};
pub use error::StorageError;
pub use model::{Chunk, FileMetadata, FileState, NewFile};
pub use traits::{ChunkStore, ChunkStream, ordered_chunks};
