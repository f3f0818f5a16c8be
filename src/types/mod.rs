//! Public types exposed by the `chunkvault` crate.

pub mod document;
pub mod embedding;
pub mod search;

pub use document::{Chunk, ChunkId, Document, DocumentId, Stats};
pub use embedding::{EmbeddingProvider, HashEmbedder};
pub use search::SearchHit;
