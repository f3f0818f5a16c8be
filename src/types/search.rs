//! Search result types.

use serde::{Deserialize, Serialize};

use crate::types::{ChunkId, DocumentId};

/// A single live search hit, decorated with chunk and parent-document
/// metadata. Ordered ascending by distance; equal distances break ties by
/// ascending index position, so earlier-ingested chunks win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk_id: ChunkId,
    pub document_id: DocumentId,
    pub document_title: String,
    /// Chunk position within its document.
    pub ordinal: usize,
    pub text: String,
    /// Squared Euclidean distance to the query vector.
    pub distance: f32,
    /// Append position of the matched vector in the index.
    pub index_position: u64,
}
