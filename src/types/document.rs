//! Document and chunk records held by the metadata store.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable document identifier, derived from the blake3 hash of the
/// document's normalized text at creation time. Survives updates: the text
/// may change, the identity does not.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Derive an identifier from document content.
    #[must_use]
    pub fn from_content(text: &str) -> Self {
        Self(blake3::hash(text.as_bytes()).to_hex().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique chunk identifier, stable for the record's lifetime. A text update
/// produces new chunk records with fresh identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(Uuid);

impl ChunkId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChunkId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A document record. Owns its chunks: deleting the document cascades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    /// Source path or URI the text was extracted from, when known.
    pub source: Option<String>,
    pub ingested_at: DateTime<Utc>,
    /// Set on `update_document`; `None` for never-updated documents.
    pub updated_at: Option<DateTime<Utc>>,
    /// Free-form attributes attached by callers (reader diagnostics,
    /// provenance, tags). Not interpreted by the core.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    /// Owned chunk identifiers in ordinal order.
    pub chunk_ids: Vec<ChunkId>,
}

impl Document {
    #[must_use]
    pub fn new(id: DocumentId, title: impl Into<String>, source: Option<String>) -> Self {
        Self {
            id,
            title: title.into(),
            source,
            ingested_at: Utc::now(),
            updated_at: None,
            attributes: BTreeMap::new(),
            chunk_ids: Vec::new(),
        }
    }
}

/// A chunk record binding text to the vector index position its embedding
/// was appended at. The position pairing is the invariant the whole store
/// protects: it must address exactly the vector computed from `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub document_id: DocumentId,
    /// Position of this chunk within its document, 0-based.
    pub ordinal: usize,
    pub text: String,
    /// Append offset of this chunk's vector in the index file.
    pub index_position: u64,
}

/// Point-in-time counters for a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub document_count: usize,
    pub chunk_count: usize,
    /// Total vectors ever appended, live and retired.
    pub vector_count: usize,
    /// Retired index positions. Never reclaimed; grows under delete/update churn.
    pub retired_count: usize,
    pub dimension: usize,
}
