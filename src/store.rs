//! Metadata store: durable tables for document and chunk records.
//!
//! Tables live in memory and are serialized into the metadata artifact as a
//! whole; all writes go through validate-then-apply so a partially-written
//! document is never observable, even to code inside this crate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};
use crate::types::{Chunk, ChunkId, Document, DocumentId};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MetadataStore {
    documents: BTreeMap<DocumentId, Document>,
    chunks: BTreeMap<ChunkId, Chunk>,
    /// Index position -> chunk id, for resolving search candidates.
    by_position: BTreeMap<u64, ChunkId>,
    /// One-shot failure hook so the ingestion rollback path is testable.
    #[cfg(test)]
    #[serde(skip)]
    pub(crate) inject_insert_failure: bool,
}

impl MetadataStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document together with all of its chunks, all-or-nothing.
    /// Validation runs before any table is touched, so a failure leaves the
    /// store exactly as it was.
    pub fn insert_document(&mut self, mut document: Document, chunks: Vec<Chunk>) -> Result<()> {
        #[cfg(test)]
        if self.inject_insert_failure {
            self.inject_insert_failure = false;
            return Err(VaultError::Io(std::io::Error::other(
                "injected metadata write failure",
            )));
        }

        if self.documents.contains_key(&document.id) {
            return Err(VaultError::duplicate(document.id.to_string()));
        }
        for chunk in &chunks {
            if chunk.document_id != document.id {
                return Err(VaultError::inconsistent(format!(
                    "chunk {} does not belong to document {}",
                    chunk.id, document.id
                )));
            }
            if self.chunks.contains_key(&chunk.id) {
                return Err(VaultError::duplicate(chunk.id.to_string()));
            }
            if self.by_position.contains_key(&chunk.index_position) {
                return Err(VaultError::inconsistent(format!(
                    "index position {} is already bound to a chunk",
                    chunk.index_position
                )));
            }
        }

        document.chunk_ids = chunks.iter().map(|chunk| chunk.id).collect();
        for chunk in chunks {
            self.by_position.insert(chunk.index_position, chunk.id);
            self.chunks.insert(chunk.id, chunk);
        }
        self.documents.insert(document.id.clone(), document);
        Ok(())
    }

    pub fn document(&self, id: &DocumentId) -> Result<&Document> {
        self.documents
            .get(id)
            .ok_or_else(|| VaultError::not_found(id.to_string()))
    }

    #[must_use]
    pub fn contains(&self, id: &DocumentId) -> bool {
        self.documents.contains_key(id)
    }

    /// Remove a document and all of its chunk rows. Returns the removed
    /// records so the caller can retire their index positions.
    pub fn remove_document(&mut self, id: &DocumentId) -> Result<(Document, Vec<Chunk>)> {
        let document = self
            .documents
            .remove(id)
            .ok_or_else(|| VaultError::not_found(id.to_string()))?;

        let mut removed = Vec::with_capacity(document.chunk_ids.len());
        for chunk_id in &document.chunk_ids {
            if let Some(chunk) = self.chunks.remove(chunk_id) {
                self.by_position.remove(&chunk.index_position);
                removed.push(chunk);
            }
        }
        removed.sort_by_key(|chunk| chunk.ordinal);
        Ok((document, removed))
    }

    #[must_use]
    pub fn chunk_by_position(&self, position: u64) -> Option<&Chunk> {
        self.by_position
            .get(&position)
            .and_then(|chunk_id| self.chunks.get(chunk_id))
    }

    /// Chunks of one document, ordered by ordinal.
    pub fn chunks_for_document(&self, id: &DocumentId) -> Result<Vec<&Chunk>> {
        let document = self.document(id)?;
        let mut chunks: Vec<&Chunk> = document
            .chunk_ids
            .iter()
            .filter_map(|chunk_id| self.chunks.get(chunk_id))
            .collect();
        chunks.sort_by_key(|chunk| chunk.ordinal);
        Ok(chunks)
    }

    /// All documents in deterministic (id) order.
    #[must_use]
    pub fn list_documents(&self) -> Vec<&Document> {
        self.documents.values().collect()
    }

    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub(crate) fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }
}
