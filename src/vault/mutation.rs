//! Document mutations: add, delete, update, clear.
//!
//! Every operation here is one atomic unit from the caller's perspective.
//! The vector index only supports append, so rollback works by retirement:
//! vectors appended for a failed ingestion are marked unsearchable and the
//! metadata store is left exactly as it was before the call. Both artifacts
//! are persisted before a mutation returns success.

use chrono::Utc;

use crate::error::{Result, VaultError};
use crate::index::FlatVecIndex;
use crate::store::MetadataStore;
use crate::types::{Chunk, ChunkId, Document, DocumentId};
use crate::vault::lifecycle::ChunkVault;
use crate::vault::liveness::LivenessMap;

impl ChunkVault {
    /// Derive the document identifier `add_document` will assign for these
    /// chunk texts. Lets ingestion pipelines detect an already-stored
    /// document before paying for embeddings.
    #[must_use]
    pub fn document_id_for(chunk_texts: &[String]) -> DocumentId {
        DocumentId::from_content(&chunk_texts.join("\n"))
    }

    /// Ingest one document: append every vector, bind its position, insert
    /// all rows, persist. Returns the new document's identifier.
    ///
    /// Fails with `DuplicateKey` before touching the index when the content
    /// hash is already stored, with `DimensionMismatch` on any wrong-length
    /// vector, and with `IngestionFailed` when the metadata write fails
    /// after vectors were appended — in that case the appended positions
    /// are retired and the store is as if the call never happened.
    pub fn add_document(
        &mut self,
        title: &str,
        source: Option<String>,
        chunk_texts: &[String],
        vectors: &[Vec<f32>],
    ) -> Result<DocumentId> {
        if chunk_texts.len() != vectors.len() {
            return Err(VaultError::IngestionFailed {
                title: title.to_string(),
                reason: format!(
                    "{} chunks but {} vectors",
                    chunk_texts.len(),
                    vectors.len()
                ),
            });
        }
        for vector in vectors {
            if vector.len() != self.dimension() {
                return Err(VaultError::DimensionMismatch {
                    expected: self.dimension(),
                    actual: vector.len(),
                });
            }
        }

        let doc_id = Self::document_id_for(chunk_texts);
        if self.store.contains(&doc_id) {
            return Err(VaultError::duplicate(doc_id.to_string()));
        }

        let mut document = Document::new(doc_id.clone(), title, source);
        document.ingested_at = Utc::now();

        let chunks = self.append_chunks(&doc_id, chunk_texts, vectors)?;
        let positions: Vec<u64> = chunks.iter().map(|chunk| chunk.index_position).collect();

        if let Err(err) = self.store.insert_document(document, chunks) {
            return self.rollback_ingestion(title, &positions, err);
        }

        self.commit()?;
        tracing::info!(
            document = %doc_id,
            title,
            chunks = chunk_texts.len(),
            "document ingested"
        );
        Ok(doc_id)
    }

    /// Delete a document: retire every owned position and remove all rows,
    /// then persist. The index file keeps the retired vectors' bytes — a
    /// deliberate space-for-simplicity trade-off; there is no compaction.
    pub fn delete_document(&mut self, id: &DocumentId) -> Result<()> {
        let (document, chunks) = self.store.remove_document(id)?;
        for chunk in &chunks {
            self.liveness.retire(chunk.index_position)?;
        }
        self.commit()?;
        tracing::info!(
            document = %document.id,
            retired = chunks.len(),
            "document deleted"
        );
        Ok(())
    }

    /// Drop every document and chunk and reset the index to empty. Unlike
    /// `delete_document`, this does reclaim index space: the retired slots
    /// go away with the vectors. The dimension is preserved and the store
    /// directory stays usable, so previously-ingested content can be
    /// ingested again without a `DuplicateKey`.
    pub fn clear(&mut self) -> Result<()> {
        let dimension = self.dimension();
        let removed = self.store.document_count();
        self.store = MetadataStore::new();
        self.liveness = LivenessMap::new();
        self.index = FlatVecIndex::new(dimension)?;
        self.commit()?;
        tracing::info!(removed, "vault cleared");
        Ok(())
    }

    /// Replace a document's chunks under its existing identifier: old
    /// positions retired, new vectors appended, document identity and
    /// ingestion timestamp preserved.
    pub fn update_document(
        &mut self,
        id: &DocumentId,
        chunk_texts: &[String],
        vectors: &[Vec<f32>],
    ) -> Result<()> {
        if chunk_texts.len() != vectors.len() {
            return Err(VaultError::IngestionFailed {
                title: id.to_string(),
                reason: format!(
                    "{} chunks but {} vectors",
                    chunk_texts.len(),
                    vectors.len()
                ),
            });
        }
        for vector in vectors {
            if vector.len() != self.dimension() {
                return Err(VaultError::DimensionMismatch {
                    expected: self.dimension(),
                    actual: vector.len(),
                });
            }
        }

        let (old_document, old_chunks) = self.store.remove_document(id)?;

        let mut updated = old_document.clone();
        updated.updated_at = Some(Utc::now());
        updated.chunk_ids.clear();

        let new_chunks = match self.append_chunks(id, chunk_texts, vectors) {
            Ok(chunks) => chunks,
            Err(err) => {
                // Nothing was appended; put the old rows back untouched.
                self.store.insert_document(old_document, old_chunks)?;
                return Err(err);
            }
        };
        let new_positions: Vec<u64> = new_chunks
            .iter()
            .map(|chunk| chunk.index_position)
            .collect();

        if let Err(err) = self.store.insert_document(updated, new_chunks) {
            // Retire the orphaned new vectors and restore the old rows; the
            // old positions were never retired, so the original document
            // stays fully searchable.
            for position in &new_positions {
                self.liveness.retire(*position)?;
            }
            self.store.insert_document(old_document, old_chunks)?;
            self.commit()?;
            return Err(VaultError::IngestionFailed {
                title: id.to_string(),
                reason: err.to_string(),
            });
        }

        for chunk in &old_chunks {
            self.liveness.retire(chunk.index_position)?;
        }
        self.commit()?;
        tracing::info!(
            document = %id,
            old_chunks = old_chunks.len(),
            new_chunks = chunk_texts.len(),
            "document updated"
        );
        Ok(())
    }

    /// Append vectors and bind their positions, producing chunk rows ready
    /// for insertion. Dimension checks have already run.
    fn append_chunks(
        &mut self,
        doc_id: &DocumentId,
        chunk_texts: &[String],
        vectors: &[Vec<f32>],
    ) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::with_capacity(chunk_texts.len());
        for (ordinal, (text, vector)) in chunk_texts.iter().zip(vectors.iter()).enumerate() {
            let position = self.index.append(vector)?;
            let chunk_id = ChunkId::new();
            self.liveness.bind(position, chunk_id)?;
            chunks.push(Chunk {
                id: chunk_id,
                document_id: doc_id.clone(),
                ordinal,
                text: text.clone(),
                index_position: position,
            });
        }
        Ok(chunks)
    }

    /// Retire every position appended for a failed ingestion, persist the
    /// rollback, and surface `IngestionFailed`.
    fn rollback_ingestion(
        &mut self,
        title: &str,
        positions: &[u64],
        cause: VaultError,
    ) -> Result<DocumentId> {
        for position in positions {
            self.liveness.retire(*position)?;
        }
        let mut reason = cause.to_string();
        if let Err(persist_err) = self.commit() {
            reason = format!("{reason}; rollback persist also failed: {persist_err}");
        }
        tracing::warn!(
            title,
            retired = positions.len(),
            %reason,
            "ingestion rolled back"
        );
        Err(VaultError::IngestionFailed {
            title: title.to_string(),
            reason,
        })
    }
}
