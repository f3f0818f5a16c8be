//! File-to-vault ingestion pipeline.
//!
//! The processor strings together the per-format readers, text
//! normalization, chunking, and the embedding provider, then hands the
//! finished chunk/vector pairs to [`ChunkVault::add_document`]. It owns no
//! storage state of its own; a single processor can feed any number of
//! vaults.

use std::path::Path;

use crate::chunker::{self, ChunkConfig};
use crate::error::{Result, VaultError};
use crate::reader::{DocumentFormat, ReaderHint, ReaderRegistry};
use crate::text::normalize_text;
use crate::types::{DocumentId, EmbeddingProvider};
use crate::vault::ChunkVault;

/// How much of a file's head is offered to readers as a magic-byte hint.
const MAGIC_PROBE_LEN: usize = 16;

/// Tuning for the ingestion pipeline.
#[derive(Debug, Clone, Default)]
pub struct ProcessorConfig {
    pub chunking: ChunkConfig,
}

/// Raw text pulled out of a source file, before normalization.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub title: String,
    pub source: Option<String>,
    pub text: String,
}

/// Turns source files into searchable documents.
pub struct DocumentProcessor {
    registry: ReaderRegistry,
    config: ProcessorConfig,
}

impl DocumentProcessor {
    #[must_use]
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            registry: ReaderRegistry::default(),
            config,
        }
    }

    /// Use a custom reader registry, e.g. to add formats or drop the
    /// passthrough fallback.
    #[must_use]
    pub fn with_registry(config: ProcessorConfig, registry: ReaderRegistry) -> Self {
        Self { registry, config }
    }

    /// Read a file and extract its raw text without touching any vault.
    /// The title is the file stem; the source is the path as given.
    pub fn extract_file(&self, path: &Path) -> Result<ExtractedDocument> {
        let bytes = fs_err::read(path)?;

        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(DocumentFormat::Unknown, DocumentFormat::from_extension);
        let magic = &bytes[..bytes.len().min(MAGIC_PROBE_LEN)];
        let hint = ReaderHint::new(format, Some(magic));

        let reader = self
            .registry
            .find_reader(&hint)
            .ok_or_else(|| VaultError::ExtractionFailed {
                path: path.to_path_buf(),
                reason: "no registered reader accepts this format".to_string(),
            })?;

        tracing::debug!(path = %path.display(), reader = reader.name(), "extracting");
        let text = reader.extract(&bytes).map_err(|err| match err {
            // Readers do not know the path they are fed; fill it in here.
            VaultError::ExtractionFailed { reason, .. } => VaultError::ExtractionFailed {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;

        let title = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("untitled")
            .to_string();
        Ok(ExtractedDocument {
            title,
            source: Some(path.display().to_string()),
            text,
        })
    }

    /// Extract, chunk, embed, and ingest one file. Returns the identifier
    /// of the new document.
    pub fn process_file(
        &self,
        vault: &mut ChunkVault,
        provider: &dyn EmbeddingProvider,
        path: &Path,
    ) -> Result<DocumentId> {
        let extracted = self.extract_file(path)?;
        self.process_text(
            vault,
            provider,
            &extracted.title,
            extracted.source,
            &extracted.text,
        )
    }

    /// Chunk, embed, and ingest already-extracted text.
    ///
    /// The duplicate check runs on the chunked content before any provider
    /// call, so re-ingesting a known document costs no embeddings. A
    /// provider failure on any chunk aborts the whole document; nothing is
    /// appended to the vault in that case.
    pub fn process_text(
        &self,
        vault: &mut ChunkVault,
        provider: &dyn EmbeddingProvider,
        title: &str,
        source: Option<String>,
        raw_text: &str,
    ) -> Result<DocumentId> {
        if provider.dimension() != vault.dimension() {
            return Err(VaultError::DimensionMismatch {
                expected: vault.dimension(),
                actual: provider.dimension(),
            });
        }

        let text = normalize_text(raw_text);
        if text.is_empty() {
            return Err(VaultError::IngestionFailed {
                title: title.to_string(),
                reason: "document contains no text after normalization".to_string(),
            });
        }
        let chunks = chunker::chunk(&text, self.config.chunking);

        let doc_id = ChunkVault::document_id_for(&chunks);
        if vault.contains_document(&doc_id) {
            return Err(VaultError::duplicate(doc_id.to_string()));
        }

        let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let vectors = provider.embed_batch(&refs)?;

        vault.add_document(title, source, &chunks, &vectors)
    }
}
