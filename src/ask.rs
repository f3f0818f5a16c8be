//! Question answering over vault contents.
//!
//! The vault retrieves; answering is delegated to an [`AnswerGenerator`]
//! implementation so the core stays free of any model or network client.
//! Citations carry enough provenance for a caller to show where each piece
//! of context came from.

use crate::error::{Result, VaultError};
use crate::types::{DocumentId, EmbeddingProvider, SearchHit};
use crate::vault::ChunkVault;

/// A question plus retrieval settings.
#[derive(Debug, Clone)]
pub struct AskRequest {
    pub query: String,
    /// How many chunks of context to retrieve.
    pub top_k: usize,
}

impl AskRequest {
    #[must_use]
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
        }
    }
}

/// One piece of context the answer was grounded on.
#[derive(Debug, Clone)]
pub struct AskCitation {
    pub document_id: DocumentId,
    pub document_title: String,
    pub ordinal: usize,
    pub text: String,
    pub distance: f32,
}

/// An answer together with the retrieved context that produced it.
#[derive(Debug, Clone)]
pub struct AskResponse {
    pub answer: String,
    pub citations: Vec<AskCitation>,
}

/// Produces an answer from a question and retrieved context chunks.
///
/// Implementations may call a language model, template the context into a
/// summary, or anything else; they receive hits in ascending distance
/// order.
pub trait AnswerGenerator {
    fn generate(&self, query: &str, context: &[SearchHit]) -> Result<String>;
}

impl ChunkVault {
    /// Answer a question: embed the query, retrieve the closest live
    /// chunks, and hand them to the generator.
    ///
    /// An empty query is rejected before any provider call. When retrieval
    /// finds nothing the generator still runs with empty context, so it can
    /// produce an honest "I don't know".
    pub fn ask(
        &self,
        request: &AskRequest,
        provider: &dyn EmbeddingProvider,
        generator: &dyn AnswerGenerator,
    ) -> Result<AskResponse> {
        if request.query.trim().is_empty() {
            return Err(VaultError::InvalidConfig {
                reason: "ask query must not be empty".to_string(),
            });
        }

        let query_vector = provider.embed(&request.query)?;
        let hits = self.search(&query_vector, request.top_k)?;
        tracing::debug!(
            query = %request.query,
            retrieved = hits.len(),
            "retrieved context for question"
        );

        let answer = generator.generate(&request.query, &hits)?;
        let citations = hits
            .into_iter()
            .map(|hit| AskCitation {
                document_id: hit.document_id,
                document_title: hit.document_title,
                ordinal: hit.ordinal,
                text: hit.text,
                distance: hit.distance,
            })
            .collect();
        Ok(AskResponse { answer, citations })
    }
}
