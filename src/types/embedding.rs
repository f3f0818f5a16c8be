//! Embedding provider boundary.
//!
//! The core treats embedding as an opaque `text -> vector` function with a
//! declared fixed dimension. Provider failures (network, rate limit,
//! malformed input) surface as `EmbeddingFailed` and are never retried here;
//! retry policy belongs to the provider implementation.

use crate::error::Result;

/// Produces fixed-dimension embedding vectors for text.
pub trait EmbeddingProvider: Send + Sync {
    /// Dimension of every vector this provider returns.
    fn dimension(&self) -> usize;

    /// Embed one text. Must return a vector of exactly `dimension()` entries.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch. Default implementation embeds one at a time; providers
    /// with a native batch endpoint should override.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Deterministic offline provider: hashes words and character trigrams into
/// dimensions, then unit-normalizes. Not semantically meaningful, but
/// content-dependent and stable across calls, which is what tests and
/// offline smoke runs need. Identical texts embed to identical vectors, so
/// an exact-text query matches its chunk at distance zero.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        let lower = text.to_lowercase();

        for word in lower.split_whitespace() {
            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
            vector[(word_hash as usize) % self.dimension] += 1.0;

            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let mut trigram_hash = 0u64;
                for c in window {
                    trigram_hash = trigram_hash
                        .wrapping_mul(37)
                        .wrapping_add(u64::from(*c as u32));
                }
                vector[(trigram_hash as usize) % self.dimension] += 0.5;
            }
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}
