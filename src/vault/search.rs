//! Similarity search over live chunks.
//!
//! The index ranks every appended vector, retired ones included, so the
//! orchestrator over-fetches and filters through the liveness map. A
//! candidate whose position is retired, unbound, or pointing at a missing
//! row is dropped, never surfaced. Fewer than `k` live hits is a normal
//! result, not an error.

use crate::constants::OVERFETCH_FACTOR;
use crate::error::Result;
use crate::types::SearchHit;
use crate::vault::lifecycle::ChunkVault;

impl ChunkVault {
    /// Return up to `k` live hits for `query`, ascending by distance, ties
    /// broken by ascending index position. An empty index yields an empty
    /// result. Fails with `DimensionMismatch` on a wrong-length query.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 || self.index.is_empty() {
            // Still validate the query so a caller bug surfaces consistently.
            self.index.search(query, 0)?;
            return Ok(Vec::new());
        }

        let total = self.index.len();
        let mut fetch = (k.saturating_mul(OVERFETCH_FACTOR)).max(k);
        loop {
            let candidates = self.index.search(query, fetch)?;
            let hits = self.collect_live(&candidates, k)?;
            if hits.len() >= k || candidates.len() >= total {
                tracing::debug!(
                    k,
                    fetched = candidates.len(),
                    live = hits.len(),
                    "search complete"
                );
                return Ok(hits);
            }
            // Retired hits crowded out the live ones; widen and retry.
            fetch = fetch.saturating_mul(2);
        }
    }

    fn collect_live(&self, candidates: &[(u64, f32)], k: usize) -> Result<Vec<SearchHit>> {
        let mut hits = Vec::with_capacity(k);
        for (position, distance) in candidates {
            let Some(chunk_id) = self.liveness.live_chunk(*position) else {
                continue;
            };
            let Some(chunk) = self.store.chunk_by_position(*position) else {
                // Liveness and store disagree; drop the candidate rather
                // than surface a dangling hit.
                tracing::warn!(position, "live position has no chunk row, skipping");
                continue;
            };
            if chunk.id != chunk_id {
                tracing::warn!(position, "live position bound to a different chunk, skipping");
                continue;
            }
            let document = self.store.document(&chunk.document_id)?;
            hits.push(SearchHit {
                chunk_id: chunk.id,
                document_id: chunk.document_id.clone(),
                document_title: document.title.clone(),
                ordinal: chunk.ordinal,
                text: chunk.text.clone(),
                distance: *distance,
                index_position: *position,
            });
            if hits.len() == k {
                break;
            }
        }
        Ok(hits)
    }
}
