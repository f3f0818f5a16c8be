//! Liveness map: the authoritative record of which index positions are
//! searchable.
//!
//! The vector index cannot delete in place, so deleted or superseded
//! positions are marked retired here instead. This map, not the chunk
//! table, decides membership: search consults it for every candidate, and
//! the open-time consistency check requires it to agree with both stores.
//! Slot count always equals the index's append count.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};
use crate::types::ChunkId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionState {
    /// Position holds the current vector of this chunk.
    Live(ChunkId),
    /// Position must never be returned by search again.
    Retired,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LivenessMap {
    slots: Vec<PositionState>,
}

impl LivenessMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Bind a freshly appended index position to its chunk. Positions are
    /// append-ordered, so `position` must be exactly the next slot.
    pub fn bind(&mut self, position: u64, chunk_id: ChunkId) -> Result<()> {
        if position != self.slots.len() as u64 {
            return Err(VaultError::inconsistent(format!(
                "cannot bind position {position}: next unbound slot is {}",
                self.slots.len()
            )));
        }
        self.slots.push(PositionState::Live(chunk_id));
        Ok(())
    }

    /// Mark a position unsearchable. Retiring an already-retired position is
    /// an internal bug surfaced as inconsistency, not silently ignored.
    pub fn retire(&mut self, position: u64) -> Result<()> {
        match self.slots.get_mut(position as usize) {
            Some(slot @ PositionState::Live(_)) => {
                *slot = PositionState::Retired;
                Ok(())
            }
            Some(PositionState::Retired) => Err(VaultError::inconsistent(format!(
                "position {position} is already retired"
            ))),
            None => Err(VaultError::inconsistent(format!(
                "position {position} is beyond the bound range"
            ))),
        }
    }

    #[must_use]
    pub fn live_chunk(&self, position: u64) -> Option<ChunkId> {
        match self.slots.get(position as usize) {
            Some(PositionState::Live(chunk_id)) => Some(*chunk_id),
            _ => None,
        }
    }

    #[must_use]
    pub fn retired_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, PositionState::Retired))
            .count()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (u64, &PositionState)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(position, state)| (position as u64, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_requires_append_order() {
        let mut map = LivenessMap::new();
        let chunk = ChunkId::new();
        map.bind(0, chunk).expect("bind 0");
        let err = map.bind(2, chunk).expect_err("gap");
        assert!(matches!(err, VaultError::InconsistentStoreState { .. }));
    }

    #[test]
    fn retire_hides_position_exactly_once() {
        let mut map = LivenessMap::new();
        let chunk = ChunkId::new();
        map.bind(0, chunk).expect("bind");
        assert_eq!(map.live_chunk(0), Some(chunk));

        map.retire(0).expect("retire");
        assert_eq!(map.live_chunk(0), None);
        assert_eq!(map.retired_count(), 1);
        assert!(map.retire(0).is_err());
    }

    #[test]
    fn retire_out_of_range_is_an_error() {
        let mut map = LivenessMap::new();
        assert!(map.retire(0).is_err());
    }
}
