//! Flat append-only vector index.
//!
//! Exact nearest-neighbor over fixed-dimension vectors, addressed purely by
//! append position. There is no delete or update primitive: positions are
//! never reused, and callers filter retired positions themselves. The
//! distance metric is squared Euclidean and is fixed for the lifetime of an
//! index file.

use serde::{Deserialize, Serialize};

use crate::constants::ARTIFACT_VERSION;
use crate::error::{Result, VaultError};

/// Serialized form of the index: one flat buffer, `len * dimension` floats.
#[derive(Debug, Serialize, Deserialize)]
pub struct VecIndexArtifact {
    pub version: u16,
    pub dimension: u32,
    pub vectors: Vec<f32>,
}

/// In-memory flat index over the vector artifact.
#[derive(Debug)]
pub struct FlatVecIndex {
    dimension: usize,
    vectors: Vec<f32>,
}

impl FlatVecIndex {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(VaultError::InvalidConfig {
                reason: "embedding dimension must be non-zero".into(),
            });
        }
        Ok(Self {
            dimension,
            vectors: Vec::new(),
        })
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vectors ever appended, including logically retired ones.
    /// Monotonically non-decreasing for the lifetime of the index file.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len() / self.dimension
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(VaultError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Append a vector and return its position (0-based append order).
    pub fn append(&mut self, vector: &[f32]) -> Result<u64> {
        self.check_dimension(vector)?;
        let position = self.len() as u64;
        self.vectors.extend_from_slice(vector);
        Ok(position)
    }

    /// Rank every stored vector against `query` and return up to `fetch`
    /// candidates, ascending by distance, ties broken by ascending position.
    pub fn search(&self, query: &[f32], fetch: usize) -> Result<Vec<(u64, f32)>> {
        self.check_dimension(query)?;
        if fetch == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut ranked: Vec<(u64, f32)> = self
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, stored)| (position as u64, squared_l2(query, stored)))
            .collect();
        ranked.sort_unstable_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        ranked.truncate(fetch);
        Ok(ranked)
    }

    #[must_use]
    pub fn to_artifact(&self) -> VecIndexArtifact {
        VecIndexArtifact {
            version: ARTIFACT_VERSION,
            dimension: self.dimension as u32,
            vectors: self.vectors.clone(),
        }
    }

    pub fn from_artifact(artifact: VecIndexArtifact) -> Result<Self> {
        let dimension = artifact.dimension as usize;
        if dimension == 0 {
            return Err(VaultError::inconsistent("index artifact has zero dimension"));
        }
        if artifact.vectors.len() % dimension != 0 {
            return Err(VaultError::inconsistent(format!(
                "index artifact length {} is not a multiple of dimension {dimension}",
                artifact.vectors.len()
            )));
        }
        Ok(Self {
            dimension,
            vectors: artifact.vectors,
        })
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
