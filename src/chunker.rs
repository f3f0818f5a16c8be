//! Overlapping fixed-size chunk windows over normalized text.
//!
//! Pure and deterministic: the same text and configuration always produce
//! the same chunks. Windows are `size` characters and step by
//! `size - overlap`, so consecutive chunks share `overlap` characters; the
//! last window may be shorter.

use crate::constants::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::error::{Result, VaultError};

/// Chunk window configuration. `new` is the only way to build one, so a
/// held value always satisfies `0 <= overlap < size` and `chunk` can rely
/// on a positive step without re-checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    size: usize,
    overlap: usize,
}

impl ChunkConfig {
    pub fn new(size: usize, overlap: usize) -> Result<Self> {
        if size == 0 {
            return Err(VaultError::InvalidConfig {
                reason: "chunk size must be non-zero".into(),
            });
        }
        if overlap >= size {
            return Err(VaultError::InvalidConfig {
                reason: format!("chunk overlap {overlap} must be smaller than chunk size {size}"),
            });
        }
        Ok(Self { size, overlap })
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Split `text` into overlapping character windows. Empty text yields an
/// empty vec, not an error.
#[must_use]
pub fn chunk(text: &str, config: ChunkConfig) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let step = config.size - config.overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + config.size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}
