//! Error taxonomy for the vault.
//!
//! Every fallible public operation returns [`VaultError`]. Variants are
//! split by who has to act on them: caller bugs (`DimensionMismatch`,
//! `InvalidConfig`), expected outcomes (`NotFound`, `DuplicateKey`),
//! environment failures (`Io`, `Lock`, `EmbeddingFailed`,
//! `ExtractionFailed`), and store damage that must never be papered over
//! (`InconsistentStoreState`, `InvalidArtifact`).

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VaultError>;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("not found: {id}")]
    NotFound { id: String },

    #[error("duplicate key: {id}")]
    DuplicateKey { id: String },

    #[error("ingestion of '{title}' failed: {reason}")]
    IngestionFailed { title: String, reason: String },

    #[error("embedding failed: {reason}")]
    EmbeddingFailed { reason: String },

    #[error("extraction of {path} failed: {reason}")]
    ExtractionFailed { path: PathBuf, reason: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The metadata artifact and the vector index disagree. The store must
    /// not be used until repaired out of band.
    #[error("inconsistent store state: {reason}")]
    InconsistentStoreState { reason: String },

    #[error("invalid artifact {path}: {reason}")]
    InvalidArtifact { path: PathBuf, reason: String },

    #[error("lock error: {0}")]
    Lock(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

impl VaultError {
    pub(crate) fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub(crate) fn duplicate(id: impl Into<String>) -> Self {
        Self::DuplicateKey { id: id.into() }
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        Self::InconsistentStoreState {
            reason: reason.into(),
        }
    }
}
