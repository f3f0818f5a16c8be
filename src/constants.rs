//! Shared constants: artifact framing, file names, and defaults.

/// Magic prefix of the metadata artifact.
pub const META_MAGIC: [u8; 4] = *b"CVM1";

/// Magic prefix of the vector index artifact.
pub const VEC_MAGIC: [u8; 4] = *b"CVX1";

/// On-disk artifact format version. Bump on any incompatible layout change.
pub const ARTIFACT_VERSION: u16 = 1;

/// Metadata artifact file name inside a store directory.
pub const META_FILE_NAME: &str = "metadata.cvm";

/// Vector index artifact file name inside a store directory.
pub const VEC_FILE_NAME: &str = "vectors.cvx";

/// Advisory lock file name inside a store directory.
pub const LOCK_FILE_NAME: &str = ".chunkvault.lock";

/// Embedding dimension used when callers don't specify one.
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;

/// Default chunk window size, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 300;

/// Default overlap between consecutive chunk windows, in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Search over-fetches `k * OVERFETCH_FACTOR` index candidates so retired
/// positions can be filtered without starving the result.
pub const OVERFETCH_FACTOR: usize = 4;
