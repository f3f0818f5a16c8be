//! Lifecycle management for creating and opening vault store directories.
//!
//! Responsibilities:
//! - Take an OS advisory lock so only one process mutates a store.
//! - Bootstrap both artifacts on create, load and validate them on open.
//! - Refuse to operate when the metadata artifact and the vector index
//!   disagree; drift is fatal, never auto-repaired.
//! - Persist both artifacts atomically after every committed mutation.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use atomic_write_file::AtomicWriteFile;
use bincode::config;
use bincode::serde::{decode_from_slice, encode_to_vec};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::constants::{
    ARTIFACT_VERSION, LOCK_FILE_NAME, META_FILE_NAME, META_MAGIC, VEC_FILE_NAME, VEC_MAGIC,
};
use crate::error::{Result, VaultError};
use crate::index::{FlatVecIndex, VecIndexArtifact};
use crate::store::MetadataStore;
use crate::types::Stats;
use crate::vault::liveness::{LivenessMap, PositionState};

const CHECKSUM_LEN: usize = 32;

/// Serialized metadata artifact: the store tables plus the liveness map and
/// the declared embedding dimension, so drift against the index file is
/// detectable at open.
#[derive(Serialize, Deserialize)]
struct MetaArtifact {
    version: u16,
    dimension: u32,
    store: MetadataStore,
    liveness: LivenessMap,
}

/// Advisory lock held for the lifetime of a vault handle.
#[derive(Debug)]
struct VaultLock {
    file: File,
}

impl VaultLock {
    fn acquire(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        file.try_lock_exclusive().map_err(|err| {
            VaultError::Lock(format!(
                "store directory {} is locked by another process: {err}",
                dir.display()
            ))
        })?;
        Ok(Self { file })
    }
}

impl Drop for VaultLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Orchestrator over the metadata store, the vector index, and the liveness
/// map. All mutations take `&mut self` and reads take `&self`, so the
/// borrow checker enforces the single-writer/multi-reader discipline: a
/// reader can never observe a half-appended document.
#[derive(Debug)]
pub struct ChunkVault {
    dir: PathBuf,
    _lock: VaultLock,
    pub(crate) index: FlatVecIndex,
    pub(crate) store: MetadataStore,
    pub(crate) liveness: LivenessMap,
}

impl ChunkVault {
    /// Create a fresh store directory with empty artifacts. Refuses to
    /// overwrite an existing vault.
    pub fn create<P: AsRef<Path>>(dir: P, dimension: usize) -> Result<Self> {
        let dir = dir.as_ref();
        fs_err::create_dir_all(dir)?;
        if dir.join(META_FILE_NAME).exists() || dir.join(VEC_FILE_NAME).exists() {
            return Err(VaultError::InvalidConfig {
                reason: format!("store directory {} already contains a vault", dir.display()),
            });
        }

        let lock = VaultLock::acquire(dir)?;
        let mut vault = Self {
            dir: dir.to_path_buf(),
            _lock: lock,
            index: FlatVecIndex::new(dimension)?,
            store: MetadataStore::new(),
            liveness: LivenessMap::new(),
        };
        vault.commit()?;
        tracing::info!(dir = %vault.dir.display(), dimension, "vault created");
        Ok(vault)
    }

    /// Open an existing store directory, loading both artifacts and
    /// verifying they agree before any operation is allowed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let lock = VaultLock::acquire(dir)?;

        let meta_bytes = read_artifact(&dir.join(META_FILE_NAME), META_MAGIC)?;
        let (meta, _): (MetaArtifact, usize) =
            decode_from_slice(&meta_bytes, config::standard())?;
        if meta.version != ARTIFACT_VERSION {
            return Err(VaultError::InvalidArtifact {
                path: dir.join(META_FILE_NAME),
                reason: format!("unsupported artifact version {}", meta.version),
            });
        }

        let vec_bytes = read_artifact(&dir.join(VEC_FILE_NAME), VEC_MAGIC)?;
        let (vec_artifact, _): (VecIndexArtifact, usize) =
            decode_from_slice(&vec_bytes, config::standard())?;
        let index = FlatVecIndex::from_artifact(vec_artifact)?;

        if meta.dimension as usize != index.dimension() {
            return Err(VaultError::inconsistent(format!(
                "metadata declares dimension {} but index file holds dimension {}",
                meta.dimension,
                index.dimension()
            )));
        }

        let vault = Self {
            dir: dir.to_path_buf(),
            _lock: lock,
            index,
            store: meta.store,
            liveness: meta.liveness,
        };
        vault.verify_consistency()?;
        tracing::info!(
            dir = %vault.dir.display(),
            documents = vault.store.document_count(),
            vectors = vault.index.len(),
            "vault opened"
        );
        Ok(vault)
    }

    /// Cross-check the three structures. Any disagreement means one side
    /// was written without the other and the store must not be trusted.
    fn verify_consistency(&self) -> Result<()> {
        if self.liveness.len() != self.index.len() {
            return Err(VaultError::inconsistent(format!(
                "liveness map covers {} positions but index holds {} vectors",
                self.liveness.len(),
                self.index.len()
            )));
        }

        for (position, state) in self.liveness.iter() {
            if let PositionState::Live(chunk_id) = state {
                match self.store.chunk_by_position(position) {
                    Some(chunk) if chunk.id == *chunk_id => {}
                    Some(chunk) => {
                        return Err(VaultError::inconsistent(format!(
                            "position {position} is live for chunk {chunk_id} but the store binds it to {}",
                            chunk.id
                        )));
                    }
                    None => {
                        return Err(VaultError::inconsistent(format!(
                            "position {position} is live for chunk {chunk_id} but no chunk row exists"
                        )));
                    }
                }
            }
        }

        for chunk in self.store.chunks() {
            if chunk.index_position >= self.index.len() as u64 {
                return Err(VaultError::inconsistent(format!(
                    "chunk {} references index position {} beyond index size {}",
                    chunk.id,
                    chunk.index_position,
                    self.index.len()
                )));
            }
            if self.liveness.live_chunk(chunk.index_position) != Some(chunk.id) {
                return Err(VaultError::inconsistent(format!(
                    "chunk {} holds position {} that the liveness map does not attribute to it",
                    chunk.id, chunk.index_position
                )));
            }
        }
        Ok(())
    }

    /// Persist both artifacts. Each file is written through an atomic
    /// rename; the metadata artifact goes first, so a crash between the two
    /// writes is caught by the open-time length check.
    pub(crate) fn commit(&mut self) -> Result<()> {
        let meta = MetaArtifact {
            version: ARTIFACT_VERSION,
            dimension: self.index.dimension() as u32,
            store: std::mem::take(&mut self.store),
            liveness: std::mem::take(&mut self.liveness),
        };
        let encoded = encode_to_vec(&meta, config::standard());
        self.store = meta.store;
        self.liveness = meta.liveness;
        write_artifact(&self.dir.join(META_FILE_NAME), META_MAGIC, &encoded?)?;

        let vec_bytes = encode_to_vec(&self.index.to_artifact(), config::standard())?;
        write_artifact(&self.dir.join(VEC_FILE_NAME), VEC_MAGIC, &vec_bytes)?;

        tracing::debug!(
            documents = self.store.document_count(),
            vectors = self.index.len(),
            retired = self.liveness.retired_count(),
            "vault committed"
        );
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    pub fn get_document(&self, id: &crate::types::DocumentId) -> Result<crate::types::Document> {
        self.store.document(id).cloned()
    }

    #[must_use]
    pub fn contains_document(&self, id: &crate::types::DocumentId) -> bool {
        self.store.contains(id)
    }

    #[must_use]
    pub fn list_documents(&self) -> Vec<crate::types::Document> {
        self.store.list_documents().into_iter().cloned().collect()
    }

    pub fn chunks_for_document(
        &self,
        id: &crate::types::DocumentId,
    ) -> Result<Vec<crate::types::Chunk>> {
        Ok(self
            .store
            .chunks_for_document(id)?
            .into_iter()
            .cloned()
            .collect())
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            document_count: self.store.document_count(),
            chunk_count: self.store.chunk_count(),
            vector_count: self.index.len(),
            retired_count: self.liveness.retired_count(),
            dimension: self.index.dimension(),
        }
    }
}

/// Frame a payload as `[magic][payload][blake3 checksum]` and write it via
/// atomic rename so readers never observe a torn file.
fn write_artifact(path: &Path, magic: [u8; 4], payload: &[u8]) -> Result<()> {
    let mut options = AtomicWriteFile::options();
    options.read(true);
    let mut atomic = options.open(path)?;
    let checksum = blake3::hash(payload);

    let file = atomic.as_file_mut();
    file.write_all(&magic)?;
    file.write_all(payload)?;
    file.write_all(checksum.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    atomic.commit()?;
    Ok(())
}

/// Read and validate an artifact, returning the raw payload bytes.
fn read_artifact(path: &Path, magic: [u8; 4]) -> Result<Vec<u8>> {
    let bytes = fs_err::read(path)?;
    if bytes.len() < magic.len() + CHECKSUM_LEN {
        return Err(VaultError::InvalidArtifact {
            path: path.to_path_buf(),
            reason: format!("file too short ({} bytes)", bytes.len()),
        });
    }
    if bytes[..magic.len()] != magic {
        return Err(VaultError::InvalidArtifact {
            path: path.to_path_buf(),
            reason: "bad magic".into(),
        });
    }

    let payload = &bytes[magic.len()..bytes.len() - CHECKSUM_LEN];
    let stored = &bytes[bytes.len() - CHECKSUM_LEN..];
    if blake3::hash(payload).as_bytes() != stored {
        return Err(VaultError::InvalidArtifact {
            path: path.to_path_buf(),
            reason: "checksum mismatch".into(),
        });
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_then_open_empty_vault() {
        let dir = tempdir().expect("tmp");
        let path = dir.path().join("store");
        {
            let vault = ChunkVault::create(&path, 4).expect("create");
            assert_eq!(vault.dimension(), 4);
            assert_eq!(vault.stats().vector_count, 0);
        }
        let vault = ChunkVault::open(&path).expect("open");
        assert_eq!(vault.dimension(), 4);
        assert!(vault.list_documents().is_empty());
    }

    #[test]
    fn vault_handles_are_debug_formattable() {
        let dir = tempdir().expect("tmp");
        let path = dir.path().join("store");
        let vault = ChunkVault::create(&path, 4).expect("create");
        let rendered = format!("{vault:?}");
        assert!(rendered.contains("ChunkVault"));
    }

    #[test]
    fn create_refuses_existing_vault() {
        let dir = tempdir().expect("tmp");
        let path = dir.path().join("store");
        drop(ChunkVault::create(&path, 4).expect("create"));
        let err = ChunkVault::create(&path, 4).expect_err("second create");
        assert!(matches!(err, VaultError::InvalidConfig { .. }));
    }

    #[test]
    fn lock_excludes_second_handle() {
        let dir = tempdir().expect("tmp");
        let path = dir.path().join("store");
        let _vault = ChunkVault::create(&path, 4).expect("create");
        let err = ChunkVault::open(&path).expect_err("second handle");
        assert!(matches!(err, VaultError::Lock(_)));
    }

    #[test]
    fn corrupted_metadata_is_rejected() {
        let dir = tempdir().expect("tmp");
        let path = dir.path().join("store");
        drop(ChunkVault::create(&path, 4).expect("create"));

        let meta_path = path.join(META_FILE_NAME);
        let mut bytes = std::fs::read(&meta_path).expect("read");
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;
        std::fs::write(&meta_path, &bytes).expect("write");

        let err = ChunkVault::open(&path).expect_err("open corrupt");
        assert!(matches!(err, VaultError::InvalidArtifact { .. }));
    }

    #[test]
    fn truncated_index_file_is_fatal_drift() {
        let dir = tempdir().expect("tmp");
        let path = dir.path().join("store");
        {
            let mut vault = ChunkVault::create(&path, 2).expect("create");
            vault
                .add_document("Doc", None, &["alpha".into()], &[vec![1.0, 0.0]])
                .expect("add");
        }

        // Rewrite the index artifact as empty while metadata still references
        // position 0. Open must refuse, not guess.
        let empty = FlatVecIndex::new(2).expect("index");
        let payload =
            encode_to_vec(&empty.to_artifact(), config::standard()).expect("encode");
        write_artifact(&path.join(VEC_FILE_NAME), VEC_MAGIC, &payload).expect("write");

        let err = ChunkVault::open(&path).expect_err("open drifted");
        assert!(matches!(err, VaultError::InconsistentStoreState { .. }));
    }
}
