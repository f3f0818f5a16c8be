//! End-to-end ingestion behavior through the public API.

use chunkvault::{
    ChunkConfig, ChunkVault, DocumentProcessor, EmbeddingProvider, HashEmbedder, ProcessorConfig,
    VaultError,
};
use tempfile::tempdir;

const DIM: usize = 32;

fn embed_all(provider: &HashEmbedder, texts: &[&str]) -> (Vec<String>, Vec<Vec<f32>>) {
    let owned: Vec<String> = texts.iter().map(|t| (*t).to_string()).collect();
    let vectors = owned
        .iter()
        .map(|t| provider.embed(t).expect("embed"))
        .collect();
    (owned, vectors)
}

#[test]
fn deleted_document_disappears_from_every_surface() {
    let dir = tempdir().expect("tmp");
    let provider = HashEmbedder::new(DIM);
    let mut vault = ChunkVault::create(dir.path().join("store"), DIM).expect("create");

    let (texts_a, vectors_a) = embed_all(
        &provider,
        &[
            "alpha chunk about filesystems",
            "alpha chunk about caching layers",
            "alpha chunk about write ordering",
        ],
    );
    let (texts_b, vectors_b) = embed_all(
        &provider,
        &["beta chunk about embeddings", "beta chunk about retrieval"],
    );

    let id_a = vault
        .add_document("Alpha", None, &texts_a, &vectors_a)
        .expect("add a");
    let id_b = vault
        .add_document("Beta", None, &texts_b, &vectors_b)
        .expect("add b");

    vault.delete_document(&id_a).expect("delete a");

    // Even with k far above the live chunk count, nothing from the deleted
    // document comes back.
    let query = provider.embed("alpha chunk about filesystems").expect("embed");
    let hits = vault.search(&query, 10).expect("search");
    assert!(hits.len() <= 2);
    assert!(hits.iter().all(|hit| hit.document_id == id_b));

    assert!(matches!(
        vault.get_document(&id_a).expect_err("gone"),
        VaultError::NotFound { .. }
    ));
    assert!(matches!(
        vault.chunks_for_document(&id_a).expect_err("gone"),
        VaultError::NotFound { .. }
    ));
    assert_eq!(vault.list_documents().len(), 1);

    // A second delete is an error, not a silent no-op.
    assert!(matches!(
        vault.delete_document(&id_a).expect_err("already deleted"),
        VaultError::NotFound { .. }
    ));

    // The vectors stay in the index file; only searchability changes.
    let stats = vault.stats();
    assert_eq!(stats.vector_count, 5);
    assert_eq!(stats.retired_count, 3);
    assert_eq!(stats.chunk_count, 2);
}

#[test]
fn seven_hundred_char_document_yields_three_searchable_windows() {
    let dir = tempdir().expect("tmp");
    let provider = HashEmbedder::new(DIM);
    let mut vault = ChunkVault::create(dir.path().join("store"), DIM).expect("create");

    // 700 characters with no whitespace, so normalization leaves the length
    // alone. The cycle length keeps the three windows textually distinct.
    let body: String = (0..700u32)
        .map(|i| char::from(b'a' + (i % 23) as u8))
        .collect();

    let config = ProcessorConfig {
        chunking: ChunkConfig::new(300, 50).expect("config"),
    };
    let processor = DocumentProcessor::new(config);
    let id = processor
        .process_text(&mut vault, &provider, "Windows", None, &body)
        .expect("process");

    let chunks = vault.chunks_for_document(&id).expect("chunks");
    let lengths: Vec<usize> = chunks.iter().map(|c| c.text.chars().count()).collect();
    assert_eq!(lengths, vec![300, 300, 200]);

    // Querying with a chunk's exact text puts that chunk first at distance
    // zero, because the embedder is deterministic.
    let query = provider.embed(&chunks[1].text).expect("embed");
    let hits = vault.search(&query, 3).expect("search");
    assert_eq!(hits[0].ordinal, 1);
    assert!(hits[0].distance.abs() < 1e-6);
}

#[test]
fn update_preserves_identity_and_retires_old_chunks() {
    let dir = tempdir().expect("tmp");
    let provider = HashEmbedder::new(DIM);
    let mut vault = ChunkVault::create(dir.path().join("store"), DIM).expect("create");

    let (texts, vectors) = embed_all(&provider, &["first draft body"]);
    let id = vault
        .add_document("Draft", None, &texts, &vectors)
        .expect("add");
    let original = vault.get_document(&id).expect("document");

    let (new_texts, new_vectors) =
        embed_all(&provider, &["second draft body", "with a new section"]);
    vault
        .update_document(&id, &new_texts, &new_vectors)
        .expect("update");

    let updated = vault.get_document(&id).expect("document");
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.ingested_at, original.ingested_at);
    assert!(updated.updated_at.is_some());
    assert_eq!(updated.chunk_ids.len(), 2);

    // Old content no longer matches; new content does.
    let old_query = provider.embed("first draft body").expect("embed");
    let hits = vault.search(&old_query, 5).expect("search");
    assert!(hits.iter().all(|hit| hit.text != "first draft body"));

    let new_query = provider.embed("second draft body").expect("embed");
    let hits = vault.search(&new_query, 1).expect("search");
    assert_eq!(hits[0].text, "second draft body");

    let stats = vault.stats();
    assert_eq!(stats.retired_count, 1);
    assert_eq!(stats.chunk_count, 2);
}

#[test]
fn reingesting_identical_content_is_refused() {
    let dir = tempdir().expect("tmp");
    let provider = HashEmbedder::new(DIM);
    let mut vault = ChunkVault::create(dir.path().join("store"), DIM).expect("create");
    let processor = DocumentProcessor::new(ProcessorConfig::default());

    processor
        .process_text(&mut vault, &provider, "Doc", None, "stable content body")
        .expect("first");
    let err = processor
        .process_text(&mut vault, &provider, "Renamed", None, "stable content body")
        .expect_err("duplicate");
    assert!(matches!(err, VaultError::DuplicateKey { .. }));
    assert_eq!(vault.list_documents().len(), 1);
}
