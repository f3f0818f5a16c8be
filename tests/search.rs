//! Search semantics through the public API: ordering, ties, filtering.

use chunkvault::{ChunkVault, EmbeddingProvider, HashEmbedder, VaultError};
use tempfile::tempdir;

const DIM: usize = 24;

fn embed_all(provider: &HashEmbedder, texts: &[&str]) -> (Vec<String>, Vec<Vec<f32>>) {
    let owned: Vec<String> = texts.iter().map(|t| (*t).to_string()).collect();
    let vectors = owned
        .iter()
        .map(|t| provider.embed(t).expect("embed"))
        .collect();
    (owned, vectors)
}

#[test]
fn results_come_back_in_ascending_distance_order() {
    let dir = tempdir().expect("tmp");
    let provider = HashEmbedder::new(DIM);
    let mut vault = ChunkVault::create(dir.path().join("store"), DIM).expect("create");

    let (texts, vectors) = embed_all(
        &provider,
        &[
            "parsing configuration files",
            "garbage collection pauses",
            "parsing configuration files quickly",
        ],
    );
    vault
        .add_document("Mixed", None, &texts, &vectors)
        .expect("add");

    let query = provider.embed("parsing configuration files").expect("embed");
    let hits = vault.search(&query, 3).expect("search");
    assert_eq!(hits.len(), 3);
    for pair in hits.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
    assert_eq!(hits[0].text, "parsing configuration files");
    assert!(hits[0].distance.abs() < 1e-6);
}

#[test]
fn equal_distances_break_ties_by_append_order() {
    let dir = tempdir().expect("tmp");
    let provider = HashEmbedder::new(DIM);
    let mut vault = ChunkVault::create(dir.path().join("store"), DIM).expect("create");

    // The shared chunk text embeds identically in both documents, so both
    // copies sit at the same distance from the query. The earlier-appended
    // copy must rank first.
    let (texts_a, vectors_a) = embed_all(&provider, &["shared sentence", "only in first"]);
    let (texts_b, vectors_b) = embed_all(&provider, &["shared sentence", "only in second"]);
    let id_a = vault
        .add_document("First", None, &texts_a, &vectors_a)
        .expect("add a");
    let id_b = vault
        .add_document("Second", None, &texts_b, &vectors_b)
        .expect("add b");

    let query = provider.embed("shared sentence").expect("embed");
    let hits = vault.search(&query, 2).expect("search");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].distance, hits[1].distance);
    assert_eq!(hits[0].document_id, id_a);
    assert_eq!(hits[1].document_id, id_b);
    assert!(hits[0].index_position < hits[1].index_position);
}

#[test]
fn wrong_dimension_query_fails_even_for_zero_k() {
    let dir = tempdir().expect("tmp");
    let vault = ChunkVault::create(dir.path().join("store"), DIM).expect("create");

    let err = vault.search(&vec![0.0; DIM + 1], 0).expect_err("bad query");
    assert!(matches!(
        err,
        VaultError::DimensionMismatch {
            expected: DIM,
            actual: _
        }
    ));
}

#[test]
fn zero_k_returns_empty_even_with_content() {
    let dir = tempdir().expect("tmp");
    let provider = HashEmbedder::new(DIM);
    let mut vault = ChunkVault::create(dir.path().join("store"), DIM).expect("create");
    let (texts, vectors) = embed_all(&provider, &["some indexed text"]);
    vault.add_document("Doc", None, &texts, &vectors).expect("add");

    let query = provider.embed("some indexed text").expect("embed");
    assert!(vault.search(&query, 0).expect("search").is_empty());
}

#[test]
fn random_vectors_always_rank_ascending() {
    let dir = tempdir().expect("tmp");
    let mut vault = ChunkVault::create(dir.path().join("store"), DIM).expect("create");

    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let texts: Vec<String> = (0..50).map(|i| format!("chunk {i}")).collect();
    let vectors: Vec<Vec<f32>> = (0..50)
        .map(|_| (0..DIM).map(|_| rng.f32() * 2.0 - 1.0).collect())
        .collect();
    vault.add_document("Random", None, &texts, &vectors).expect("add");

    for _ in 0..10 {
        let query: Vec<f32> = (0..DIM).map(|_| rng.f32() * 2.0 - 1.0).collect();
        let hits = vault.search(&query, 7).expect("search");
        assert_eq!(hits.len(), 7);
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }
}

#[test]
fn hits_carry_document_provenance() {
    let dir = tempdir().expect("tmp");
    let provider = HashEmbedder::new(DIM);
    let mut vault = ChunkVault::create(dir.path().join("store"), DIM).expect("create");

    let (texts, vectors) = embed_all(&provider, &["chapter one text", "chapter two text"]);
    let id = vault
        .add_document("Handbook", Some("handbook.txt".into()), &texts, &vectors)
        .expect("add");

    let query = provider.embed("chapter two text").expect("embed");
    let hits = vault.search(&query, 1).expect("search");
    assert_eq!(hits[0].document_id, id);
    assert_eq!(hits[0].document_title, "Handbook");
    assert_eq!(hits[0].ordinal, 1);
}
