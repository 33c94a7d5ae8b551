//! Integration tests for the kvsearch engine.
//!
//! Scenarios run against both the in-memory backend and an on-disk fjall
//! keyspace in a temporary directory.

use kvsearch::storage::KvBackend;
use kvsearch::storage::fjall::FjallBackend;
use kvsearch::storage::memory::MemoryBackend;
use kvsearch::{Context, SearchEngine, SearchError};
use tempfile::TempDir;

fn ctx() -> Context {
    Context::background()
}

/// Test helper owning an on-disk engine and its directory.
struct TestIndex {
    temp_dir: TempDir,
    engine: SearchEngine<FjallBackend>,
}

impl TestIndex {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let engine = Self::open(&temp_dir);
        Self { temp_dir, engine }
    }

    fn open(temp_dir: &TempDir) -> SearchEngine<FjallBackend> {
        let backend =
            FjallBackend::open(&temp_dir.path().join("db"), true).expect("Failed to open store");
        SearchEngine::new(backend)
    }

    /// Drop the engine and open the same directory again.
    fn reopen(self) -> Self {
        let Self { temp_dir, engine } = self;
        drop(engine);
        let engine = Self::open(&temp_dir);
        Self { temp_dir, engine }
    }
}

fn ids<B: KvBackend>(engine: &SearchEngine<B>, term: &str) -> Vec<u64> {
    engine
        .search_hits(&ctx(), term)
        .expect("search failed")
        .iter()
        .map(|hit| hit.document_id)
        .collect()
}

// =============================================================================
// Scenarios
// =============================================================================

mod scenario_tests {
    use super::*;

    fn scenario_a<B: KvBackend>(engine: &SearchEngine<B>) {
        let id = engine.add_document(&ctx(), "the cat sat on the mat").unwrap();
        assert_eq!(id, 1);

        let hits = engine.search_hits(&ctx(), "the").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document_id, 1);
        assert_eq!(hits[0].term_frequency, 2);
    }

    fn scenario_b_and_c<B: KvBackend>(engine: &SearchEngine<B>) {
        assert_eq!(engine.add_document(&ctx(), "alpha beta").unwrap(), 1);
        assert_eq!(engine.add_document(&ctx(), "beta gamma").unwrap(), 2);

        let hits = engine.search_hits(&ctx(), "beta").unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.term_frequency == 1));
        let first = ids(engine, "beta");
        assert_eq!(first, vec![1, 2]);
        // Stable across repeated calls
        assert_eq!(ids(engine, "beta"), first);

        engine.delete_document(&ctx(), 1).unwrap();

        assert!(matches!(
            engine.search(&ctx(), "alpha"),
            Err(SearchError::TermNotFound(_))
        ));
        assert_eq!(ids(engine, "beta"), vec![2]);
    }

    #[test]
    fn scenario_a_memory() {
        scenario_a(&SearchEngine::new(MemoryBackend::new()));
    }

    #[test]
    fn scenario_a_fjall() {
        let index = TestIndex::new();
        scenario_a(&index.engine);
    }

    #[test]
    fn scenario_b_c_memory() {
        scenario_b_and_c(&SearchEngine::new(MemoryBackend::new()));
    }

    #[test]
    fn scenario_b_c_fjall() {
        let index = TestIndex::new();
        scenario_b_and_c(&index.engine);
    }

    #[test]
    fn scenario_d_empty_index() {
        let engine = SearchEngine::new(MemoryBackend::new());
        let err = engine.search(&ctx(), "nonexistent").unwrap_err();
        assert!(matches!(err, SearchError::TermNotFound(_)));
        assert!(err.to_string().contains("nonexistent"));
    }
}

// =============================================================================
// Properties
// =============================================================================

mod property_tests {
    use super::*;

    #[test]
    fn ids_increase_by_one_across_deletes() {
        let engine = SearchEngine::new(MemoryBackend::new());
        let mut last = 0;

        for round in 0..10 {
            let id = engine.add_document(&ctx(), "doc").unwrap();
            assert_eq!(id, last + 1);
            last = id;
            if round % 3 == 0 {
                engine.delete_document(&ctx(), id).unwrap();
            }
        }
    }

    #[test]
    fn every_term_is_searchable_with_its_count() {
        let engine = SearchEngine::new(MemoryBackend::new());
        engine.add_document(&ctx(), "filler words here").unwrap();
        let content = "a b a c b a";
        let id = engine.add_document(&ctx(), content).unwrap();

        for (term, expected) in [("a", 3), ("b", 2), ("c", 1)] {
            let hits = engine.search_hits(&ctx(), term).unwrap();
            let hit = hits
                .iter()
                .find(|h| h.document_id == id)
                .expect("document missing from results");
            assert_eq!(hit.term_frequency, expected, "term {term}");
            assert_eq!(hit.content, content);
        }
    }

    #[test]
    fn delete_removes_every_reference() {
        let engine = SearchEngine::new(MemoryBackend::new());
        engine.add_document(&ctx(), "shared only-one").unwrap();
        engine.add_document(&ctx(), "shared other").unwrap();

        engine.delete_document(&ctx(), 1).unwrap();

        assert_eq!(ids(&engine, "shared"), vec![2]);
        assert!(matches!(
            engine.search_hits(&ctx(), "only-one"),
            Err(SearchError::TermNotFound(_))
        ));
    }

    #[test]
    fn second_delete_is_noop() {
        let engine = SearchEngine::new(MemoryBackend::new());
        engine.add_document(&ctx(), "alpha beta").unwrap();
        engine.add_document(&ctx(), "beta").unwrap();

        engine.delete_document(&ctx(), 1).unwrap();
        let snapshot: Vec<_> = engine
            .backend()
            .iter()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        engine.delete_document(&ctx(), 1).unwrap();
        let after: Vec<_> = engine
            .backend()
            .iter()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(snapshot, after);
    }

    #[test]
    fn ranking_orders_by_frequency() {
        let engine = SearchEngine::new(MemoryBackend::new());
        engine.add_document(&ctx(), "t t t t t").unwrap();
        engine.add_document(&ctx(), "t").unwrap();
        engine.add_document(&ctx(), "t t t").unwrap();

        let freqs: Vec<u32> = engine
            .search_hits(&ctx(), "t")
            .unwrap()
            .iter()
            .map(|h| h.term_frequency)
            .collect();
        assert_eq!(freqs, vec![5, 3, 1]);
    }

    #[test]
    fn no_empty_postings_are_stored() {
        let engine = SearchEngine::new(MemoryBackend::new());
        engine.add_document(&ctx(), "lonely").unwrap();
        engine.delete_document(&ctx(), 1).unwrap();

        assert_eq!(engine.backend().get(b"word:lonely").unwrap(), None);
        // Only the counter survives
        assert_eq!(engine.backend().len(), 1);
    }
}

// =============================================================================
// Storage Layout and Persistence
// =============================================================================

mod persistence_tests {
    use super::*;

    #[test]
    fn key_layout_matches_stored_format() {
        let engine = SearchEngine::new(MemoryBackend::new());
        engine.add_document(&ctx(), "x y x").unwrap();
        engine.add_document(&ctx(), "x").unwrap();

        let backend = engine.backend();
        assert_eq!(backend.get(b"doc_counter").unwrap(), Some(b"2".to_vec()));
        assert_eq!(backend.get(b"doc:1").unwrap(), Some(b"x y x".to_vec()));
        assert_eq!(backend.get(b"word:x").unwrap(), Some(b"1:2,2:1".to_vec()));
        assert_eq!(backend.get(b"word:y").unwrap(), Some(b"1:1".to_vec()));
    }

    #[test]
    fn reads_postings_written_in_stored_format() {
        let backend = MemoryBackend::new();
        backend.put(b"doc_counter", b"3").unwrap();
        backend.put(b"doc:1", b"legacy one").unwrap();
        backend.put(b"doc:3", b"legacy three").unwrap();
        backend.put(b"word:legacy", b"1:1,3:4").unwrap();
        let engine = SearchEngine::new(backend);

        assert_eq!(
            engine.search(&ctx(), "legacy").unwrap(),
            vec!["Doc 3 (x4): legacy three", "Doc 1 (x1): legacy one"]
        );
        assert_eq!(engine.add_document(&ctx(), "next").unwrap(), 4);
    }

    #[test]
    fn index_survives_reopen() {
        let index = TestIndex::new();
        index.engine.add_document(&ctx(), "durable words").unwrap();
        index.engine.add_document(&ctx(), "more words").unwrap();
        index.engine.delete_document(&ctx(), 2).unwrap();

        let index = index.reopen();

        assert_eq!(ids(&index.engine, "words"), vec![1]);
        assert_eq!(index.engine.last_document_id(&ctx()).unwrap(), 2);
        assert_eq!(index.engine.add_document(&ctx(), "third").unwrap(), 3);
    }
}

// =============================================================================
// Cancellation
// =============================================================================

mod context_tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn cancelled_delete_leaves_document() {
        let engine = SearchEngine::new(MemoryBackend::new());
        engine.add_document(&ctx(), "keep me").unwrap();

        let cancelled = Context::background();
        cancelled.cancel();
        let err = engine.delete_document(&cancelled, 1).unwrap_err();

        assert!(matches!(err, SearchError::Cancelled));
        assert_eq!(ids(&engine, "keep"), vec![1]);
    }

    #[test]
    fn expired_deadline_blocks_add() {
        let engine = SearchEngine::new(MemoryBackend::new());
        let expired = Context::with_timeout(Duration::ZERO);

        let err = engine.add_document(&expired, "late").unwrap_err();

        assert!(matches!(err, SearchError::DeadlineExceeded));
        assert_eq!(engine.last_document_id(&ctx()).unwrap(), 0);
    }
}
