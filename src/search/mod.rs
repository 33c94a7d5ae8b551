//! Search engine tying the document store and inverted index together.
//!
//! Every mutation is built as a single [`WriteBatch`] and committed in one
//! call, so a document, its postings and the ID counter are never observed
//! out of sync. Mutations additionally run under a writer lock so that the
//! counter read and the commit that advances it cannot interleave with
//! another writer.

pub mod context;

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;

use crate::corpus::{Corpus, CorpusError, Document, stage_counter, stage_delete, stage_put};
use crate::index::InvertedIndex;
use crate::storage::{KvBackend, StorageError, WriteBatch};
use crate::tokenizer::{Tokenizer, WhitespaceTokenizer};

pub use context::Context;

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(#[from] StorageError),

    #[error("Term not found: {0}")]
    TermNotFound(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(u64),

    #[error("Document counter is corrupt: {0:?}")]
    CorruptCounter(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,
}

impl From<CorpusError> for SearchError {
    fn from(err: CorpusError) -> Self {
        match err {
            CorpusError::Storage(e) => Self::BackendUnavailable(e),
            CorpusError::CorruptCounter(raw) => Self::CorruptCounter(raw),
        }
    }
}

/// A ranked search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub document_id: u64,
    pub term_frequency: u32,
    pub content: String,
}

impl fmt::Display for SearchHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Doc {} (x{}): {}",
            self.document_id, self.term_frequency, self.content
        )
    }
}

/// Full-text search engine over a key-value backend.
pub struct SearchEngine<B: KvBackend> {
    backend: B,
    tokenizer: Box<dyn Tokenizer>,
    writer: Mutex<()>,
}

impl<B: KvBackend> SearchEngine<B> {
    /// Create an engine using whitespace tokenization.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::with_tokenizer(backend, WhitespaceTokenizer)
    }

    #[must_use]
    pub fn with_tokenizer(backend: B, tokenizer: impl Tokenizer + 'static) -> Self {
        Self {
            backend,
            tokenizer: Box::new(tokenizer),
            writer: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Count occurrences of each distinct term in `content`.
    fn term_frequencies<'c>(&self, content: &'c str) -> BTreeMap<&'c str, u32> {
        let mut counts = BTreeMap::new();
        for term in self.tokenizer.tokenize(content) {
            let count: &mut u32 = counts.entry(term).or_insert(0);
            *count = count.saturating_add(1);
        }
        counts
    }

    /// Store `content` as a new document and index its terms.
    ///
    /// Counter, document and postings are committed in one batch.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::BackendUnavailable` if a read or the commit
    /// fails, `SearchError::CorruptCounter` if the stored counter cannot be
    /// parsed, or a context error if `ctx` expires first. Nothing is written
    /// in any of those cases.
    pub fn add_document(&self, ctx: &Context, content: &str) -> Result<u64, SearchError> {
        let frequencies = self.term_frequencies(content);

        let _writer = self.writer.lock();
        ctx.check()?;

        let corpus = Corpus::new(&self.backend);
        let index = InvertedIndex::new(&self.backend);

        let id = corpus.next_id()?;
        let mut batch = WriteBatch::new();
        stage_counter(&mut batch, id);
        stage_put(&mut batch, &Document::new(id, content));

        for (term, frequency) in &frequencies {
            ctx.check()?;
            index.merge_on_add(&mut batch, term, id, *frequency)?;
        }

        ctx.check()?;
        let ops = batch.len();
        self.backend.write_batch(batch)?;

        tracing::info!(document_id = id, terms = frequencies.len(), ops, "added document");
        Ok(id)
    }

    /// Documents containing `term`, ranked by term frequency.
    ///
    /// Postings that point at documents no longer in the store are skipped.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::TermNotFound` if the term is not indexed,
    /// `SearchError::BackendUnavailable` if a read fails, or a context error.
    pub fn search_hits(&self, ctx: &Context, term: &str) -> Result<Vec<SearchHit>, SearchError> {
        ctx.check()?;

        let index = InvertedIndex::new(&self.backend);
        let Some(postings) = index.lookup(term)? else {
            return Err(SearchError::TermNotFound(term.to_string()));
        };

        let corpus = Corpus::new(&self.backend);
        let mut hits = Vec::with_capacity(postings.len());

        for posting in postings.ranked() {
            ctx.check()?;
            match corpus.get(posting.document_id)? {
                Some(document) => hits.push(SearchHit {
                    document_id: posting.document_id,
                    term_frequency: posting.term_frequency,
                    content: document.text(),
                }),
                None => tracing::warn!(
                    term,
                    document_id = posting.document_id,
                    "skipping posting for missing document"
                ),
            }
        }

        tracing::debug!(term, hits = hits.len(), "search complete");
        Ok(hits)
    }

    /// Like [`SearchEngine::search_hits`], formatted as
    /// `Doc <id> (x<frequency>): <content>` lines.
    ///
    /// # Errors
    ///
    /// Same as [`SearchEngine::search_hits`].
    pub fn search(&self, ctx: &Context, term: &str) -> Result<Vec<String>, SearchError> {
        Ok(self
            .search_hits(ctx, term)?
            .iter()
            .map(ToString::to_string)
            .collect())
    }

    /// Remove document `id` and every posting that references it.
    ///
    /// Deleting an unknown ID succeeds without changing anything. The ID
    /// counter is never lowered, so deleted IDs are not reused.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::BackendUnavailable` if the index scan or the
    /// commit fails, or a context error.
    pub fn delete_document(&self, ctx: &Context, id: u64) -> Result<(), SearchError> {
        let _writer = self.writer.lock();
        ctx.check()?;

        let index = InvertedIndex::new(&self.backend);

        let mut batch = WriteBatch::new();
        stage_delete(&mut batch, id);
        let terms = index.remove_document(&mut batch, id)?;

        ctx.check()?;
        self.backend.write_batch(batch)?;

        tracing::info!(document_id = id, terms, "deleted document");
        Ok(())
    }

    /// Fetch a stored document.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::DocumentNotFound` if no document has that ID.
    pub fn get_document(&self, ctx: &Context, id: u64) -> Result<Document, SearchError> {
        ctx.check()?;
        Corpus::new(&self.backend)
            .get(id)?
            .ok_or(SearchError::DocumentNotFound(id))
    }

    /// The highest document ID ever assigned, 0 for a fresh store.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::CorruptCounter` or `SearchError::BackendUnavailable`.
    pub fn last_document_id(&self, ctx: &Context) -> Result<u64, SearchError> {
        ctx.check()?;
        Ok(Corpus::new(&self.backend).last_id()?)
    }
}
