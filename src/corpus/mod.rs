//! Document storage and ID allocation.
//!
//! Documents live under `doc:<id>` keys. The last assigned ID is kept under
//! a single counter key as decimal text and only ever moves forward.

use thiserror::Error;

use crate::storage::{KvBackend, StorageError, WriteBatch};

/// Key holding the last assigned document ID.
pub const COUNTER_KEY: &[u8] = b"doc_counter";

/// Key prefix for document content.
pub const DOCUMENT_PREFIX: &str = "doc:";

/// Errors that can occur when reading from the corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Document counter is corrupt: {0:?}")]
    CorruptCounter(String),
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: u64,
    pub content: Vec<u8>,
}

impl Document {
    #[must_use]
    pub fn new(id: u64, content: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            content: content.into(),
        }
    }

    /// Content as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// Build the storage key for document `id`.
#[must_use]
pub fn document_key(id: u64) -> Vec<u8> {
    format!("{DOCUMENT_PREFIX}{id}").into_bytes()
}

/// Stage `id` as the last assigned document ID.
pub fn stage_counter(batch: &mut WriteBatch, id: u64) {
    batch.put(COUNTER_KEY, id.to_string());
}

pub fn stage_put(batch: &mut WriteBatch, document: &Document) {
    batch.put(document_key(document.id), document.content.clone());
}

pub fn stage_delete(batch: &mut WriteBatch, id: u64) {
    batch.delete(document_key(id));
}

/// Document store view over a key-value backend.
pub struct Corpus<'a, B: KvBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: KvBackend + ?Sized> Corpus<'a, B> {
    #[must_use]
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// The last assigned document ID, or 0 if none was ever assigned.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::CorruptCounter` if the stored value is not a
    /// decimal integer, or `CorpusError::Storage` if the read fails.
    pub fn last_id(&self) -> Result<u64, CorpusError> {
        let Some(raw) = self.backend.get(COUNTER_KEY)? else {
            return Ok(0);
        };

        let text = String::from_utf8_lossy(&raw);
        text.trim()
            .parse()
            .map_err(|_| CorpusError::CorruptCounter(text.into_owned()))
    }

    /// The ID the next added document will receive.
    ///
    /// The result must be persisted with [`stage_counter`] in the
    /// same batch as the document it is assigned to.
    ///
    /// # Errors
    ///
    /// Same as [`Corpus::last_id`]; also fails if the ID space is exhausted.
    pub fn next_id(&self) -> Result<u64, CorpusError> {
        let last = self.last_id()?;
        last.checked_add(1)
            .ok_or_else(|| CorpusError::CorruptCounter(last.to_string()))
    }

    /// Fetch document `id`, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::Storage` if the read fails.
    pub fn get(&self, id: u64) -> Result<Option<Document>, CorpusError> {
        Ok(self
            .backend
            .get(&document_key(id))?
            .map(|content| Document { id, content }))
    }
}
