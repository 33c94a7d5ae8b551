//! Inverted index mapping terms to postings lists.
//!
//! Each term lives under its own `word:<term>` key. Writes are staged into a
//! [`WriteBatch`] so they can be committed together with the document they
//! belong to.

pub mod postings;

use crate::storage::{KvBackend, StorageError, WriteBatch};

pub use postings::{Posting, PostingError, PostingsList};

/// Key prefix for term entries.
pub const TERM_PREFIX: &str = "word:";

/// Build the storage key for `term`.
#[must_use]
pub fn term_key(term: &str) -> Vec<u8> {
    format!("{TERM_PREFIX}{term}").into_bytes()
}

/// Stage a full replacement of `term`'s postings. An empty list removes the
/// term key instead of storing an empty value.
pub fn stage_postings(batch: &mut WriteBatch, term: &str, list: &PostingsList) {
    if list.is_empty() {
        batch.delete(term_key(term));
    } else {
        batch.put(term_key(term), list.encode());
    }
}

/// Inverted index view over a key-value backend.
pub struct InvertedIndex<'a, B: KvBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: KvBackend + ?Sized> InvertedIndex<'a, B> {
    #[must_use]
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Read the postings for `term`, or `None` if the term is not indexed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend read fails.
    pub fn lookup(&self, term: &str) -> Result<Option<PostingsList>, StorageError> {
        Ok(self
            .backend
            .get(&term_key(term))?
            .map(|raw| PostingsList::decode_lossy(term, &raw)))
    }

    /// Read the postings for `term`; an absent term yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend read fails.
    pub fn read_postings(&self, term: &str) -> Result<PostingsList, StorageError> {
        Ok(self.lookup(term)?.unwrap_or_default())
    }

    /// Replace `term`'s postings immediately.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub fn write_postings(&self, term: &str, list: &PostingsList) -> Result<(), StorageError> {
        let mut batch = WriteBatch::new();
        stage_postings(&mut batch, term, list);
        self.backend.write_batch(batch)
    }

    /// Stage `term`'s postings with `document_id` set to `frequency`.
    ///
    /// An existing entry for the document is overwritten, never duplicated.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the current postings cannot be read.
    pub fn merge_on_add(
        &self,
        batch: &mut WriteBatch,
        term: &str,
        document_id: u64,
        frequency: u32,
    ) -> Result<(), StorageError> {
        let mut list = self.read_postings(term)?;
        list.upsert(document_id, frequency);
        tracing::debug!(term, document_id, frequency, postings = list.len(), "staging postings");
        stage_postings(batch, term, &list);
        Ok(())
    }

    /// Stage removal of every posting that references `document_id`.
    ///
    /// Scans every `word:` key, so the cost grows with vocabulary size rather
    /// than with the size of the removed document. Document and counter keys
    /// are never read. Returns the number of terms touched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the term scan fails.
    pub fn remove_document(
        &self,
        batch: &mut WriteBatch,
        document_id: u64,
    ) -> Result<usize, StorageError> {
        let mut touched = 0;

        for item in self.backend.scan_prefix(TERM_PREFIX.as_bytes())? {
            let (key, value) = item?;
            let Some(term) = key.strip_prefix(TERM_PREFIX.as_bytes()) else {
                continue;
            };
            let mut list = PostingsList::decode_lossy(&String::from_utf8_lossy(term), &value);
            if list.remove(document_id).is_none() {
                continue;
            }

            // Write back by raw key; a lossy term string may not round-trip.
            if list.is_empty() {
                batch.delete(key);
            } else {
                batch.put(key, list.encode());
            }
            touched += 1;
        }

        tracing::debug!(document_id, terms = touched, "staged postings removal");
        Ok(touched)
    }
}
