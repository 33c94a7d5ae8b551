//! Postings lists and their stored text encoding.
//!
//! A postings list is stored as `id:freq` pairs joined by commas, e.g.
//! `1:2,4:1`. The encoder always emits entries in ascending document ID, so
//! `encode(decode(x))` reproduces `x` up to entry order for any well-formed
//! value.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use thiserror::Error;

/// Separator between postings entries.
pub const ENTRY_SEPARATOR: char = ',';

/// Separator between document ID and term frequency within an entry.
pub const FIELD_SEPARATOR: char = ':';

/// Errors from parsing a single stored postings entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostingError {
    #[error("Malformed posting '{entry}': {reason}")]
    Malformed { entry: String, reason: &'static str },
}

/// A term occurring `term_frequency` times in document `document_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub document_id: u64,
    pub term_frequency: u32,
}

impl Posting {
    #[must_use]
    pub fn new(document_id: u64, term_frequency: u32) -> Self {
        Self {
            document_id,
            term_frequency,
        }
    }

    /// Parse one `id:freq` entry.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::Malformed` if the entry does not have exactly
    /// two fields or either field is not a decimal integer in range.
    pub fn parse(entry: &str) -> Result<Self, PostingError> {
        let malformed = |reason: &'static str| PostingError::Malformed {
            entry: entry.to_string(),
            reason,
        };

        let mut fields = entry.split(FIELD_SEPARATOR);
        let (Some(id), Some(freq), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(malformed("expected exactly one ':'"));
        };

        let document_id = id
            .parse::<u64>()
            .map_err(|_| malformed("invalid document id"))?;
        let term_frequency = freq
            .parse::<u32>()
            .map_err(|_| malformed("invalid term frequency"))?;

        Ok(Self::new(document_id, term_frequency))
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{FIELD_SEPARATOR}{}",
            self.document_id, self.term_frequency
        )
    }
}

/// The set of postings for one term, at most one per document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingsList {
    entries: BTreeMap<u64, u32>,
}

impl PostingsList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn frequency(&self, document_id: u64) -> Option<u32> {
        self.entries.get(&document_id).copied()
    }

    #[must_use]
    pub fn contains(&self, document_id: u64) -> bool {
        self.entries.contains_key(&document_id)
    }

    /// Set the frequency for `document_id`, returning the one it replaced.
    pub fn upsert(&mut self, document_id: u64, term_frequency: u32) -> Option<u32> {
        self.entries.insert(document_id, term_frequency)
    }

    pub fn remove(&mut self, document_id: u64) -> Option<u32> {
        self.entries.remove(&document_id)
    }

    /// Postings in ascending document ID order.
    pub fn iter(&self) -> impl Iterator<Item = Posting> + '_ {
        self.entries
            .iter()
            .map(|(&document_id, &term_frequency)| Posting::new(document_id, term_frequency))
    }

    /// Postings sorted by frequency, highest first; equal frequencies keep
    /// ascending document ID order.
    #[must_use]
    pub fn ranked(&self) -> Vec<Posting> {
        let mut postings: Vec<Posting> = self.iter().collect();
        postings.sort_by(|a, b| b.term_frequency.cmp(&a.term_frequency));
        postings
    }

    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (i, posting) in self.iter().enumerate() {
            if i > 0 {
                out.push(ENTRY_SEPARATOR);
            }
            let _ = write!(out, "{posting}");
        }
        out
    }

    /// Decode a stored value, collecting entries that fail to parse.
    ///
    /// Malformed entries never abort decoding. Should an entry for the same
    /// document appear twice, the later one wins.
    #[must_use]
    pub fn decode(raw: &str) -> (Self, Vec<PostingError>) {
        let mut list = Self::new();
        let mut errors = Vec::new();

        for entry in raw.split(ENTRY_SEPARATOR) {
            if entry.is_empty() {
                continue;
            }
            match Posting::parse(entry) {
                Ok(posting) => {
                    list.upsert(posting.document_id, posting.term_frequency);
                }
                Err(e) => errors.push(e),
            }
        }

        (list, errors)
    }

    /// Decode raw stored bytes, logging and skipping malformed entries.
    #[must_use]
    pub fn decode_lossy(term: &str, raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        let (list, errors) = Self::decode(&text);
        for error in errors {
            tracing::warn!(term, %error, "skipping malformed posting");
        }
        list
    }
}

impl FromIterator<Posting> for PostingsList {
    fn from_iter<I: IntoIterator<Item = Posting>>(iter: I) -> Self {
        let mut list = Self::new();
        for posting in iter {
            list.upsert(posting.document_id, posting.term_frequency);
        }
        list
    }
}
