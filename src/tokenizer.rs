//! Splitting document content into index terms.

/// Trait for tokenizers used at index time.
///
/// Implementations must be pure: the same content always yields the same
/// term sequence, since search looks terms up by exact byte equality.
pub trait Tokenizer: Send + Sync {
    /// Split `content` into terms, in the order they appear.
    fn tokenize<'a>(&self, content: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a>;
}

/// Splits on Unicode whitespace and applies no further normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize<'a>(&self, content: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        Box::new(content.split_whitespace())
    }
}
