//! Command implementations behind the CLI.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::search::{Context, SearchEngine, SearchError, SearchHit};
use crate::storage::fjall::FjallBackend;

/// Engine type used by the command-line tool.
pub type Engine = SearchEngine<FjallBackend>;

/// Open the on-disk engine, preferring `db` over the configured path.
///
/// # Errors
///
/// Returns an error if the keyspace cannot be opened.
pub fn open_engine(config: &Config, db: Option<PathBuf>) -> anyhow::Result<Engine> {
    let path = db.unwrap_or_else(|| config.storage_path());
    let backend = FjallBackend::open(&path, config.storage.sync_writes)?;
    tracing::debug!(path = %path.display(), "opened index");
    Ok(SearchEngine::new(backend))
}

/// Resolve document content from an argument, a file, or stdin.
///
/// # Errors
///
/// Returns an error if the file or stdin cannot be read.
pub fn read_content(content: Option<String>, file: Option<&Path>) -> anyhow::Result<String> {
    if let Some(content) = content {
        return Ok(content);
    }

    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read file {}: {e}", path.display()));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to read stdin: {e}"))?;
    Ok(buffer)
}

/// Add a document.
///
/// # Returns
///
/// The ID assigned to the new document.
///
/// # Errors
///
/// Returns an error if the content has no terms or the engine fails.
pub fn add(engine: &Engine, content: &str) -> anyhow::Result<u64> {
    if content.trim().is_empty() {
        anyhow::bail!("Content cannot be empty");
    }

    Ok(engine.add_document(&Context::background(), content)?)
}

/// Validate a search term.
///
/// Terms are stored exactly as produced by whitespace tokenization, so a
/// term containing whitespace can never match.
fn validate_term(term: &str) -> anyhow::Result<()> {
    if term.is_empty() {
        anyhow::bail!("Search term cannot be empty");
    }

    if term.chars().any(char::is_whitespace) {
        anyhow::bail!("Search term must be a single word: '{term}'");
    }

    Ok(())
}

/// Search for a term.
///
/// # Returns
///
/// Hits ranked by term frequency, at most `limit` of them. An unindexed
/// term yields an empty list.
///
/// # Errors
///
/// Returns an error if the term is invalid or the engine fails.
pub fn search(engine: &Engine, term: &str, limit: Option<usize>) -> anyhow::Result<Vec<SearchHit>> {
    validate_term(term)?;

    let mut hits = match engine.search_hits(&Context::background(), term) {
        Ok(hits) => hits,
        Err(SearchError::TermNotFound(_)) => return Ok(vec![]),
        Err(e) => return Err(e.into()),
    };

    if let Some(limit) = limit {
        hits.truncate(limit);
    }
    Ok(hits)
}

/// Delete a document by ID. Unknown IDs are accepted.
///
/// # Errors
///
/// Returns an error if the engine fails.
pub fn delete(engine: &Engine, id: u64) -> anyhow::Result<()> {
    Ok(engine.delete_document(&Context::background(), id)?)
}

/// Get a document's content as text.
///
/// # Errors
///
/// Returns an error if the document does not exist or cannot be read.
pub fn get(engine: &Engine, id: u64) -> anyhow::Result<String> {
    let document = engine.get_document(&Context::background(), id)?;
    Ok(document.text())
}
