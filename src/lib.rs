//! kvsearch - Full-text search on an embedded key-value store.
//!
//! This library persists documents, maintains an inverted index mapping
//! terms to per-document occurrence counts, and answers term queries ranked
//! by frequency. Documents and their postings are always written together in
//! a single atomic batch.
//!
//! # Modules
//!
//! - [`search`] - The search engine (add, search, delete)
//! - [`corpus`] - Document storage and ID allocation
//! - [`index`] - Inverted index and postings encoding
//! - [`tokenizer`] - Term extraction
//! - [`storage`] - Key-value backend trait and implementations
//! - [`commands`] - Operations behind the CLI
//! - [`config`] - Configuration loading
//! - [`cli`] - Command-line interface definitions

pub mod cli;
pub mod commands;
pub mod config;
pub mod corpus;
pub mod index;
pub mod search;
pub mod storage;
pub mod tokenizer;

pub use search::{Context, SearchEngine, SearchError, SearchHit};
