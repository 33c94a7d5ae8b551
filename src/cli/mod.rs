//! CLI interface for kvsearch.
//!
//! Provides command-line argument parsing using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line interface for kvsearch.
#[derive(Parser)]
#[command(name = "kvsearch")]
#[command(author, version, about = "Full-text search on an embedded key-value store", long_about = None)]
pub struct Cli {
    /// Index directory (overrides `storage.path` from the config file).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Add a document and index its terms.
    Add {
        /// Document content. Read from --file or stdin when omitted.
        content: Option<String>,

        /// Read content from file instead of stdin.
        #[arg(short, long, conflicts_with = "content")]
        file: Option<PathBuf>,
    },

    /// Find documents containing a term, most occurrences first.
    Search {
        /// The exact term to look up.
        term: String,

        /// Maximum number of results to return.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Delete a document and its index entries.
    Delete {
        /// Document ID.
        id: u64,
    },

    /// Print the content of a document.
    Get {
        /// Document ID.
        id: u64,
    },
}
