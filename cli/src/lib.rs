pub mod commands;
pub mod display;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "phrasedex")]
#[command(about = "Build a positional index over a text collection and rank phrase matches by TF-IDF cosine similarity", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the positional index and vector space for a collection
    Build {
        /// Collection directory; snapshots are written into it
        collection: PathBuf,
        /// Extension of the document files
        #[arg(long, default_value = "txt")]
        extension: String,
        /// Stop word to index anyway, on top of `in`, `to` and `where` (repeatable)
        #[arg(long = "keep-stopword", value_name = "WORD")]
        keep_stopwords: Vec<String>,
        /// Replace the built-in stop list with the words in this file, one per line
        #[arg(long, value_name = "FILE")]
        stopwords_file: Option<PathBuf>,
    },
    /// Print the positional index: term, document, frequency and positions
    PrintIndex {
        collection: PathBuf,
    },
    /// Print the tf, w_tf, df/idf, tf-idf, document length and normalized tf-idf tables
    PrintVectorSpace {
        collection: PathBuf,
    },
    /// Run a phrase query and print term statistics and the ranked documents
    Query {
        collection: PathBuf,
        phrase: String,
        /// Emit the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}
