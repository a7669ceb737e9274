pub mod collection;
pub mod error;
pub mod index;
pub mod persist;
pub mod tokenizer;
pub mod vector_space;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

pub use collection::DocumentCollection;
pub use error::{Error, Result};
pub use index::{Candidate, Posting, PostingsList, PositionalIndex};
pub use tokenizer::{StopWords, Tokenizer};
pub use vector_space::{QueryResult, QueryTerm, RankedResult, TermDocumentData, VectorSpace, WeightField};

pub type DocId = u32;
pub type Position = u32;

/// A document of the collection. Identity is the enumeration index; the path is
/// carried along for reading and reporting only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub path: PathBuf,
}

impl Document {
    pub fn new<P: AsRef<Path>>(id: DocId, path: P) -> Self {
        Self { id, path: path.as_ref().to_path_buf() }
    }

    /// File name used in reports, falling back to the full path.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for Document {}

impl PartialOrd for Document {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Document {
    fn cmp(&self, other: &Self) -> Ordering { self.id.cmp(&other.id) }
}

/// Options for building a collection's index.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// File extension (without the dot) that marks a file as a document.
    pub extension: String,
    pub tokenizer: Tokenizer,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { extension: collection::DEFAULT_EXTENSION.to_string(), tokenizer: Tokenizer::default() }
    }
}

/// Builds the positional index and vector space for the collection at `dir` and
/// writes both snapshots into it. Nothing is written unless both builds succeed.
pub fn build_collection<P: AsRef<Path>>(dir: P, options: &BuildOptions) -> Result<(PositionalIndex, VectorSpace)> {
    let collection = DocumentCollection::open(dir, &options.extension)?;
    let index = PositionalIndex::build(options.tokenizer.clone(), &collection)?;
    let space = VectorSpace::build(&index);

    let paths = persist::IndexPaths::new(collection.directory());
    persist::save_snapshots(&paths, &index, &space)?;
    tracing::info!(dir = %collection.directory().display(), num_docs = index.num_docs(), "saved snapshots");
    Ok((index, space))
}
