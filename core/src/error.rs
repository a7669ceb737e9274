use std::path::PathBuf;
use thiserror::Error;

use crate::DocId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("collection not found: {0}")]
    CollectionNotFound(PathBuf),

    /// A snapshot was requested before the collection was built.
    #[error("'{name}' not found in {}, build the index first", dir.display())]
    MissingArtifact { name: &'static str, dir: PathBuf },

    #[error("malformed snapshot {}: {reason}", path.display())]
    MalformedSnapshot { path: PathBuf, reason: String },

    #[error("expected document {expected} but got {found}, documents must be added in ascending id order")]
    DocumentOrder { expected: DocId, found: DocId },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] bincode::Error),

    #[error("failed to scan collection: {0}")]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
