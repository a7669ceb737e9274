use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::{DocId, Document, Error, Result};

pub const DEFAULT_EXTENSION: &str = "txt";

lazy_static! {
    // A decimal number with an optional, ignored sign.
    static ref NUMBER: Regex = Regex::new(r"[+-]?([0-9]+(?:\.[0-9]*)?|\.[0-9]+)").expect("valid regex");
}

/// A directory of plain-text documents, enumerated in natural file-name order.
#[derive(Debug, Clone)]
pub struct DocumentCollection {
    directory: PathBuf,
    extension: String,
}

impl DocumentCollection {
    pub fn open<P: AsRef<Path>>(directory: P, extension: &str) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        if !directory.is_dir() {
            return Err(Error::CollectionNotFound(directory));
        }
        Ok(Self { directory, extension: extension.trim_start_matches('.').to_string() })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Documents with ids assigned by their position in natural order.
    pub fn documents(&self) -> Result<Vec<Document>> {
        let mut files: Vec<(String, PathBuf)> = Vec::new();
        for entry in WalkDir::new(&self.directory).min_depth(1).max_depth(1) {
            let entry = entry?;
            // Follows symlinks; a link to a regular file is a document.
            if !entry.path().is_file() {
                continue;
            }
            let p = entry.path();
            if p.extension().and_then(|s| s.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            files.push((entry.file_name().to_string_lossy().into_owned(), p.to_path_buf()));
        }
        files.sort_by(|a, b| natural_cmp(&a.0, &b.0));

        let docs: Vec<Document> = files
            .into_iter()
            .enumerate()
            .map(|(i, (_, path))| Document::new(i as DocId, path))
            .collect();
        tracing::debug!(dir = %self.directory.display(), num_docs = docs.len(), "enumerated collection");
        Ok(docs)
    }

    /// Reads a document's text; invalid UTF-8 is replaced rather than rejected.
    pub fn read(&self, doc: &Document) -> Result<String> {
        let bytes = fs::read(&doc.path)?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!(doc = %doc.path.display(), "document is not valid UTF-8, replacing invalid bytes");
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum Chunk<'a> {
    Text(&'a str),
    Number(f64),
}

// Alternates text and number chunks, always starting with a (possibly empty)
// text chunk, so two keys line up chunk for chunk.
fn natural_key(name: &str) -> Vec<Chunk<'_>> {
    let mut key = Vec::new();
    let mut rest = 0;
    for caps in NUMBER.captures_iter(name) {
        let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else { continue };
        key.push(Chunk::Text(&name[rest..whole.start()]));
        key.push(Chunk::Number(digits.as_str().parse().unwrap_or(0.0)));
        rest = whole.end();
    }
    key.push(Chunk::Text(&name[rest..]));
    key
}

/// Numeric-aware comparison: decimal runs compare by value, the text between
/// them compares as text. Names with equal keys fall back to plain order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (left, right) = (natural_key(a), natural_key(b));
    for (x, y) in left.iter().zip(&right) {
        let ord = match (x, y) {
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
            (Chunk::Number(x), Chunk::Number(y)) => x.total_cmp(y),
            (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_sort_by_value() {
        let mut names = vec!["10.txt", "2.txt", "1.txt", "file11.txt", "file9.txt"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["1.txt", "2.txt", "10.txt", "file9.txt", "file11.txt"]);
    }

    #[test]
    fn leading_zeros_fall_back_to_text() {
        assert_eq!(natural_cmp("007", "7"), Ordering::Less);
        assert_eq!(natural_cmp("a", "a"), Ordering::Equal);
    }

    #[test]
    fn decimal_runs_compare_as_numbers() {
        let mut names = vec!["1.9.txt", "1.10.txt", "2.txt", "0.5.txt"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["0.5.txt", "1.10.txt", "1.9.txt", "2.txt"]);
        assert_eq!(natural_cmp("v2.5", "v2.50"), Ordering::Less);
    }

    #[test]
    fn signs_are_not_part_of_the_value() {
        assert_eq!(natural_cmp("a-3.txt", "a+3.txt"), Ordering::Greater);
        assert_eq!(natural_cmp("a-3.txt", "a-20.txt"), Ordering::Less);
    }
}
