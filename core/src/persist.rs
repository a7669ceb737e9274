use bincode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::{Error, PositionalIndex, Result, VectorSpace};

pub const SNAPSHOT_VERSION: u32 = 1;
pub const INDEX_FILE: &str = "index";
pub const VECTOR_SPACE_FILE: &str = "vector_space";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotKind {
    PositionalIndex,
    VectorSpace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub kind: SnapshotKind,
    pub version: u32,
    pub num_docs: u32,
    pub created_at: String,
}

impl SnapshotHeader {
    fn new(kind: SnapshotKind, num_docs: u32, created_at: &str) -> Self {
        Self { kind, version: SNAPSHOT_VERSION, num_docs, created_at: created_at.to_string() }
    }
}

fn now() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

#[derive(Serialize)]
struct SnapshotRef<'a, T> {
    header: &'a SnapshotHeader,
    body: &'a T,
}

#[derive(Deserialize)]
struct Snapshot<T> {
    header: SnapshotHeader,
    body: T,
}

/// Snapshot locations inside a collection directory.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index(&self) -> PathBuf { self.root.join(INDEX_FILE) }
    pub fn vector_space(&self) -> PathBuf { self.root.join(VECTOR_SPACE_FILE) }

    /// Fails with `MissingArtifact` unless both snapshots exist.
    pub fn require_built(&self) -> Result<()> {
        self.require(INDEX_FILE)?;
        self.require(VECTOR_SPACE_FILE)?;
        Ok(())
    }

    fn require(&self, name: &'static str) -> Result<PathBuf> {
        let path = self.root.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::MissingArtifact { name, dir: self.root.clone() })
        }
    }
}

pub fn save_index(paths: &IndexPaths, index: &PositionalIndex) -> Result<()> {
    let header = SnapshotHeader::new(SnapshotKind::PositionalIndex, index.num_docs(), &now());
    let tmp = stage(&paths.index(), &header, index)?;
    commit(&tmp, &paths.index())
}

pub fn load_index(paths: &IndexPaths) -> Result<PositionalIndex> {
    load_index_with_header(paths).map(|(_, index)| index)
}

/// Loads the index together with its snapshot header.
pub fn load_index_with_header(paths: &IndexPaths) -> Result<(SnapshotHeader, PositionalIndex)> {
    let path = paths.require(INDEX_FILE)?;
    let (header, index): (_, PositionalIndex) = read_snapshot(&path, SnapshotKind::PositionalIndex)?;
    if header.num_docs != index.num_docs() {
        return Err(malformed(&path, format!("header lists {} documents, body has {}", header.num_docs, index.num_docs())));
    }
    index.validate().map_err(|reason| malformed(&path, reason))?;
    Ok((header, index))
}

pub fn save_vector_space(paths: &IndexPaths, space: &VectorSpace) -> Result<()> {
    let header = SnapshotHeader::new(SnapshotKind::VectorSpace, space.num_docs(), &now());
    let tmp = stage(&paths.vector_space(), &header, space)?;
    commit(&tmp, &paths.vector_space())
}

/// Saves both snapshots of one build under a shared `created_at` stamp. Both
/// files are fully written before either replaces its predecessor.
pub fn save_snapshots(paths: &IndexPaths, index: &PositionalIndex, space: &VectorSpace) -> Result<()> {
    let created_at = now();
    let index_header = SnapshotHeader::new(SnapshotKind::PositionalIndex, index.num_docs(), &created_at);
    let space_header = SnapshotHeader::new(SnapshotKind::VectorSpace, space.num_docs(), &created_at);

    let index_tmp = stage(&paths.index(), &index_header, index)?;
    let space_tmp = match stage(&paths.vector_space(), &space_header, space) {
        Ok(tmp) => tmp,
        Err(e) => {
            let _ = fs::remove_file(&index_tmp);
            return Err(e);
        }
    };
    commit(&index_tmp, &paths.index())?;
    commit(&space_tmp, &paths.vector_space())
}

/// Loads the index and vector space and checks that they come from the same build.
pub fn load_snapshots(paths: &IndexPaths) -> Result<(PositionalIndex, VectorSpace)> {
    let (index_header, index) = load_index_with_header(paths)?;
    let (space_header, space) = load_vector_space_with_header(paths)?;
    let space_path = paths.vector_space();

    if index_header.created_at != space_header.created_at {
        return Err(malformed(
            &space_path,
            format!("built at {} but the index was built at {}", space_header.created_at, index_header.created_at),
        ));
    }
    if index.num_docs() != space.num_docs() {
        return Err(malformed(
            &space_path,
            format!("covers {} documents but the index has {}", space.num_docs(), index.num_docs()),
        ));
    }
    // Document equality is by id alone, so compare paths too.
    let same_docs = index.documents.iter().zip(&space.documents).all(|(a, b)| a.id == b.id && a.path == b.path);
    if !same_docs {
        return Err(malformed(&space_path, "document table differs from the index"));
    }
    Ok((index, space))
}

pub fn load_vector_space(paths: &IndexPaths) -> Result<VectorSpace> {
    load_vector_space_with_header(paths).map(|(_, space)| space)
}

pub fn load_vector_space_with_header(paths: &IndexPaths) -> Result<(SnapshotHeader, VectorSpace)> {
    let path = paths.require(VECTOR_SPACE_FILE)?;
    let (header, space): (_, VectorSpace) = read_snapshot(&path, SnapshotKind::VectorSpace)?;
    if header.num_docs != space.num_docs() {
        return Err(malformed(&path, format!("header lists {} documents, body has {}", header.num_docs, space.num_docs())));
    }
    space.validate().map_err(|reason| malformed(&path, reason))?;
    Ok((header, space))
}

/// Reads only the header of a snapshot file.
pub fn load_header(path: &Path) -> Result<SnapshotHeader> {
    let buf = read_file(path)?;
    bincode::deserialize(&buf).map_err(|e| malformed(path, e))
}

// Writes beside the target; `commit` renames it into place, so an
// interrupted save leaves the previous snapshot untouched.
fn stage<T: Serialize>(path: &Path, header: &SnapshotHeader, body: &T) -> Result<PathBuf> {
    let bytes = bincode::serialize(&SnapshotRef { header, body })?;
    let tmp = path.with_extension("tmp");
    let mut f = File::create(&tmp)?;
    f.write_all(&bytes)?;
    f.sync_all()?;
    tracing::debug!(path = %tmp.display(), bytes = bytes.len(), "staged snapshot");
    Ok(tmp)
}

fn commit(tmp: &Path, path: &Path) -> Result<()> {
    fs::rename(tmp, path)?;
    tracing::debug!(path = %path.display(), "wrote snapshot");
    Ok(())
}

fn read_snapshot<T: DeserializeOwned>(path: &Path, kind: SnapshotKind) -> Result<(SnapshotHeader, T)> {
    let buf = read_file(path)?;
    let header: SnapshotHeader = bincode::deserialize(&buf).map_err(|e| malformed(path, e))?;
    if header.kind != kind {
        return Err(malformed(path, format!("expected a {kind:?} snapshot, found {:?}", header.kind)));
    }
    if header.version != SNAPSHOT_VERSION {
        return Err(malformed(path, format!("unsupported snapshot version {}", header.version)));
    }
    let snapshot: Snapshot<T> = bincode::deserialize(&buf).map_err(|e| malformed(path, e))?;
    tracing::debug!(path = %path.display(), num_docs = header.num_docs, created_at = %header.created_at, "loaded snapshot");
    Ok((snapshot.header, snapshot.body))
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(buf)
}

fn malformed(path: &Path, reason: impl ToString) -> Error {
    Error::MalformedSnapshot { path: path.to_path_buf(), reason: reason.to_string() }
}
