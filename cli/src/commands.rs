use anyhow::{Context, Result};
use phrasedex_core::persist::{load_index_with_header, load_snapshots, load_vector_space, IndexPaths};
use phrasedex_core::tokenizer::DEFAULT_KEPT;
use phrasedex_core::{build_collection, BuildOptions, Error, PositionalIndex, StopWords, Tokenizer, VectorSpace};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::display;
use crate::{Cli, Commands};

#[derive(Serialize)]
pub struct QueryResponse {
    pub phrase: String,
    pub took_s: f64,
    pub query_length: f64,
    pub terms: Vec<phrasedex_core::QueryTerm>,
    pub total_hits: usize,
    pub results: Vec<QueryHit>,
}

#[derive(Serialize)]
pub struct QueryHit {
    pub doc_id: u32,
    pub document: String,
    pub position: u32,
    pub score: f64,
}

pub fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    match cli.command {
        Commands::Build { collection, extension, keep_stopwords, stopwords_file } => {
            build(&collection, extension, &keep_stopwords, stopwords_file.as_deref(), out)
        }
        Commands::PrintIndex { collection } => print_index(&collection, out),
        Commands::PrintVectorSpace { collection } => print_vector_space(&collection, out),
        Commands::Query { collection, phrase, json } => query(&collection, &phrase, json, out),
    }
}

pub fn build<W: Write>(
    collection: &Path,
    extension: String,
    keep_stopwords: &[String],
    stopwords_file: Option<&Path>,
    out: &mut W,
) -> Result<()> {
    // A custom list is taken as written; the built-in one keeps DEFAULT_KEPT.
    let stop_words = match stopwords_file {
        Some(file) => read_stopwords(file)?,
        None => StopWords::english().without(DEFAULT_KEPT),
    };
    let options = BuildOptions { extension, tokenizer: Tokenizer::new(stop_words.without(keep_stopwords)) };
    let (index, _) = build_collection(collection, &options)
        .with_context(|| format!("failed to build collection {}", collection.display()))?;
    writeln!(
        out,
        "Indexed {} documents, {} terms into {}",
        index.num_docs(),
        index.dictionary.len(),
        collection.display()
    )?;
    Ok(())
}

pub fn print_index<W: Write>(collection: &Path, out: &mut W) -> Result<()> {
    let paths = built_paths(collection)?;
    let (header, index) = load_index_with_header(&paths).context("failed to load positional index")?;
    tracing::info!(created_at = %header.created_at, num_docs = header.num_docs, "loaded positional index");
    display::write_index(&index, out)?;
    Ok(())
}

pub fn print_vector_space<W: Write>(collection: &Path, out: &mut W) -> Result<()> {
    let paths = built_paths(collection)?;
    let space = load_vector_space(&paths).context("failed to load vector space")?;
    display::write_vector_space(&space, out)?;
    Ok(())
}

pub fn query<W: Write>(collection: &Path, phrase: &str, json: bool, out: &mut W) -> Result<()> {
    let start = std::time::Instant::now();
    let (index, space) = load_both(collection)?;
    let candidates = index.phrase_query(phrase);
    let ranked = space.rank(phrase, &candidates);
    let elapsed = start.elapsed();
    tracing::info!(phrase, hits = ranked.hits.len(), took_ms = elapsed.as_millis() as u64, "query complete");

    if json {
        let results = ranked
            .hits
            .iter()
            .map(|h| QueryHit {
                doc_id: h.candidate.doc_id,
                document: index.document(h.candidate.doc_id).map(|d| d.name()).unwrap_or_default(),
                position: h.candidate.position,
                score: h.score,
            })
            .collect::<Vec<_>>();
        let response = QueryResponse {
            phrase: phrase.to_string(),
            took_s: elapsed.as_secs_f64(),
            query_length: ranked.length,
            total_hits: results.len(),
            terms: ranked.terms,
            results,
        };
        serde_json::to_writer_pretty(&mut *out, &response)?;
        writeln!(out)?;
    } else {
        display::write_query(&index, &ranked, out)?;
    }
    Ok(())
}

fn load_both(collection: &Path) -> Result<(PositionalIndex, VectorSpace)> {
    let paths = built_paths(collection)?;
    load_snapshots(&paths).context("failed to load index snapshots")
}

/// Checks that the collection exists and both snapshots were built.
fn built_paths(collection: &Path) -> Result<IndexPaths> {
    if !collection.is_dir() {
        return Err(Error::CollectionNotFound(PathBuf::from(collection)).into());
    }
    let paths = IndexPaths::new(collection);
    paths.require_built()?;
    Ok(paths)
}

fn read_stopwords(file: &Path) -> Result<StopWords> {
    let text = fs::read_to_string(file).with_context(|| format!("failed to read stop words from {}", file.display()))?;
    let words: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();
    tracing::debug!(file = %file.display(), count = words.len(), "loaded stop words");
    Ok(StopWords::from_words(words))
}
