use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::{DocId, Document, DocumentCollection, Error, Position, Result, Tokenizer};

/// Occurrences of one term in one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub frequency: u32,
    pub positions: Vec<Position>, // strictly increasing
}

impl Posting {
    fn new(doc_id: DocId, position: Position) -> Self {
        Self { doc_id, frequency: 1, positions: vec![position] }
    }

    fn push(&mut self, position: Position) {
        self.frequency += 1;
        self.positions.push(position);
    }

    /// Positions `p` in `self` such that `other` holds `p + k`.
    fn offset_matches(&self, other: &Posting, k: Position, out: &mut BTreeSet<Candidate>) {
        let (mut i, mut j) = (0, 0);
        while i < self.positions.len() && j < other.positions.len() {
            let pos = self.positions[i];
            let other_pos = other.positions[j];
            // i64 keeps the gap signed when `other` is ahead.
            let gap = other_pos as i64 - pos as i64;
            match gap.cmp(&(k as i64)) {
                Ordering::Equal => {
                    out.insert(Candidate { doc_id: self.doc_id, position: pos });
                    i += 1;
                    j += 1;
                }
                Ordering::Greater => i += 1,
                Ordering::Less => j += 1,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingsList {
    pub term: String,
    pub postings: Vec<Posting>, // sorted by doc_id
}

impl PostingsList {
    fn new(term: String) -> Self {
        Self { term, postings: Vec::new() }
    }

    /// Document frequency.
    pub fn df(&self) -> u32 {
        self.postings.len() as u32
    }

    fn record(&mut self, doc_id: DocId, position: Position) {
        match self.postings.last_mut() {
            Some(last) if last.doc_id == doc_id => last.push(position),
            _ => self.postings.push(Posting::new(doc_id, position)),
        }
    }

    /// Every occurrence of the term as a candidate.
    pub fn candidates(&self) -> BTreeSet<Candidate> {
        self.postings
            .iter()
            .flat_map(|p| p.positions.iter().map(move |&position| Candidate { doc_id: p.doc_id, position }))
            .collect()
    }

    /// Anchors in `self` followed by `other` exactly `k` positions later, found by
    /// a merge-join on document id and a two-pointer merge of positions.
    pub fn offset_intersect(&self, other: &PostingsList, k: Position) -> BTreeSet<Candidate> {
        let mut out = BTreeSet::new();
        let (mut i, mut j) = (0, 0);
        while i < self.postings.len() && j < other.postings.len() {
            let a = &self.postings[i];
            let b = &other.postings[j];
            match a.doc_id.cmp(&b.doc_id) {
                Ordering::Equal => {
                    a.offset_matches(b, k, &mut out);
                    i += 1;
                    j += 1;
                }
                Ordering::Greater => j += 1,
                Ordering::Less => i += 1,
            }
        }
        out
    }
}

/// Anchor of a phrase match: the position of the phrase's first term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub doc_id: DocId,
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionalIndex {
    pub tokenizer: Tokenizer,
    pub documents: Vec<Document>, // indexed by DocId
    pub dictionary: BTreeMap<String, PostingsList>,
}

impl PositionalIndex {
    /// Reads and indexes every document of the collection in id order.
    pub fn build(tokenizer: Tokenizer, collection: &DocumentCollection) -> Result<Self> {
        let mut builder = IndexBuilder::new(tokenizer);
        for doc in collection.documents()? {
            let text = collection.read(&doc)?;
            builder.add_document(doc, &text)?;
        }
        let index = builder.finish();
        tracing::info!(num_docs = index.num_docs(), num_terms = index.dictionary.len(), "built positional index");
        Ok(index)
    }

    pub fn num_docs(&self) -> u32 {
        self.documents.len() as u32
    }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> {
        self.documents.get(doc_id as usize)
    }

    pub fn postings(&self, term: &str) -> Option<&PostingsList> {
        self.dictionary.get(term)
    }

    /// Candidates where the phrase occurs contiguously and in order, sorted by
    /// document then position. Empty if the phrase has no terms or any term is
    /// not in the index.
    pub fn phrase_query(&self, phrase: &str) -> Vec<Candidate> {
        let lists: Option<Vec<&PostingsList>> = self.tokenizer.terms(phrase).map(|t| self.dictionary.get(&t)).collect();
        let lists = match lists {
            Some(lists) if !lists.is_empty() => lists,
            _ => {
                tracing::debug!(phrase, "phrase has no resolvable terms");
                return Vec::new();
            }
        };

        let first = lists[0];
        let mut result = first.candidates();
        for (k, list) in lists.iter().enumerate().skip(1) {
            if result.is_empty() {
                break;
            }
            let matches = first.offset_intersect(list, k as Position);
            result = result.intersection(&matches).copied().collect();
        }
        tracing::debug!(phrase, terms = lists.len(), matches = result.len(), "phrase query");
        result.into_iter().collect()
    }

    /// Checks the structural invariants a loaded snapshot must satisfy.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (i, doc) in self.documents.iter().enumerate() {
            if doc.id as usize != i {
                return Err(format!("document table entry {i} has id {}", doc.id));
            }
        }
        for (term, list) in &self.dictionary {
            if &list.term != term {
                return Err(format!("postings list for '{term}' is labelled '{}'", list.term));
            }
            if list.postings.is_empty() {
                return Err(format!("term '{term}' has no postings"));
            }
            let mut prev_doc: Option<DocId> = None;
            for p in &list.postings {
                if p.doc_id >= self.num_docs() {
                    return Err(format!("term '{term}' references unknown document {}", p.doc_id));
                }
                if prev_doc.is_some_and(|d| d >= p.doc_id) {
                    return Err(format!("postings for '{term}' are not in ascending document order"));
                }
                prev_doc = Some(p.doc_id);
                if p.frequency as usize != p.positions.len() || p.positions.is_empty() {
                    return Err(format!("posting for '{term}' in document {} has a bad frequency", p.doc_id));
                }
                if p.positions.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(format!("positions for '{term}' in document {} are not increasing", p.doc_id));
                }
            }
        }
        Ok(())
    }
}

/// Accumulates postings one whole document at a time.
#[derive(Debug)]
pub struct IndexBuilder {
    tokenizer: Tokenizer,
    documents: Vec<Document>,
    dictionary: BTreeMap<String, PostingsList>,
}

impl IndexBuilder {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer, documents: Vec::new(), dictionary: BTreeMap::new() }
    }

    /// Indexes `text` as document `doc`. Ids must be dense and ascending, which
    /// keeps each document's postings contiguous.
    pub fn add_document(&mut self, doc: Document, text: &str) -> Result<()> {
        let expected = self.documents.len() as DocId;
        if doc.id != expected {
            return Err(Error::DocumentOrder { expected, found: doc.id });
        }
        let mut num_terms = 0usize;
        for (pos, term) in self.tokenizer.terms(text).enumerate() {
            self.dictionary
                .entry(term)
                .or_insert_with_key(|t| PostingsList::new(t.clone()))
                .record(doc.id, pos as Position);
            num_terms += 1;
        }
        tracing::debug!(doc_id = doc.id, doc = %doc.path.display(), num_terms, "indexed document");
        self.documents.push(doc);
        Ok(())
    }

    pub fn finish(mut self) -> PositionalIndex {
        for list in self.dictionary.values_mut() {
            list.postings.sort_by_key(|p| p.doc_id);
        }
        PositionalIndex { tokenizer: self.tokenizer, documents: self.documents, dictionary: self.dictionary }
    }
}
