use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::{Candidate, DocId, Document, PositionalIndex, Tokenizer};

/// Weighting schemes of one term across every document of the collection.
/// The per-document vectors are dense and indexed by `DocId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermDocumentData {
    pub df: u32,
    pub idf: f64,
    pub tf: Vec<u32>,
    /// 1 + ln(tf); reported only, not part of the document vector.
    pub w_tf: Vec<f64>,
    /// tf × idf with raw tf.
    pub tf_idf: Vec<f64>,
    pub norm_tf_idf: Vec<f64>,
}

/// Per-document weight selectable for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightField {
    Tf,
    WTf,
    TfIdf,
    NormTfIdf,
}

impl WeightField {
    pub fn title(self) -> &'static str {
        match self {
            WeightField::Tf => "Term Frequency",
            WeightField::WTf => "w tf (1 + log tf)",
            WeightField::TfIdf => "TF-IDF",
            WeightField::NormTfIdf => "Normalized tf*idf",
        }
    }
}

impl TermDocumentData {
    pub fn weight(&self, field: WeightField, doc_id: DocId) -> f64 {
        let i = doc_id as usize;
        match field {
            WeightField::Tf => self.tf.get(i).map_or(0.0, |&tf| tf as f64),
            WeightField::WTf => self.w_tf.get(i).copied().unwrap_or(0.0),
            WeightField::TfIdf => self.tf_idf.get(i).copied().unwrap_or(0.0),
            WeightField::NormTfIdf => self.norm_tf_idf.get(i).copied().unwrap_or(0.0),
        }
    }
}

/// Query-side statistics for one phrase term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryTerm {
    pub term: String,
    pub tf: u32,
    pub df: u32,
    pub idf: f64,
    pub w_tf: f64,
    /// w_tf × idf; the query side is dampened.
    pub tf_idf: f64,
    pub norm_tf_idf: f64,
}

/// Evaluation of a phrase against one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub doc_id: DocId,
    pub terms: Vec<QueryTerm>, // first-seen order
    pub length: f64,
    pub cosine_similarity: f64,
    /// Per-term contribution to the similarity; zero for unknown terms.
    pub products: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub candidate: Candidate,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub terms: Vec<QueryTerm>,
    pub length: f64,
    pub hits: Vec<RankedCandidate>, // descending score, stable
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorSpace {
    pub tokenizer: Tokenizer,
    pub documents: Vec<Document>,
    pub terms: BTreeMap<String, TermDocumentData>,
    pub document_lengths: Vec<f64>,
}

impl VectorSpace {
    pub fn build(index: &PositionalIndex) -> Self {
        let n = index.num_docs() as usize;
        let mut squared = vec![0.0f64; n];
        let mut terms = BTreeMap::new();

        for (term, list) in &index.dictionary {
            let df = list.df();
            let idf = (n as f64 / df as f64).log10();
            let mut data = TermDocumentData {
                df,
                idf,
                tf: vec![0; n],
                w_tf: vec![0.0; n],
                tf_idf: vec![0.0; n],
                norm_tf_idf: vec![0.0; n],
            };
            for posting in &list.postings {
                let d = posting.doc_id as usize;
                let tf = posting.positions.len() as u32;
                data.tf[d] = tf;
                data.w_tf[d] = 1.0 + (tf as f64).ln();
                data.tf_idf[d] = tf as f64 * idf;
                squared[d] += data.tf_idf[d] * data.tf_idf[d];
            }
            terms.insert(term.clone(), data);
        }

        let document_lengths: Vec<f64> = squared.into_iter().map(f64::sqrt).collect();
        for data in terms.values_mut() {
            for (d, &len) in document_lengths.iter().enumerate() {
                data.norm_tf_idf[d] = if len > 0.0 { data.tf_idf[d] / len } else { 0.0 };
            }
        }

        tracing::info!(num_docs = n, num_terms = terms.len(), "built vector space");
        Self { tokenizer: index.tokenizer.clone(), documents: index.documents.clone(), terms, document_lengths }
    }

    pub fn num_docs(&self) -> u32 {
        self.documents.len() as u32
    }

    pub fn term(&self, term: &str) -> Option<&TermDocumentData> {
        self.terms.get(term)
    }

    pub fn document_length(&self, doc_id: DocId) -> f64 {
        self.document_lengths.get(doc_id as usize).copied().unwrap_or(0.0)
    }

    /// Query term table and its vector length.
    pub fn query_vector(&self, phrase: &str) -> (Vec<QueryTerm>, f64) {
        let mut terms: Vec<QueryTerm> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        for term in self.tokenizer.terms(phrase) {
            if let Some(&i) = seen.get(&term) {
                let q = &mut terms[i];
                q.tf += 1;
                q.w_tf = 1.0 + (q.tf as f64).ln();
                continue;
            }
            let (df, idf) = self.terms.get(&term).map_or((0, 0.0), |d| (d.df, d.idf));
            seen.insert(term.clone(), terms.len());
            terms.push(QueryTerm { term, tf: 1, df, idf, w_tf: 1.0, tf_idf: 0.0, norm_tf_idf: 0.0 });
        }

        let mut length = 0.0f64;
        for q in terms.iter_mut() {
            q.tf_idf = q.w_tf * q.idf;
            length += q.tf_idf * q.tf_idf;
        }
        let length = length.sqrt();
        for q in terms.iter_mut() {
            q.norm_tf_idf = if length > 0.0 { q.tf_idf / length } else { 0.0 };
        }
        (terms, length)
    }

    /// Cosine similarity of the phrase against one document.
    pub fn query_result(&self, phrase: &str, doc_id: DocId) -> QueryResult {
        let (terms, length) = self.query_vector(phrase);
        self.score(terms, length, doc_id)
    }

    fn score(&self, terms: Vec<QueryTerm>, length: f64, doc_id: DocId) -> QueryResult {
        let mut cosine_similarity = 0.0;
        let mut products = Vec::with_capacity(terms.len());
        for q in &terms {
            let product = self
                .terms
                .get(&q.term)
                .map_or(0.0, |d| q.norm_tf_idf * d.weight(WeightField::NormTfIdf, doc_id));
            cosine_similarity += product;
            products.push((q.term.clone(), product));
        }
        QueryResult { doc_id, terms, length, cosine_similarity, products }
    }

    /// Scores each candidate's document and orders candidates by descending
    /// similarity; equal scores keep their input order.
    pub fn rank(&self, phrase: &str, candidates: &[Candidate]) -> RankedResult {
        let (terms, length) = self.query_vector(phrase);
        let mut scores: HashMap<DocId, f64> = HashMap::new();
        let mut hits: Vec<RankedCandidate> = candidates
            .iter()
            .map(|&candidate| {
                let score = *scores
                    .entry(candidate.doc_id)
                    .or_insert_with(|| self.score(terms.clone(), length, candidate.doc_id).cosine_similarity);
                RankedCandidate { candidate, score }
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        tracing::debug!(phrase, candidates = candidates.len(), documents = scores.len(), "ranked candidates");
        RankedResult { terms, length, hits }
    }

    /// Checks that every vector matches the document table.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let n = self.documents.len();
        if self.document_lengths.len() != n {
            return Err(format!("{} document lengths for {n} documents", self.document_lengths.len()));
        }
        for (i, doc) in self.documents.iter().enumerate() {
            if doc.id as usize != i {
                return Err(format!("document table entry {i} has id {}", doc.id));
            }
        }
        for (term, data) in &self.terms {
            let dims = [data.tf.len(), data.w_tf.len(), data.tf_idf.len(), data.norm_tf_idf.len()];
            if dims.iter().any(|&len| len != n) {
                return Err(format!("weights for '{term}' do not cover {n} documents"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexBuilder;
    use crate::StopWords;

    fn space_of(texts: &[&str]) -> VectorSpace {
        let mut b = IndexBuilder::new(Tokenizer::new(StopWords::none()));
        for (i, text) in texts.iter().enumerate() {
            b.add_document(Document::new(i as DocId, format!("{i}.txt")), text).unwrap();
        }
        VectorSpace::build(&b.finish())
    }

    #[test]
    fn repeated_query_terms_are_dampened() {
        let vs = space_of(&["apple pie", "banana"]);
        let (terms, _) = vs.query_vector("apple apple apple");
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].tf, 3);
        assert!((terms[0].w_tf - (1.0 + 3f64.ln())).abs() < 1e-12);
        assert!((terms[0].tf_idf - terms[0].w_tf * 2f64.log10()).abs() < 1e-12);
    }

    #[test]
    fn unknown_terms_record_zero_products() {
        let vs = space_of(&["apple pie", "banana"]);
        let r = vs.query_result("apple durian", 0);
        assert_eq!(r.terms[1].df, 0);
        assert_eq!(r.terms[1].idf, 0.0);
        assert_eq!(r.products[1], ("durian".to_string(), 0.0));
        assert!(r.cosine_similarity > 0.0);
    }

    #[test]
    fn weight_field_reads_vectors() {
        let vs = space_of(&["kiwi kiwi", "lime"]);
        let kiwi = vs.term("kiwi").unwrap();
        assert_eq!(kiwi.weight(WeightField::Tf, 0), 2.0);
        assert_eq!(kiwi.weight(WeightField::Tf, 1), 0.0);
        assert!((kiwi.weight(WeightField::TfIdf, 0) - 2.0 * 2f64.log10()).abs() < 1e-12);
        assert!((kiwi.weight(WeightField::NormTfIdf, 0) - 1.0).abs() < 1e-12);
    }
}
