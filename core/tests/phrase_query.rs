use phrasedex_core::index::IndexBuilder;
use phrasedex_core::{Candidate, DocId, Document, PositionalIndex, StopWords, Tokenizer};

fn build(stop: StopWords, texts: &[&str]) -> PositionalIndex {
    let mut b = IndexBuilder::new(Tokenizer::new(stop));
    for (i, text) in texts.iter().enumerate() {
        b.add_document(Document::new(i as DocId, format!("doc{i}.txt")), text).unwrap();
    }
    b.finish()
}

fn c(doc_id: DocId, position: u32) -> Candidate {
    Candidate { doc_id, position }
}

const CORPUS: &[&str] = &[
    "new york is a big city and new york never sleeps",
    "york new york new",
    "a new car in york",
    "big apple big apple in new york",
];

#[test]
fn postings_hold_their_invariants() {
    let idx = build(StopWords::none(), CORPUS);
    assert!(idx.validate().is_ok());
    for list in idx.dictionary.values() {
        assert_eq!(list.df() as usize, list.postings.len());
        assert!(list.postings.windows(2).all(|w| w[0].doc_id < w[1].doc_id));
        for p in &list.postings {
            assert_eq!(p.frequency as usize, p.positions.len());
            assert!(p.positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
    let terms: Vec<&String> = idx.dictionary.keys().collect();
    let mut sorted = terms.clone();
    sorted.sort();
    assert_eq!(terms, sorted);
}

#[test]
fn single_term_returns_every_occurrence() {
    let idx = build(StopWords::none(), CORPUS);
    let hits = idx.phrase_query("york");
    let expected: Vec<Candidate> = idx.postings("york").unwrap().candidates().into_iter().collect();
    assert_eq!(hits, expected);
    assert_eq!(hits.len(), 6);
}

#[test]
fn two_term_phrase_requires_adjacency() {
    let idx = build(StopWords::none(), CORPUS);
    let hits = idx.phrase_query("new york");
    assert_eq!(hits, vec![c(0, 0), c(0, 7), c(1, 1), c(3, 5)]);
    // "new car in york" in doc 2 is never adjacent.
    assert!(hits.iter().all(|h| h.doc_id != 2));
}

#[test]
fn three_term_phrase() {
    let idx = build(StopWords::none(), CORPUS);
    assert_eq!(idx.phrase_query("big apple big"), vec![c(3, 0)]);
    assert_eq!(idx.phrase_query("in new york"), vec![c(3, 4)]);
    assert!(idx.phrase_query("york big apple").is_empty());
}

#[test]
fn positions_skip_stop_words() {
    let idx = build(StopWords::from_words(["a", "is", "and", "in"]), CORPUS);
    // "big city" stays adjacent and "car york" becomes adjacent once "in" is dropped.
    assert_eq!(idx.phrase_query("york big city"), vec![c(0, 1)]);
    assert_eq!(idx.phrase_query("car in york"), vec![c(2, 1)]);
}

#[test]
fn unknown_term_empties_the_result() {
    let idx = build(StopWords::none(), CORPUS);
    assert!(idx.phrase_query("new jersey").is_empty());
    assert!(idx.phrase_query("jersey new york").is_empty());
    assert!(idx.phrase_query("zzz").is_empty());
}

#[test]
fn empty_and_stop_only_phrases_are_empty() {
    let idx = build(StopWords::from_words(["the"]), &["the cat sat"]);
    assert!(idx.phrase_query("").is_empty());
    assert!(idx.phrase_query("the the").is_empty());
    assert!(idx.phrase_query("!!! ...").is_empty());
}

#[test]
fn gap_of_two_is_not_a_match() {
    let idx = build(StopWords::none(), &["red green blue", "red blue"]);
    assert_eq!(idx.phrase_query("red blue"), vec![c(1, 0)]);
    assert_eq!(idx.phrase_query("red green blue"), vec![c(0, 0)]);
}

#[test]
fn phrase_text_is_case_insensitive() {
    let idx = build(StopWords::none(), &["Hello World"]);
    assert_eq!(idx.phrase_query("HELLO world"), vec![c(0, 0)]);
}
