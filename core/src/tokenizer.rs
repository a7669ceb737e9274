use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

lazy_static! {
    // Letters and the apostrophe form tokens; anything else ends one.
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}']+").expect("valid regex");
}

const ENGLISH: &[&str] = &[
    "i","me","my","myself","we","our","ours","ourselves","you","you're","you've","you'll","you'd","your","yours",
    "yourself","yourselves","he","him","his","himself","she","she's","her","hers","herself","it","it's","its","itself",
    "they","them","their","theirs","themselves","what","which","who","whom","this","that","that'll","these","those",
    "am","is","are","was","were","be","been","being","have","has","had","having","do","does","did","doing",
    "a","an","the","and","but","if","or","because","as","until","while","of","at","by","for","with","about","against",
    "between","into","through","during","before","after","above","below","to","from","up","down","in","out","on","off",
    "over","under","again","further","then","once","here","there","when","where","why","how","all","any","both","each",
    "few","more","most","other","some","such","no","nor","not","only","own","same","so","than","too","very",
    "s","t","can","will","just","don","don't","should","should've","now","d","ll","m","o","re","ve","y",
    "ain","aren","aren't","couldn","couldn't","didn","didn't","doesn","doesn't","hadn","hadn't","hasn","hasn't",
    "haven","haven't","isn","isn't","ma","mightn","mightn't","mustn","mustn't","needn","needn't","shan","shan't",
    "shouldn","shouldn't","wasn","wasn't","weren","weren't","won","won't","wouldn","wouldn't",
];

/// Stop words that stay searchable unless configured otherwise.
pub const DEFAULT_KEPT: &[&str] = &["in", "to", "where"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopWords {
    words: BTreeSet<String>,
}

impl StopWords {
    /// The full English stop list.
    pub fn english() -> Self {
        Self::from_words(ENGLISH.iter().copied())
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { words: words.into_iter().map(|w| w.as_ref().to_lowercase()).collect() }
    }

    pub fn none() -> Self {
        Self { words: BTreeSet::new() }
    }

    /// Removes `kept` from the list so those words are indexed.
    pub fn without<I, S>(mut self, kept: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for w in kept {
            self.words.remove(&w.as_ref().to_lowercase());
        }
        self
    }

    pub fn contains(&self, term: &str) -> bool {
        self.words.contains(term)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::english().without(DEFAULT_KEPT.iter().copied())
    }
}

/// Splits text into lowercase terms with stop words removed. Duplicates are kept;
/// a term's index in the returned sequence is its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokenizer {
    stop_words: StopWords,
}

impl Tokenizer {
    pub fn new(stop_words: StopWords) -> Self {
        Self { stop_words }
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// Lazily yields the terms of `text`. Each call starts a fresh scan.
    pub fn terms<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        RE.find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .filter(move |term| !self.stop_words.contains(term))
    }
}
