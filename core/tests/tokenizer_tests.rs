use phrasedex_core::{StopWords, Tokenizer};

#[test]
fn it_lowercases_and_keeps_apostrophes() {
    let t = Tokenizer::new(StopWords::none());
    let words: Vec<String> = t.terms("Don't STOP believin'").collect();
    assert_eq!(words, vec!["don't", "stop", "believin'"]);
}

#[test]
fn it_filters_stopwords() {
    let t = Tokenizer::default();
    let words: Vec<String> = t.terms("The quick brown fox and the lazy dog").collect();
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert_eq!(words, vec!["quick", "brown", "fox", "lazy", "dog"]);
}

#[test]
fn it_keeps_duplicates() {
    let t = Tokenizer::new(StopWords::none());
    assert_eq!(t.terms("echo echo, echo").count(), 3);
}

#[test]
fn stop_only_text_is_empty() {
    let t = Tokenizer::default();
    assert_eq!(t.terms("the and of, a!").count(), 0);
    assert_eq!(t.terms("").count(), 0);
}

#[test]
fn custom_lists_can_keep_words() {
    let stop = StopWords::english().without(["the"]);
    let t = Tokenizer::new(stop);
    let words: Vec<String> = t.terms("the end").collect();
    assert_eq!(words, vec!["the", "end"]);
}
