use criterion::{criterion_group, criterion_main, Criterion};
use phrasedex_core::index::IndexBuilder;
use phrasedex_core::{DocId, Document, PositionalIndex, Tokenizer, VectorSpace};

const WORDS: &[&str] = &[
    "river", "stone", "bridge", "north", "lantern", "harbor", "meadow", "signal", "copper", "orchard",
    "winter", "engine", "valley", "thread", "market", "summit",
];

fn corpus(num_docs: usize, doc_len: usize) -> Vec<String> {
    (0..num_docs)
        .map(|d| {
            (0..doc_len)
                .map(|i| WORDS[(d * 7 + i * 13 + i / 5) % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn build(texts: &[String]) -> PositionalIndex {
    let mut b = IndexBuilder::new(Tokenizer::default());
    for (i, text) in texts.iter().enumerate() {
        b.add_document(Document::new(i as DocId, format!("{i}.txt")), text).expect("ordered ids");
    }
    b.finish()
}

fn bench_tokenize(c: &mut Criterion) {
    let text = corpus(1, 5_000).remove(0);
    let tokenizer = Tokenizer::default();
    c.bench_function("tokenize_5k_words", |b| b.iter(|| tokenizer.terms(&text).count()));
}

fn bench_phrase(c: &mut Criterion) {
    let texts = corpus(500, 400);
    let index = build(&texts);
    let space = VectorSpace::build(&index);
    c.bench_function("build_500_docs", |b| b.iter(|| build(&texts)));
    c.bench_function("phrase_query_3_terms", |b| b.iter(|| index.phrase_query("river bridge lantern")));
    c.bench_function("phrase_query_and_rank", |b| {
        b.iter(|| {
            let hits = index.phrase_query("stone north");
            space.rank("stone north", &hits)
        })
    });
}

criterion_group!(benches, bench_tokenize, bench_phrase);
criterion_main!(benches);
