use criterion::{criterion_group, criterion_main, Criterion};
use warta_core::normalize::normalize;

fn bench_normalize(c: &mut Criterion) {
    let text = include_str!("../../data/raw/berita1.txt");
    c.bench_function("normalize_news_article", |b| b.iter(|| normalize(text)));
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
