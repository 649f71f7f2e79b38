//! Benchmarks for chunking, lexical search, and similarity ranking.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lease_rag::{
    cosine_similarity, BatchConfig, ChunkerConfig, Embedder, MockEmbedder, PageChunker, PageText,
    RagSystem, RagSystemConfig,
};
use std::hint::black_box;
use std::time::Duration;

fn lease_pages(count: u32) -> Vec<PageText> {
    (1..=count)
        .map(|n| {
            let text = format!(
                "Section {n}. The tenant agrees to pay monthly rent of $1,500 \
                 due on the first day of each month. A security deposit of \
                 $1,500 is held against damages beyond normal wear and tear. \
                 Late payments accrue a fee of fifty dollars after a grace \
                 period of five days. "
            )
            .repeat(4);
            PageText::new(n, text)
        })
        .collect()
}

fn fast_config() -> RagSystemConfig {
    RagSystemConfig {
        batch: BatchConfig {
            batch_size: 100,
            batch_delay: Duration::ZERO,
        },
        ..RagSystemConfig::default()
    }
}

fn bench_chunking(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunking");
    for pages in [10u32, 50, 100] {
        let input = lease_pages(pages);
        let chunker = PageChunker::with_config(ChunkerConfig::default());
        group.bench_with_input(BenchmarkId::from_parameter(pages), &input, |b, input| {
            b.iter(|| chunker.chunk_pages(black_box(input)).unwrap());
        });
    }
    group.finish();
}

fn bench_semantic_retrieval(c: &mut Criterion) {
    let mut group = c.benchmark_group("semantic_retrieval");
    for pages in [10u32, 50, 100] {
        let mut system = RagSystem::new(MockEmbedder::new(384), fast_config());
        system.initialize(&lease_pages(pages)).unwrap();
        group.bench_function(BenchmarkId::from_parameter(pages), |b| {
            b.iter(|| {
                system
                    .retrieve(black_box("security deposit grace period"), 5)
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_lexical_retrieval(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexical_retrieval");
    for pages in [10u32, 50, 100] {
        let config = RagSystemConfig {
            use_embeddings: false,
            ..fast_config()
        };
        let mut system = RagSystem::new(MockEmbedder::new(8), config);
        system.initialize(&lease_pages(pages)).unwrap();
        group.bench_function(BenchmarkId::from_parameter(pages), |b| {
            b.iter(|| {
                system
                    .retrieve(black_box("security deposit grace period"), 5)
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_cosine_similarity(c: &mut Criterion) {
    let embedder = MockEmbedder::new(384);
    let a = embedder.embed("monthly rent due on the first").unwrap();
    let b_vec = embedder.embed("security deposit held against damages").unwrap();
    c.bench_function("cosine_similarity_384", |bench| {
        bench.iter(|| cosine_similarity(black_box(&a), black_box(&b_vec)));
    });
}

criterion_group!(
    benches,
    bench_chunking,
    bench_semantic_retrieval,
    bench_lexical_retrieval,
    bench_cosine_similarity
);
criterion_main!(benches);
