use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use search_index_explorer::query::{parse_query, stem};

const WORDS: &[&str] = &[
    "experiments", "generalization", "activities", "durations", "visualize", "relational",
    "hopping", "database", "langgraph_log_parser", "exporting", "directory", "structure",
];

fn bench_stem(c: &mut Criterion) {
    let mut group = c.benchmark_group("stem");
    group.throughput(Throughput::Elements(WORDS.len() as u64));
    group.bench_function("vocabulary", |b| {
        b.iter(|| {
            for word in WORDS {
                black_box(stem(black_box(word)));
            }
        });
    });
    group.finish();
}

fn bench_parse_query(c: &mut Criterion) {
    c.bench_function("parse_query", |b| {
        b.iter(|| parse_query(black_box("Exporting event logs to CSV -sqlite with the graph_runner")));
    });
}

criterion_group!(benches, bench_stem, bench_parse_query);
criterion_main!(benches);
