use std::hint::black_box;
use std::path::Path;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use search_index_explorer::{parse_search_index, write_search_index};

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name);
    std::fs::read_to_string(path).expect("fixture")
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_search_index");

    for name in ["api_searchindex.js", "guide_searchindex.js", "modules_searchindex.js"] {
        let text = fixture(name);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &text, |b, text| {
            b.iter(|| parse_search_index(black_box(text)).expect("parse"));
        });
    }

    group.finish();
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_search_index");

    for name in ["guide_searchindex.js", "modules_searchindex.js"] {
        let index = parse_search_index(&fixture(name)).expect("parse");
        group.bench_with_input(BenchmarkId::from_parameter(name), &index, |b, index| {
            b.iter(|| write_search_index(black_box(index)).expect("write"));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_write);
criterion_main!(benches);
