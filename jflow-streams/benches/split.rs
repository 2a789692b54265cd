//! Benchmarks for the streaming array splitter

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jflow_streams::{LargeJsonArraySplitter, Message, MessageSplitter};
use serde_json::json;

fn build_payload(elements: usize) -> Message {
    let array: Vec<_> = (0..elements)
        .map(|i| {
            json!({
                "id": i,
                "user": format!("user-{i}"),
                "active": i % 2 == 0,
                "tags": ["a", "b", "c"],
            })
        })
        .collect();
    Message::from_text(serde_json::to_string(&array).unwrap())
}

fn bench_streaming_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming_split");
    for elements in [100usize, 1_000, 10_000] {
        let message = build_payload(elements);
        group.bench_with_input(
            BenchmarkId::from_parameter(elements),
            &message,
            |b, message| {
                b.iter(|| {
                    let count = LargeJsonArraySplitter::new()
                        .split(black_box(message))
                        .unwrap()
                        .count();
                    assert_eq!(count, elements);
                });
            },
        );
    }
    group.finish();
}

fn bench_buffer_sizes(c: &mut Criterion) {
    let message = build_payload(1_000);
    let mut group = c.benchmark_group("split_buffer_size");
    for buffer_size in [512usize, 8_192, 65_536] {
        group.bench_with_input(
            BenchmarkId::from_parameter(buffer_size),
            &buffer_size,
            |b, &buffer_size| {
                b.iter(|| {
                    LargeJsonArraySplitter::with_buffer_size(buffer_size)
                        .split(black_box(&message))
                        .unwrap()
                        .count()
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_streaming_split, bench_buffer_sizes);
criterion_main!(benches);
