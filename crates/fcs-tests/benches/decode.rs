use fcs_decoder::{DecodeOptions, FcsDecoder};
use fcs_fixtures::{FcsBuilder, Layout};
use fcs_tests::{aria_like, synthetic_events};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

fn options(pairs: &[(&str, &str)]) -> DecodeOptions {
    DecodeOptions::from_pairs(pairs.iter().copied()).unwrap()
}

fn bench_decode_small(c: &mut Criterion) {
    let file = aria_like(100).build();

    c.bench_function("decode_small", |b| {
        b.iter(|| FcsDecoder::decode(&file).unwrap());
    });
}

fn bench_decode_formats(c: &mut Criterion) {
    let file = aria_like(10_000).build();
    let mut group = c.benchmark_group("decode_formats");

    for (name, pairs) in [
        ("as_none", vec![("dataFormat", "asNone")]),
        ("as_number", vec![("dataFormat", "asNumber"), ("eventsToRead", "0")]),
        ("as_string", vec![("dataFormat", "asString"), ("eventsToRead", "0")]),
        ("as_both", vec![("dataFormat", "asBoth"), ("eventsToRead", "0")]),
    ] {
        let options = options(&pairs);
        group.bench_function(name, |b| {
            b.iter(|| FcsDecoder::decode_with(&file, &options).unwrap());
        });
    }

    group.finish();
}

fn bench_decode_grouping(c: &mut Criterion) {
    let file = aria_like(10_000).build();
    let by_event = options(&[("eventsToRead", "0"), ("dataFormat", "asBoth")]);
    let by_param = options(&[("eventsToRead", "0"), ("dataFormat", "asBoth"), ("groupBy", "byParam")]);

    let mut group = c.benchmark_group("decode_grouping");
    group.bench_function("by_event", |b| {
        b.iter(|| FcsDecoder::decode_with(&file, &by_event).unwrap());
    });
    group.bench_function("by_param", |b| {
        b.iter(|| FcsDecoder::decode_with(&file, &by_param).unwrap());
    });
    group.finish();
}

fn bench_decode_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_throughput");
    let all_numbers = options(&[("eventsToRead", "0"), ("dataFormat", "asNumber")]);

    for events in [1_000, 10_000, 100_000] {
        let mut builder = FcsBuilder::new(&["A", "B", "C", "D", "E", "F"]);
        builder.layout(Layout::Int16).events(synthetic_events(events, 6));
        let file = builder.build();

        group.throughput(Throughput::Bytes(file.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("decode", format!("{events}ev")),
            &file,
            |b, f| b.iter(|| FcsDecoder::decode_with(f, &all_numbers).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_decode_small,
    bench_decode_formats,
    bench_decode_grouping,
    bench_decode_throughput
);
criterion_main!(benches);
