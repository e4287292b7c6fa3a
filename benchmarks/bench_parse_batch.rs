use std::hint::black_box;
use std::io::Cursor;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use loglabel::parallel::{parse_batch, ParallelConfig, ParallelProcessor};
use loglabel::{extract_block_id, HdfsLineParser, RecordParser};

const LINES: [&str; 4] = [
    "081109 203615 148 INFO dfs.DataNode$PacketResponder: PacketResponder 1 for block blk_38865049064139660 terminating",
    "081109 203807 222 INFO dfs.DataNode$PacketResponder: Received block blk_-6952295868487656571 of size 67108864 from /10.251.39.179",
    "081109 204005 35 INFO dfs.FSNamesystem: BLOCK* NameSystem.addStoredBlock: blockMap updated: 10.251.73.220:50010 is added to blk_7128370237687728475 size 67108864",
    "081109 204132 26 WARN dfs.FSNamesystem: Replication monitor idle",
];

fn sample_input(lines: usize) -> String {
    let mut input = String::new();
    for i in 0..lines {
        input.push_str(LINES[i % LINES.len()]);
        input.push('\n');
    }
    input
}

fn bench_parse_line(c: &mut Criterion) {
    let parser = HdfsLineParser::new().unwrap();
    c.bench_function("parse_line_with_block", |b| {
        b.iter(|| black_box(parser.parse_line(0, black_box(LINES[1]))));
    });
    c.bench_function("parse_line_no_match", |b| {
        b.iter(|| black_box(parser.parse_line(0, black_box("not an hdfs log line at all"))));
    });
}

fn bench_extract_block_id(c: &mut Criterion) {
    c.bench_function("extract_block_id", |b| {
        b.iter(|| black_box(extract_block_id(black_box(LINES[2]))));
    });
}

fn bench_parse_batch(c: &mut Criterion) {
    let parser = HdfsLineParser::new().unwrap();
    let input = sample_input(10_000);
    let lines: Vec<(u64, &str)> = input
        .lines()
        .enumerate()
        .map(|(i, l)| (i as u64, l))
        .collect();

    let mut group = c.benchmark_group("parse_batch");
    group.throughput(Throughput::Elements(lines.len() as u64));
    group.bench_function("10k_lines", |b| {
        b.iter(|| black_box(parse_batch(&parser, lines.iter().copied())));
    });
    group.finish();
}

fn bench_parallel_pipeline(c: &mut Criterion) {
    let input = sample_input(50_000);
    let parser = Arc::new(HdfsLineParser::new().unwrap());

    let mut group = c.benchmark_group("parallel_pipeline");
    group.sample_size(10);
    group.throughput(Throughput::Elements(50_000));
    for workers in [1usize, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            b.iter(|| {
                let processor = ParallelProcessor::new(ParallelConfig {
                    num_workers: workers,
                    batch_size: 5_000,
                    max_in_flight: 0,
                });
                let mut output = Vec::with_capacity(input.len());
                processor
                    .process(Cursor::new(input.clone()), Arc::clone(&parser), &mut output)
                    .unwrap();
                black_box(output.len())
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse_line,
    bench_extract_block_id,
    bench_parse_batch,
    bench_parallel_pipeline
);
criterion_main!(benches);
