use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use multilookup::config::PipelineConfig;
use multilookup::dns::GaiResolver;
use multilookup::pipeline::{OutputWriter, Pipeline};
use std::fs;
use std::io;
use std::sync::Arc;

/// End-to-end run over IP literals, so no DNS traffic is generated.
/// Measures tokenizing, queueing and output overhead per pool size.
fn benchmark_pipeline(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let inputs: Vec<_> = (0..4)
        .map(|f| {
            let path = dir.path().join(format!("in-{f}.txt"));
            let body: Vec<String> = (0..2_500).map(|i| format!("10.{f}.{}.{}", i / 250, i % 250)).collect();
            fs::write(&path, body.join("\n")).unwrap();
            path
        })
        .collect();

    let mut group = c.benchmark_group("pipeline_ip_literals");
    for threads in [1usize, 4, 8] {
        let pipeline = Pipeline::new(
            PipelineConfig {
                threads,
                queue_capacity: 16,
            },
            Arc::new(GaiResolver::new()),
        );
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, _| {
            b.iter(|| pipeline.run(&inputs, OutputWriter::new(io::sink())).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_pipeline);
criterion_main!(benches);
