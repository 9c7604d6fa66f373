//! Benchmarks for the download, decompression and report pipelines.
//!
//! Run with: `cargo bench --package czds-bench`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use czds_bench::{MemoryTransport, gzip_members, synthetic_report, synthetic_zone};
use czds_lib::{
    DownloadConfig, DownloadTask, Downloader, ReportParser, decompress_file, scrub, to_rows,
};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn download_benchmark(c: &mut Criterion) {
    let rt = runtime();
    let zone = synthetic_zone(200_000);

    let mut group = c.benchmark_group("download");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));
    group.throughput(Throughput::Bytes(zone.len() as u64));

    for chunk_size in [8 * 1024, 64 * 1024, 1024 * 1024] {
        let dir = TempDir::new().unwrap();
        let transport = MemoryTransport::new("bench.txt", zone.clone(), chunk_size);
        let downloader = Downloader::new(
            transport,
            DownloadConfig {
                read_timeout: None,
                ..Default::default()
            },
        );
        let task = DownloadTask::new("https://bench/zones/bench.zone", dir.path());

        group.bench_with_input(
            BenchmarkId::new("chunk", chunk_size),
            &task,
            |b, task| {
                b.to_async(&rt).iter(|| async {
                    let result = downloader.download(task).await;
                    assert!(result.is_success());
                });
            },
        );
    }
    group.finish();
}

fn decompress_benchmark(c: &mut Criterion) {
    let rt = runtime();
    let zone = synthetic_zone(200_000);

    let mut group = c.benchmark_group("decompress");
    group.sample_size(20);
    group.throughput(Throughput::Bytes(zone.len() as u64));

    for members in [1, 16] {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bench.txt.gz");
        std::fs::write(&path, gzip_members(&zone, members)).unwrap();
        let cancel = CancellationToken::new();

        group.bench_with_input(BenchmarkId::new("members", members), &path, |b, path| {
            b.to_async(&rt).iter(|| async {
                decompress_file(path, false, &cancel).await.unwrap();
            });
        });
    }
    group.finish();
}

fn report_benchmark(c: &mut Criterion) {
    let rt = runtime();
    let account = "analyst@example.org";
    let report = synthetic_report(10_000, account);

    let mut group = c.benchmark_group("report");
    group.throughput(Throughput::Bytes(report.len() as u64));

    group.bench_function("scrub", |b| b.iter(|| scrub(&report, account)));

    for (name, parser) in [
        ("naive", ReportParser::Naive),
        ("delimited", ReportParser::Delimited),
    ] {
        group.bench_with_input(BenchmarkId::new("rows", name), &parser, |b, parser| {
            b.to_async(&rt)
                .iter(|| async { to_rows(&report, *parser).await.unwrap() });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    download_benchmark,
    decompress_benchmark,
    report_benchmark
);
criterion_main!(benches);
