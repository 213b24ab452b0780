//! Benchmarks for archive creation and verification.
//!
//! Measures create and verify throughput across codecs, file counts and
//! checksum algorithms.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use archive_tools_core::Archive;
use archive_tools_core::ChecksumAlgorithm;
use archive_tools_core::CompressionCodec;
use archive_tools_core::CreationConfig;
use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use std::fs;
use std::hint::black_box;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates `base/` with `file_count` files of 1 KiB each.
fn create_test_tree(temp: &TempDir, file_count: usize) {
    let dir = temp.path().join("base");
    fs::create_dir_all(&dir).unwrap();
    let content = "x".repeat(1024);
    for i in 0..file_count {
        fs::write(dir.join(format!("file_{i:05}.txt")), &content).unwrap();
    }
}

fn create(source: &TempDir, out: &Path, config: &CreationConfig) {
    let config = config.clone().with_workdir(source.path());
    let _ = fs::remove_file(out);
    Archive::new(out)
        .create(&[PathBuf::from("base")], &config)
        .unwrap();
}

fn benchmark_codecs(c: &mut Criterion) {
    let source = TempDir::new().unwrap();
    create_test_tree(&source, 100);
    let out = TempDir::new().unwrap();

    let mut group = c.benchmark_group("create_codec");
    group.throughput(Throughput::Bytes(100 * 1024));
    let codecs = std::iter::once(None).chain(CompressionCodec::ALL.into_iter().map(Some));
    for codec in codecs {
        let name = codec.map_or("none", CompressionCodec::name);
        let path = out.path().join(format!("{name}.tar"));
        let config = CreationConfig::default().with_compression(codec);
        group.bench_with_input(BenchmarkId::from_parameter(name), &config, |b, config| {
            b.iter(|| create(&source, &path, black_box(config)));
        });
    }
    group.finish();
}

fn benchmark_file_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_file_count");
    for count in [10, 100, 1000] {
        let source = TempDir::new().unwrap();
        create_test_tree(&source, count);
        let out = TempDir::new().unwrap();
        let path = out.path().join("base.tar");
        let config = CreationConfig::default();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| create(&source, &path, &config));
        });
    }
    group.finish();
}

fn benchmark_checksums(c: &mut Criterion) {
    let source = TempDir::new().unwrap();
    create_test_tree(&source, 100);
    let out = TempDir::new().unwrap();

    let mut group = c.benchmark_group("create_checksum");
    for algorithm in [
        ChecksumAlgorithm::Sha256,
        ChecksumAlgorithm::Sha512,
        ChecksumAlgorithm::Blake3,
    ] {
        let path = out.path().join(format!("{algorithm}.tar"));
        let config = CreationConfig::default().with_checksums(vec![algorithm]);
        group.bench_with_input(
            BenchmarkId::from_parameter(algorithm),
            &config,
            |b, config| {
                b.iter(|| create(&source, &path, config));
            },
        );
    }
    group.finish();
}

fn benchmark_verify(c: &mut Criterion) {
    let source = TempDir::new().unwrap();
    create_test_tree(&source, 100);
    let out = TempDir::new().unwrap();

    let mut group = c.benchmark_group("verify");
    for codec in [None, Some(CompressionCodec::Gzip), Some(CompressionCodec::Zstd)] {
        let name = codec.map_or("none", CompressionCodec::name);
        let path = out.path().join(format!("{name}.tar"));
        create(
            &source,
            &path,
            &CreationConfig::default().with_compression(codec),
        );
        group.bench_with_input(BenchmarkId::from_parameter(name), &path, |b, path| {
            b.iter(|| Archive::open(path).unwrap().verify().unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_codecs,
    benchmark_file_counts,
    benchmark_checksums,
    benchmark_verify
);
criterion_main!(benches);
