//! Performance benchmarks for torrent-month-filter
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Month filtering over large file lists
//! - Descriptor decoding and file list flattening
//! - Reduced torrent construction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_bytes::ByteBuf;

use torrent_month_filter::subset::build_subset;
use torrent_month_filter::torrent::{FileEntry, Info, MetaInfo};
use torrent_month_filter::MonthFilter;

/// Build a descriptor with `count` monthly files spread over decades.
fn dump_with_files(count: usize) -> MetaInfo {
    let files = (0..count)
        .map(|i| {
            let year = 2005 + (i / 12) % 20;
            let month = i % 12 + 1;
            let prefix = if i % 2 == 0 { "RC" } else { "RS" };
            FileEntry {
                length: 1024 * (i as u64 + 1),
                path: vec![
                    format!("{}", year),
                    format!("{}_{}-{:02}.zst", prefix, year, month),
                ],
            }
        })
        .collect();

    MetaInfo {
        announce: Some("http://tracker.example/announce".to_string()),
        announce_list: None,
        comment: None,
        created_by: None,
        creation_date: None,
        info: Info {
            name: "dumps".to_string(),
            piece_length: 1 << 22,
            pieces: ByteBuf::from(vec![0u8; 20 * 64]),
            length: None,
            files: Some(files),
            private: None,
            source: None,
        },
    }
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("month_filter");

    for size in [100usize, 1000, 10000].iter() {
        let files = dump_with_files(*size).files();
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("month_only", size), &files, |b, files| {
            let filter = MonthFilter::new(6, None).unwrap();
            b.iter(|| black_box(filter.apply(black_box(files))));
        });

        group.bench_with_input(BenchmarkId::new("month_and_year", size), &files, |b, files| {
            let filter = MonthFilter::new(6, Some(2015)).unwrap();
            b.iter(|| black_box(filter.apply(black_box(files))));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [100usize, 1000, 10000].iter() {
        let bytes = dump_with_files(*size).to_bytes().unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("from_bytes", size), &bytes, |b, bytes| {
            b.iter(|| black_box(MetaInfo::from_bytes(black_box(bytes)).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("decode_and_list", size), &bytes, |b, bytes| {
            b.iter(|| {
                let meta = MetaInfo::from_bytes(black_box(bytes)).unwrap();
                black_box(meta.files())
            });
        });
    }

    group.finish();
}

fn bench_subset(c: &mut Criterion) {
    let meta = dump_with_files(10000);
    let selected = MonthFilter::new(1, None).unwrap().apply(&meta.files());

    c.bench_function("build_subset_10000", |b| {
        b.iter(|| black_box(build_subset(black_box(&meta), black_box(&selected)).unwrap()));
    });
}

criterion_group!(benches, bench_filter, bench_decode, bench_subset);
criterion_main!(benches);
