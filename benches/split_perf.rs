use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::prelude::*;
use rand_pcg::Pcg64;
use slog::{o, Discard, Logger};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use walsplit::{split_log, LocalFs, SplitConfig, WalEntry};

fn generate_logs(src: &Path, logs: usize, entries_per_log: usize, regions: u64, seed: u64) {
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut seq = 0u64;
    for i in 0..logs {
        let mut writer =
            BufWriter::new(File::create(src.join(format!("log.{:03}", i))).unwrap());
        for _ in 0..entries_per_log {
            let region = format!("region-{:02}", rng.gen_range(0..regions));
            let entry = WalEntry::new(b"bench", region.as_bytes(), seq, vec![0u8; 256]);
            seq += 1;
            bincode::serialize_into(&mut writer, &entry).unwrap();
        }
        writer.flush().unwrap();
    }
}

fn bench_dirs() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("hbase");
    let src = root.join("log_bench_60020_1");
    fs::create_dir_all(&src).unwrap();
    generate_logs(&src, 9, 200, 8, 42);
    (tmp, root, src)
}

fn split_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_throughput");
    group
        .measurement_time(Duration::from_millis(6000))
        .warm_up_time(Duration::from_millis(500));

    for threads in [1, 2, 4] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("Writer threads: #{}", threads)),
            &threads,
            |b, threads| {
                b.iter_batched(
                    bench_dirs,
                    |(tmp, root, src)| {
                        let config = SplitConfig {
                            writer_threads: *threads,
                            ..SplitConfig::default()
                        };
                        let logger = Logger::root(Discard, o!());
                        split_log(
                            &root,
                            &src,
                            &root.join(".oldlogs"),
                            Arc::new(LocalFs),
                            &config,
                            &logger,
                        )
                        .unwrap();
                        drop(tmp);
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

criterion_group!(benches, split_throughput);
criterion_main!(benches);
