//! Benchmarks for recording, navigating and saving move logs.
//!
//! Run with: cargo bench -p movelog --bench move_log_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use movelog::{
    Direction, Identity, LineEnding, MARK_MACRO_CLOSE, MARK_MACRO_OPEN, Move, MoveId, MoveLog,
    MoveLogConfig, SliceMask,
};

const SIZES: [usize; 3] = [100, 1_000, 10_000];

// ============================================================================
// Setup helpers
// ============================================================================

/// A move sequence with no adjacent inverse pairs, so nothing cancels.
fn moves(n: usize) -> Vec<Move> {
    (0..n)
        .map(|i| {
            let direction = if i % 3 == 0 { Direction::Ccw } else { Direction::Cw };
            Move::new(MoveId::new((i % 24) as u32), direction, SliceMask(1 << (i % 3)))
        })
        .collect()
}

/// A log of `n` moves with a macro bracket pair every 50 moves.
fn setup_log(n: usize) -> MoveLog {
    let mut log = MoveLog::with_config(MoveLogConfig::new(3).with_line_ending(LineEnding::Lf));
    for (i, mv) in moves(n).into_iter().enumerate() {
        if i % 50 == 0 {
            log.mark(MARK_MACRO_OPEN);
        }
        log.append(mv);
        if i % 50 == 49 {
            log.mark(MARK_MACRO_CLOSE);
        }
    }
    log
}

// ============================================================================
// Recording
// ============================================================================

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("movelog_append");
    for n in SIZES {
        let input = moves(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| {
                let mut log = MoveLog::new(3);
                for mv in input {
                    log.append(*mv);
                }
                black_box(log.len())
            });
        });
    }
    group.finish();
}

// ============================================================================
// Navigation
// ============================================================================

fn bench_undo_redo_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("movelog_undo_redo_sweep");
    for n in SIZES {
        let mut log = setup_log(n);
        group.throughput(Throughput::Elements(2 * n as u64));
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter(|| {
                while log.undo().is_some() {}
                while log.redo().is_some() {}
                black_box(log.at_end())
            });
        });
    }
    group.finish();
}

fn bench_count_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("movelog_count_moves");
    for n in SIZES {
        let log = setup_log(n);
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter(|| black_box(log.count_moves(true)));
        });
    }
    group.finish();
}

// ============================================================================
// Save format
// ============================================================================

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("movelog_write");
    for n in SIZES {
        let log = setup_log(n);
        let mut buf = Vec::with_capacity(n * 12);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter(|| {
                buf.clear();
                log.write(&mut buf).unwrap();
                black_box(buf.len())
            });
        });
    }
    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("movelog_read");
    for n in SIZES {
        let text = setup_log(n).to_text();
        let mut log = MoveLog::new(3);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &text, |b, text| {
            b.iter(|| {
                log.read_str(text).unwrap();
                black_box(log.len())
            });
        });
    }
    group.finish();
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("movelog_compress_identity");
    for n in SIZES {
        let input = moves(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| {
                let out = MoveLog::compress_moves(input.iter().copied(), 3, &mut Identity, false);
                black_box(out.len())
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_append,
    bench_undo_redo_sweep,
    bench_count_moves,
    bench_write,
    bench_read,
    bench_compress,
);
criterion_main!(benches);
