//! Benchmarks for quicklog core operations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use quicklog::core::{
    inline_spans, parse_unified_diff, render, CommitCache, HistoryWalker, MemoryObjectReader,
    RenderMode,
};

/// Generate a diff of `files` files, each with `hunks` hunks of mixed changes.
fn generate_diff(files: usize, hunks: usize) -> String {
    let mut out = String::new();
    for f in 0..files {
        out.push_str(&format!(
            "diff --git a/src/file_{f}.rs b/src/file_{f}.rs\n--- a/src/file_{f}.rs\n+++ b/src/file_{f}.rs\n"
        ));
        for h in 0..hunks {
            let start = h * 20 + 1;
            out.push_str(&format!("@@ -{start},8 +{start},9 @@ fn item_{h}()\n"));
            out.push_str(&format!(" context line {h} a\n context line {h} b\n"));
            out.push_str(&format!("-    let value = compute({h});\n-    emit(value);\n"));
            out.push_str(&format!(
                "+    let value = compute_fast({h});\n+    emit(value, true);\n+    log(value);\n"
            ));
            out.push_str(&format!(
                " context line {h} c\n context line {h} d\n context line {h} e\n-    done();\n+    finish();\n"
            ));
        }
    }
    out
}

/// A linear history of `n` commits, plus a merge every 10th commit.
fn generate_history(n: usize) -> MemoryObjectReader {
    let mut reader = MemoryObjectReader::new().with_head("c0");
    for i in 0..n {
        let id = format!("c{i}");
        let parent = format!("c{}", i + 1);
        let side = format!("s{i}");
        if i + 1 == n {
            reader = reader.with_commit(&id, &[], "root");
        } else if i % 10 == 0 {
            reader = reader
                .with_commit(&id, &[&parent, &side], "merge")
                .with_commit(&side, &[&parent], "side");
        } else {
            reader = reader.with_commit(&id, &[&parent], "change");
        }
    }
    reader
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_unified_diff");

    for files in [1, 10, 100] {
        let diff = generate_diff(files, 20);
        group.throughput(Throughput::Bytes(diff.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(files), &diff, |b, diff| {
            b.iter(|| parse_unified_diff(black_box(diff)));
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let files = parse_unified_diff(&generate_diff(1, 500));
    let file = &files[0];

    for mode in [RenderMode::Split, RenderMode::Unified] {
        group.bench_with_input(BenchmarkId::from_parameter(mode.label()), &mode, |b, mode| {
            b.iter(|| render(black_box(file), *mode, 3));
        });
    }

    group.finish();
}

fn bench_inline_spans(c: &mut Criterion) {
    let old = "    let value = compute_something(alpha, beta, gamma);";
    let new = "    let value = compute_something_else(alpha, delta, gamma);";

    c.bench_function("inline_spans", |b| {
        b.iter(|| inline_spans(black_box(old), black_box(new)));
    });
}

fn bench_history_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("HistoryWalker::ensure_capacity");

    for selection in [0, 500, 5_000] {
        let reader = generate_history(selection + 200);
        group.bench_with_input(
            BenchmarkId::from_parameter(selection),
            &selection,
            |b, &selection| {
                b.iter(|| {
                    let mut cache = CommitCache::new();
                    let mut walker = HistoryWalker::new();
                    walker
                        .ensure_capacity(&mut cache, &reader, "c0", selection)
                        .unwrap();
                    black_box(walker.len())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_render,
    bench_inline_spans,
    bench_history_walk
);
criterion_main!(benches);
