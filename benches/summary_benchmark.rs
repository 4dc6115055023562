use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use summary_rs::summary::{self, SegmentCounts};

fn generate_text(lines: usize, words_per_line: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for _ in 0..lines {
        for j in 0..words_per_line {
            if j > 0 {
                data.push(b' ');
            }
            data.extend_from_slice(b"hello");
        }
        data.push(b'\n');
    }
    data
}

fn bench_count_newlines(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary_newlines");
    for size_mb in [1, 10, 100] {
        let lines = size_mb * 1024 * 1024 / 12; // ~12 bytes per line
        let data = generate_text(lines, 1);
        group.bench_with_input(
            BenchmarkId::new("memchr", format!("{}MB", size_mb)),
            &data,
            |b, data| b.iter(|| summary::count_newlines(black_box(data))),
        );
    }
    group.finish();
}

fn bench_count_alnum(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary_alnum");
    for size_mb in [1, 10] {
        let lines = size_mb * 1024 * 1024 / 30; // ~30 bytes per line with 5 words
        let data = generate_text(lines, 5);
        group.bench_with_input(
            BenchmarkId::new("scalar", format!("{}MB", size_mb)),
            &data,
            |b, data| b.iter(|| summary::count_alnum(black_box(data))),
        );
    }
    group.finish();
}

fn bench_count_utf8_units(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary_utf8_units");
    let ascii_data = generate_text(100_000, 5);
    group.bench_function("ascii_1MB", |b| {
        b.iter(|| summary::count_utf8_units(black_box(&ascii_data)))
    });

    let utf8_text = "\u{4e16}\u{754c}\u{4f60}\u{597d} hello world\n".repeat(50_000);
    let utf8_data = utf8_text.as_bytes();
    group.bench_function("utf8_mixed", |b| {
        b.iter(|| summary::count_utf8_units(black_box(utf8_data)))
    });
    group.finish();
}

fn bench_record(c: &mut Criterion) {
    // One full pass over a buffer, all four metrics
    let data = generate_text(100_000, 5);
    c.bench_function("summary_record_1MB", |b| {
        b.iter(|| {
            let mut counts = SegmentCounts::default();
            counts.record(black_box(&data));
            counts
        })
    });
}

criterion_group!(
    benches,
    bench_count_newlines,
    bench_count_alnum,
    bench_count_utf8_units,
    bench_record,
);
criterion_main!(benches);
