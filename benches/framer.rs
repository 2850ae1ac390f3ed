//! Benchmarks for the receive framer and directive rendering
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use radio_bridge::channel::{ByteSource, FramerStep, ReadOutcome, ReceiveFramer, RxBuffer};
use radio_bridge::config::FramerConfig;
use radio_bridge::graph::format_number;

/// Endless byte stream repeating one chunk
struct Repeating {
    chunk: Vec<u8>,
    offset: usize,
}

impl ByteSource for Repeating {
    fn read_into(&mut self, buf: &mut [u8]) -> ReadOutcome {
        let mut written = 0;
        while written < buf.len() {
            let available = &self.chunk[self.offset..];
            let n = available.len().min(buf.len() - written);
            buf[written..written + n].copy_from_slice(&available[..n]);
            written += n;
            self.offset = (self.offset + n) % self.chunk.len();
        }
        ReadOutcome::Data(written)
    }
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain");

    for line_len in [8usize, 64, 256].iter() {
        let mut chunk = vec![b'x'; *line_len];
        chunk.push(b'\n');

        group.throughput(Throughput::Bytes(chunk.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("framer_poll", line_len),
            &chunk,
            |b, chunk| {
                let mut framer = ReceiveFramer::new(&FramerConfig::default());
                framer.attach(Box::new(Repeating {
                    chunk: chunk.clone(),
                    offset: 0,
                }));
                b.iter(|| match framer.poll() {
                    FramerStep::Delivered(msg) => black_box(msg.len()),
                    other => panic!("unexpected step {:?}", other),
                });
            },
        );
    }

    group.finish();
}

fn bench_eviction(c: &mut Criterion) {
    c.bench_function("evict_oldest_full_buffer", |b| {
        let mut buffer = RxBuffer::new(1024);
        b.iter(|| {
            buffer.extend_from_slice(black_box(b"noise"));
            buffer.evict_oldest();
            black_box(buffer.filled())
        });
    });
}

fn bench_number_format(c: &mut Criterion) {
    c.bench_function("format_number", |b| {
        b.iter(|| {
            black_box(format_number(black_box(433.92 * 1e6)));
            black_box(format_number(black_box(1200.0 / 8.0)));
        });
    });
}

criterion_group!(benches, bench_drain, bench_eviction, bench_number_format);
criterion_main!(benches);
