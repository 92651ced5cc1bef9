//! Benchmarks for the RESP request/response state machines.
//!
//! Establishes a throughput baseline for the parser's hot path: one-shot
//! framing of common command shapes, plus the chunked/repair paths the spec
//! calls out as first-class, not exceptional.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use shardwire_protocol::{RequestStream, ResponseStream};

fn bench_frame_simple_get(c: &mut Criterion) {
    let wire: &[u8] = b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n";
    let mut group = c.benchmark_group("request_framing");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get", |b| {
        b.iter(|| {
            let mut stream = RequestStream::new(64);
            stream.feed(black_box(wire));
            black_box(stream.poll())
        })
    });

    group.finish();
}

fn bench_frame_multi_arg_commands(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_framing_by_arity");
    let cases: &[(&str, &[u8])] = &[
        ("arg1_get", b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n"),
        ("arg2_set", b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n"),
        (
            "arg3_setex",
            b"*4\r\n$5\r\nSETEX\r\n$3\r\nfoo\r\n$2\r\n60\r\n$3\r\nbar\r\n",
        ),
        (
            "argn_sadd",
            b"*4\r\n$4\r\nSADD\r\n$3\r\nkey\r\n$1\r\na\r\n$1\r\nb\r\n",
        ),
        (
            "argx_mget_fragments",
            b"*4\r\n$4\r\nMGET\r\n$1\r\na\r\n$1\r\nb\r\n$1\r\nc\r\n",
        ),
    ];

    for (name, wire) in cases {
        group.throughput(Throughput::Bytes(wire.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), wire, |b, wire| {
            b.iter(|| {
                let mut stream = RequestStream::new(64);
                stream.feed(black_box(wire));
                black_box(stream.poll())
            })
        });
    }

    group.finish();
}

fn bench_frame_chunked_request(c: &mut Criterion) {
    let wire: &[u8] = b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n";
    c.bench_function("request_framing_byte_at_a_time", |b| {
        b.iter(|| {
            let mut stream = RequestStream::new(64);
            for chunk in wire.chunks(1) {
                stream.feed(black_box(chunk));
                stream.poll();
            }
        })
    });
}

fn bench_frame_responses(c: &mut Criterion) {
    let mut group = c.benchmark_group("response_framing");
    let cases: &[(&str, &[u8])] = &[
        ("status", b"+OK\r\n"),
        ("error", b"-ERR no such key\r\n"),
        ("integer", b":1000\r\n"),
        ("bulk", b"$3\r\nfoo\r\n"),
        ("multibulk", b"*3\r\n$3\r\nfoo\r\n$3\r\nbar\r\n$3\r\nbaz\r\n"),
    ];

    for (name, wire) in cases {
        group.throughput(Throughput::Bytes(wire.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), wire, |b, wire| {
            b.iter(|| {
                let mut stream = ResponseStream::new(64);
                stream.feed(black_box(wire));
                black_box(stream.poll())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_frame_simple_get,
    bench_frame_multi_arg_commands,
    bench_frame_chunked_request,
    bench_frame_responses
);
criterion_main!(benches);
