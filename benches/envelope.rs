// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Benchmarks for event encoding and error classification.
//!
//! Run with: `cargo bench --bench envelope`

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use anonmetrics::backend::{build_error_payload, build_success_payload};
use anonmetrics::{
    infer_error_type, ErrorOptions, EventEnvelope, SuccessOptions, ToolErrorType, TrackedError,
};

/// Benchmark building and encoding backend events.
fn bench_envelope_encoding(c: &mut Criterion) {
    let success = build_success_payload(
        "search_documents",
        142,
        SuccessOptions::default()
            .with_call_id("1718000000000-abc123xyz")
            .with_parameters(r#"{"query":"quarterly report","limit":20}"#)
            .with_response_size(4096),
    );
    let failure = build_error_payload(
        "search_documents",
        &TrackedError::structured("TimeoutError", "upstream timed out after 5000ms")
            .with_stack_trace("at search (index.rs:42)\nat handle (server.rs:17)"),
        ErrorOptions::default()
            .with_error_type(ToolErrorType::Timeout)
            .with_duration_ms(5003),
    );

    let mut group = c.benchmark_group("envelope");
    group.throughput(Throughput::Elements(1));

    group.bench_function("build_success_payload", |b| {
        b.iter(|| {
            build_success_payload(
                black_box("search_documents"),
                black_box(142),
                SuccessOptions::default(),
            )
        });
    });

    group.bench_function("encode_tool_call", |b| {
        b.iter(|| {
            EventEnvelope::new("tool_call", black_box(&success)).and_then(|e| e.to_body())
        });
    });

    group.bench_function("encode_tool_error", |b| {
        b.iter(|| {
            EventEnvelope::new("tool_error", black_box(&failure)).and_then(|e| e.to_body())
        });
    });

    let body = EventEnvelope::new("tool_call", &success)
        .and_then(|e| e.to_body())
        .unwrap();
    group.bench_function("decode_tool_call", |b| {
        b.iter(|| {
            serde_json::from_str::<EventEnvelope>(black_box(&body))
                .map_err(anonmetrics::DeliveryError::from)
                .and_then(|e| e.payload())
        });
    });

    group.finish();
}

/// Benchmark error-type inference.
fn bench_classification(c: &mut Criterion) {
    let cases = [
        ("timeout", TrackedError::structured("TimeoutError", "Request timed out")),
        ("validation", TrackedError::structured("Error", "Invalid email format")),
        ("rate_limit", TrackedError::structured("Error", "429 Too Many Requests")),
        ("external", TrackedError::structured("FetchError", "ECONNREFUSED 10.0.0.1:443")),
        ("internal", TrackedError::structured("Error", "index out of range")),
        ("plain", TrackedError::plain("something broke")),
    ];

    let mut group = c.benchmark_group("classification");

    for (label, error) in &cases {
        group.bench_function(*label, |b| {
            b.iter(|| infer_error_type(black_box(error)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_envelope_encoding, bench_classification);
criterion_main!(benches);
