/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};

use g3_meter::{KeyValue, MemoryExporter, MeterProvider, Reader, Temporality};

fn setup(temporality: Temporality) -> (MeterProvider, Arc<MemoryExporter>) {
    let exporter = Arc::new(MemoryExporter::new(1));
    let provider = MeterProvider::builder()
        .with_reader(Reader::new(exporter.clone()).with_temporality(temporality))
        .build();
    (provider, exporter)
}

fn counter_add(c: &mut Criterion) {
    let (provider, _exporter) = setup(Temporality::Cumulative);
    let counter = provider.meter("bench").i64_counter("requests").build();

    c.bench_function("counter_add_no_attrs", |b| {
        b.iter(|| counter.add(black_box(1), &[]))
    });

    let attrs = [KeyValue::new("method", "GET")];
    c.bench_function("counter_add_one_attr", |b| {
        b.iter(|| counter.add(black_box(1), &attrs))
    });

    let attrs = [
        KeyValue::new("status", 200),
        KeyValue::new("method", "GET"),
        KeyValue::new("route", "/index"),
        KeyValue::new("tls", true),
    ];
    c.bench_function("counter_add_unsorted_attrs", |b| {
        b.iter(|| counter.add(black_box(1), &attrs))
    });

    let values = (0..1024_i64)
        .map(|i| [KeyValue::new("id", i)])
        .collect::<Vec<_>>();
    let mut i = 0;
    c.bench_function("counter_add_distinct_attrs", |b| {
        b.iter(|| {
            i = (i + 1) & 1023;
            counter.add(black_box(1), &values[i])
        })
    });
}

fn histogram_record(c: &mut Criterion) {
    let (provider, _exporter) = setup(Temporality::Cumulative);
    let histogram = provider.meter("bench").f64_histogram("latency").build();
    let attrs = [KeyValue::new("method", "GET")];
    c.bench_function("histogram_record", |b| {
        b.iter(|| histogram.record(black_box(12.5), &attrs))
    });
}

fn collect(c: &mut Criterion) {
    for temporality in [Temporality::Cumulative, Temporality::Delta] {
        let (provider, exporter) = setup(temporality);
        let counter = provider.meter("bench").i64_counter("requests").build();
        let attrs = (0..10_i64)
            .map(|i| [KeyValue::new("id", i)])
            .collect::<Vec<_>>();

        c.bench_function(&format!("collect_10_series_{temporality}"), |b| {
            b.iter(|| {
                for a in &attrs {
                    counter.add(1, a);
                }
                black_box(exporter.collect())
            })
        });
    }
}

criterion_group!(benches, counter_add, histogram_record, collect);
criterion_main!(benches);
