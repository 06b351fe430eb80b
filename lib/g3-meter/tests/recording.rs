/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use tokio::sync::mpsc;

use g3_meter::diagnostic::ChannelHandler;
use g3_meter::{
    AttributeSet, Counter, KeyValue, MemoryExporter, MeterProvider, MetricValue, MetricsError,
    Reader, Temporality, data::MetricData,
};

fn setup() -> (
    MeterProvider,
    Arc<MemoryExporter>,
    mpsc::UnboundedReceiver<MetricsError>,
) {
    let exporter = Arc::new(MemoryExporter::new(4));
    let (handler, receiver) = ChannelHandler::new();
    let provider = MeterProvider::builder()
        .with_reader(Reader::new(exporter.clone()))
        .with_diagnostic_handler(Arc::new(handler))
        .build();
    (provider, exporter, receiver)
}

fn sum_value(data: &MetricData, attributes: &[KeyValue]) -> Option<MetricValue> {
    data.value_of(&AttributeSet::from_kvs(attributes))
}

#[test]
fn empty_collect() {
    let (_provider, exporter, _errors) = setup();
    let payload = exporter.collect().unwrap();
    assert!(payload.is_empty());
    assert!(!payload.is_partial());
    assert_eq!(payload.metric_count(), 0);
}

#[test]
fn instrument_without_records() {
    let (provider, exporter, _errors) = setup();
    let _counter = provider.meter("test").i64_counter("idle").build();
    let payload = exporter.collect().unwrap();
    assert!(payload.is_empty());
}

#[test]
fn counter_series() {
    let (provider, exporter, _errors) = setup();
    let counter = provider.meter("test").i64_counter("hello").build();
    counter.add(1, &[]);
    counter.add(2, &[KeyValue::new("K", "V")]);
    counter.add(3, &[KeyValue::new("K", "V")]);

    let payload = exporter.collect().unwrap();
    assert_eq!(payload.scopes.len(), 1);
    assert_eq!(payload.scopes[0].scope.name(), "test");
    let metric = payload.metric("hello").unwrap();
    let MetricData::Sum {
        temporality,
        monotonic,
        points,
    } = &metric.data
    else {
        panic!("not a sum");
    };
    assert_eq!(*temporality, Temporality::Cumulative);
    assert!(*monotonic);
    assert_eq!(points.len(), 2);
    assert_eq!(sum_value(&metric.data, &[]), Some(MetricValue::Signed(1)));
    assert_eq!(
        sum_value(&metric.data, &[KeyValue::new("K", "V")]),
        Some(MetricValue::Signed(5))
    );
}

#[test]
fn concurrent_distinct_series() {
    let (provider, exporter, _errors) = setup();
    let counter = provider.meter("test").i64_counter("hello").build();

    std::thread::scope(|s| {
        for i in 0..10_i64 {
            let counter = counter.clone();
            s.spawn(move || counter.add(1, &[KeyValue::new("K", i)]));
        }
    });

    let payload = exporter.collect().unwrap();
    let data = &payload.metric("hello").unwrap().data;
    assert_eq!(data.point_count(), 10);
    for i in 0..10_i64 {
        assert_eq!(
            sum_value(data, &[KeyValue::new("K", i)]),
            Some(MetricValue::Signed(1))
        );
    }
}

#[test]
fn concurrent_same_series() {
    let (provider, exporter, _errors) = setup();
    let counter = provider.meter("test").f64_counter("bytes").build();

    std::thread::scope(|s| {
        for t in 0..8 {
            let counter = counter.clone();
            s.spawn(move || {
                for i in 0..1000 {
                    // both orders of the same attribute set
                    let attrs = if (i + t) % 2 == 0 {
                        [KeyValue::new("a", 1), KeyValue::new("b", 2)]
                    } else {
                        [KeyValue::new("b", 2), KeyValue::new("a", 1)]
                    };
                    counter.add(0.5, &attrs);
                }
            });
        }
    });

    let payload = exporter.collect().unwrap();
    let data = &payload.metric("bytes").unwrap().data;
    assert_eq!(data.point_count(), 1);
    assert_eq!(
        sum_value(data, &[KeyValue::new("a", 1), KeyValue::new("b", 2)]),
        Some(MetricValue::Double(4000.0))
    );
}

#[test]
fn negative_counter_value() {
    let (provider, exporter, mut errors) = setup();
    let counter = provider.meter("test").i64_counter("hello").build();
    counter.add(3, &[]);
    counter.add(-1, &[]);

    let e = errors.try_recv().unwrap();
    assert!(matches!(
        e,
        MetricsError::InvalidMeasurement { ref instrument, .. } if instrument == "hello"
    ));
    let payload = exporter.collect().unwrap();
    let data = &payload.metric("hello").unwrap().data;
    assert_eq!(sum_value(data, &[]), Some(MetricValue::Signed(3)));
}

#[test]
fn non_finite_value() {
    let (provider, exporter, mut errors) = setup();
    let counter = provider.meter("test").f64_up_down_counter("level").build();
    counter.add(-1.5, &[]);
    counter.add(f64::NAN, &[]);
    counter.add(f64::INFINITY, &[]);

    assert!(matches!(
        errors.try_recv(),
        Ok(MetricsError::InvalidMeasurement { .. })
    ));
    assert!(matches!(
        errors.try_recv(),
        Ok(MetricsError::InvalidMeasurement { .. })
    ));
    let payload = exporter.collect().unwrap();
    let metric = payload.metric("level").unwrap();
    assert!(matches!(
        metric.data,
        MetricData::Sum {
            monotonic: false,
            ..
        }
    ));
    assert_eq!(sum_value(&metric.data, &[]), Some(MetricValue::Double(-1.5)));
}

#[test]
fn monotonic_between_collections() {
    let (provider, exporter, _errors) = setup();
    let counter = provider.meter("test").i64_counter("hello").build();

    let mut last = 0;
    std::thread::scope(|s| {
        let writer = s.spawn(|| {
            for _ in 0..10000 {
                counter.add(1, &[]);
            }
        });
        while !writer.is_finished() {
            let payload = exporter.collect().unwrap();
            if let Some(metric) = payload.metric("hello") {
                let v = sum_value(&metric.data, &[]).and_then(|v| v.as_i64()).unwrap();
                assert!(v >= last);
                last = v;
            }
        }
    });

    let payload = exporter.collect().unwrap();
    let v = sum_value(&payload.metric("hello").unwrap().data, &[]);
    assert_eq!(v, Some(MetricValue::Signed(10000)));
}

#[test]
fn same_identity_same_instrument() {
    let (provider, exporter, mut errors) = setup();
    let meter = provider.meter("test");

    let counters: Vec<Counter<i64>> = std::thread::scope(|s| {
        let handles = (0..8)
            .map(|_| {
                let meter = meter.clone();
                s.spawn(move || meter.i64_counter("hello").with_unit("1").build())
            })
            .collect::<Vec<_>>();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for c in &counters[1..] {
        assert!(Counter::ptr_eq(&counters[0], c));
    }
    for c in &counters {
        c.add(1, &[]);
    }

    assert!(errors.try_recv().is_err());
    let payload = exporter.collect().unwrap();
    assert_eq!(payload.metric_count(), 1);
    let data = &payload.metric("hello").unwrap().data;
    assert_eq!(sum_value(data, &[]), Some(MetricValue::Signed(8)));
}

#[test]
fn same_meter_per_scope() {
    let (provider, _exporter, _errors) = setup();
    let a = provider.meter("test").i64_counter("hello").build();
    let b = provider.meter("test").i64_counter("hello").build();
    assert!(Counter::ptr_eq(&a, &b));

    let c = provider
        .versioned_meter("test", Some("1.0"), None)
        .i64_counter("hello")
        .build();
    assert!(!Counter::ptr_eq(&a, &c));
    assert_eq!(c.id().scope().version(), Some("1.0"));
}

#[test]
fn conflicting_identity() {
    let (provider, exporter, mut errors) = setup();
    let meter = provider.meter("test");
    let a = meter.i64_counter("hello").with_unit("ms").build();
    let b = meter.i64_counter("hello").with_unit("s").build();
    let c = meter.f64_histogram("hello").build();
    assert!(!Counter::ptr_eq(&a, &b));

    assert!(matches!(
        errors.try_recv(),
        Ok(MetricsError::DuplicateInstrument { ref name, .. }) if name == "hello"
    ));
    assert!(matches!(
        errors.try_recv(),
        Ok(MetricsError::DuplicateInstrument { .. })
    ));

    a.add(1, &[]);
    b.add(2, &[]);
    c.record(3.0, &[]);
    let payload = exporter.collect().unwrap();
    assert_eq!(payload.metric_count(), 3);
}

#[test]
fn invalid_name() {
    let (provider, exporter, mut errors) = setup();
    let counter = provider.meter("test").i64_counter("9lives").build();
    assert!(counter.is_noop());
    counter.add(1, &[]);

    assert!(matches!(
        errors.try_recv(),
        Ok(MetricsError::InvalidInstrumentName { ref name, .. }) if name == "9lives"
    ));
    assert!(exporter.collect().unwrap().is_empty());
}

#[test]
fn histogram() {
    let (provider, exporter, mut errors) = setup();
    let histogram = provider
        .meter("test")
        .f64_histogram("latency")
        .with_unit("ms")
        .with_boundaries(vec![10.0, 100.0])
        .build();
    for v in [1.0, 10.0, 50.0, 150.0, 99.5] {
        histogram.record(v, &[KeyValue::new("route", "/")]);
    }
    histogram.record(-1.0, &[KeyValue::new("route", "/")]);
    assert!(matches!(
        errors.try_recv(),
        Ok(MetricsError::InvalidMeasurement { .. })
    ));

    let payload = exporter.collect().unwrap();
    let metric = payload.metric("latency").unwrap();
    let MetricData::Histogram {
        temporality,
        boundaries,
        points,
    } = &metric.data
    else {
        panic!("not a histogram");
    };
    assert_eq!(*temporality, Temporality::Cumulative);
    assert_eq!(boundaries.as_slice(), &[10.0, 100.0]);
    assert_eq!(points.len(), 1);
    let counts = &points[0].counts;
    assert_eq!(counts.counts(), &[2, 2, 1]);
    assert_eq!(counts.count(), 5);
    assert_eq!(counts.sum(), 310.5);
    assert_eq!(counts.min(), Some(1.0));
    assert_eq!(counts.max(), Some(150.0));
}

#[test]
fn histogram_invalid_boundaries() {
    let (provider, exporter, mut errors) = setup();
    let histogram = provider
        .meter("test")
        .i64_histogram("size")
        .with_boundaries(vec![5.0, 1.0])
        .build();
    assert!(matches!(
        errors.try_recv(),
        Ok(MetricsError::InvalidBoundaries { .. })
    ));

    histogram.record(7, &[]);
    let payload = exporter.collect().unwrap();
    let MetricData::Histogram { boundaries, .. } = &payload.metric("size").unwrap().data else {
        panic!("not a histogram");
    };
    assert_eq!(boundaries.len(), 15);
}

#[test]
fn gauge() {
    let (provider, exporter, _errors) = setup();
    let gauge = provider.meter("test").i64_gauge("queue").build();
    gauge.record(5, &[]);
    gauge.record(-2, &[]);
    gauge.record(9, &[KeyValue::new("q", "b")]);

    let payload = exporter.collect().unwrap();
    let metric = payload.metric("queue").unwrap();
    assert!(matches!(metric.data, MetricData::Gauge { .. }));
    assert_eq!(sum_value(&metric.data, &[]), Some(MetricValue::Signed(-2)));
    assert_eq!(
        sum_value(&metric.data, &[KeyValue::new("q", "b")]),
        Some(MetricValue::Signed(9))
    );

    // kept after collection
    let payload = exporter.collect().unwrap();
    assert_eq!(payload.metric("queue").unwrap().data.point_count(), 2);
}

#[test]
fn instrument_created_after_collect() {
    let (provider, exporter, _errors) = setup();
    let meter = provider.meter("test");
    meter.i64_counter("first").build().add(1, &[]);
    assert_eq!(exporter.collect().unwrap().metric_count(), 1);

    meter.i64_counter("second").build().add(1, &[]);
    let payload = exporter.collect().unwrap();
    assert_eq!(payload.metric_count(), 2);
    assert!(payload.metric("second").is_some());
}

#[test]
fn noop_provider() {
    let provider = MeterProvider::noop();
    let counter = provider.meter("test").i64_counter("hello").build();
    assert!(counter.is_noop());
    counter.add(1, &[]);
}
