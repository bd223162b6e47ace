//! Lightweight in-process metrics.
//!
//! Counters and gauges are atomics keyed by label sets and rendered in the
//! Prometheus text format on demand (the binary prints them for `stats`).

pub mod metrics;

pub use metrics::{ClientMetrics, CounterVec, GaugeVec, HistogramVec};
