//! Gateway request metrics (Prometheus)
//!
//! Every RPC call is counted and timed per method; failures are also counted
//! per error kind. Metrics live in a registry owned by the gateway instance
//! and are rendered in the Prometheus text exposition format.

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Request counters and latency histogram for the JSON-RPC gateway
#[derive(Debug)]
pub struct GatewayMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    errors_total: IntCounterVec,
    request_duration: HistogramVec,
}

impl GatewayMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("keyq_rpc_requests_total", "Total JSON-RPC requests by method"),
            &["method"],
        )?;
        let errors_total = IntCounterVec::new(
            Opts::new(
                "keyq_rpc_errors_total",
                "Failed JSON-RPC requests by method and error kind",
            ),
            &["method", "kind"],
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "keyq_rpc_request_duration_seconds",
                "JSON-RPC request processing time",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["method"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            errors_total,
            request_duration,
        })
    }

    /// Record one finished call; `error_kind` is set when it failed
    pub fn record(&self, method: &str, elapsed: Duration, error_kind: Option<&str>) {
        self.requests_total.with_label_values(&[method]).inc();
        self.request_duration
            .with_label_values(&[method])
            .observe(elapsed.as_secs_f64());

        if let Some(kind) = error_kind {
            self.errors_total.with_label_values(&[method, kind]).inc();
        }
    }

    pub fn requests(&self, method: &str) -> u64 {
        self.requests_total.with_label_values(&[method]).get()
    }

    pub fn errors(&self, method: &str, kind: &str) -> u64 {
        self.errors_total.with_label_values(&[method, kind]).get()
    }

    /// Text exposition of every gateway metric
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}
