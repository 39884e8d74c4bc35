//! Prometheus metrics for the SEEDS API.
//!
//! [`ApiMetrics`] owns a dedicated [`Registry`] that the `/metrics` endpoint
//! encodes into the Prometheus text exposition format.

use prometheus::{
    register_int_counter_vec_with_registry, Encoder, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::error::RpcError;

/// Content type of the Prometheus text exposition format.
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

pub struct ApiMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    /// Requests handled, by matched route.
    pub http_requests: IntCounterVec,
    /// Requests answered with a 4xx or 5xx status, by matched route.
    pub http_failures: IntCounterVec,
    /// Token operations requested, by operation.
    pub operations_submitted: IntCounterVec,
    /// Token operations that ended in an error, by operation.
    pub operations_failed: IntCounterVec,
}

impl ApiMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests = register_int_counter_vec_with_registry!(
            Opts::new("seeds_http_requests_total", "Total API requests handled"),
            &["endpoint"],
            registry
        )
        .expect("failed to register http_requests counter");

        let http_failures = register_int_counter_vec_with_registry!(
            Opts::new(
                "seeds_http_failures_total",
                "Total API requests answered with an error status"
            ),
            &["endpoint"],
            registry
        )
        .expect("failed to register http_failures counter");

        let operations_submitted = register_int_counter_vec_with_registry!(
            Opts::new(
                "seeds_operations_submitted_total",
                "Total token operations requested"
            ),
            &["operation"],
            registry
        )
        .expect("failed to register operations_submitted counter");

        let operations_failed = register_int_counter_vec_with_registry!(
            Opts::new(
                "seeds_operations_failed_total",
                "Total token operations that failed"
            ),
            &["operation"],
            registry
        )
        .expect("failed to register operations_failed counter");

        Self {
            registry,
            http_requests,
            http_failures,
            operations_submitted,
            operations_failed,
        }
    }

    pub fn record_request(&self, endpoint: &str, failed: bool) {
        self.http_requests.with_label_values(&[endpoint]).inc();
        if failed {
            self.http_failures.with_label_values(&[endpoint]).inc();
        }
    }

    pub fn record_operation(&self, operation: &str, failed: bool) {
        self.operations_submitted
            .with_label_values(&[operation])
            .inc();
        if failed {
            self.operations_failed.with_label_values(&[operation]).inc();
        }
    }

    /// Encode every registered metric in the text exposition format.
    pub fn encode(&self) -> Result<String, RpcError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| RpcError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| RpcError::Metrics(e.to_string()))
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_appear_in_exposition() {
        let metrics = ApiMetrics::new();
        metrics.record_request("/api/seeds-balance", false);
        metrics.record_request("/api/seeds-transfer", true);
        metrics.record_operation("burn", true);

        let text = metrics.encode().unwrap();
        assert!(text.contains("seeds_http_requests_total{endpoint=\"/api/seeds-balance\"} 1"));
        assert!(text.contains("seeds_http_failures_total{endpoint=\"/api/seeds-transfer\"} 1"));
        assert!(text.contains("seeds_operations_failed_total{operation=\"burn\"} 1"));
    }

    #[test]
    fn successes_do_not_count_as_failures() {
        let metrics = ApiMetrics::new();
        metrics.record_operation("mint", false);
        assert_eq!(
            metrics.operations_submitted.with_label_values(&["mint"]).get(),
            1
        );
        assert_eq!(
            metrics.operations_failed.with_label_values(&["mint"]).get(),
            0
        );
    }
}
