//! # Prometheus Metrics
//!
//! HTTP-level metrics (request counts, latency, errors) are recorded in
//! middleware. Domain-level gauges (bindings, credentials, capsules by
//! verification status) are updated on each `/metrics` scrape (pull model) —
//! see the metrics handler in `lib.rs`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{
    core::Collector, Encoder, GaugeVec, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,

    // -- HTTP middleware metrics (push model) --
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,

    // -- Domain gauges (pull model, updated on /metrics scrape) --
    bindings_total: prometheus::Gauge,
    credentials_total: prometheus::Gauge,
    capsules_total: GaugeVec,
}

impl std::fmt::Debug for ApiMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMetrics")
            .field("requests", &self.requests())
            .field("errors", &self.errors())
            .finish()
    }
}

impl ApiMetrics {
    /// Create a new metrics instance with a fresh Prometheus registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("opcn_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let http_request_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "opcn_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "path"],
        )
        .expect("metric can be created");

        let http_errors_total = IntCounterVec::new(
            Opts::new("opcn_http_errors_total", "Total HTTP errors (4xx and 5xx)"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let bindings_total =
            prometheus::Gauge::new("opcn_bindings_total", "Total wallet bindings")
                .expect("metric can be created");

        let credentials_total =
            prometheus::Gauge::new("opcn_credentials_total", "Total minted credentials")
                .expect("metric can be created");

        let capsules_total = GaugeVec::new(
            Opts::new("opcn_capsules_total", "Total proof capsules by verification status"),
            &["verify_status"],
        )
        .expect("metric can be created");

        // Register all metrics.
        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(http_request_duration_seconds.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(http_errors_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(bindings_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(credentials_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(capsules_total.clone()))
            .expect("metric can be registered");

        Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
                bindings_total,
                credentials_total,
                capsules_total,
            }),
        }
    }

    /// Return current total request count (sum across all labels).
    pub fn requests(&self) -> u64 {
        let mut total = 0u64;
        let families = self.inner.http_requests_total.collect();
        for mf in &families {
            for m in mf.get_metric() {
                total += m.get_counter().get_value() as u64;
            }
        }
        total
    }

    /// Return current total error count (sum across all labels).
    pub fn errors(&self) -> u64 {
        let mut total = 0u64;
        let families = self.inner.http_errors_total.collect();
        for mf in &families {
            for m in mf.get_metric() {
                total += m.get_counter().get_value() as u64;
            }
        }
        total
    }

    /// Record an HTTP request (called by the middleware).
    fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();

        self.inner
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);

        if status >= 400 {
            self.inner
                .http_errors_total
                .with_label_values(&[method, path, &status_str])
                .inc();
        }
    }

    // -- Domain gauge accessors (used by the /metrics handler) --

    /// Access the bindings gauge for updating.
    pub fn bindings_total(&self) -> &prometheus::Gauge {
        &self.inner.bindings_total
    }

    /// Access the credentials gauge for updating.
    pub fn credentials_total(&self) -> &prometheus::Gauge {
        &self.inner.credentials_total
    }

    /// Access the capsules gauge for updating.
    pub fn capsules_total(&self) -> &GaugeVec {
        &self.inner.capsules_total
    }

    /// Gather all metrics and encode to Prometheus text format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| format!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer)
            .map_err(|e| format!("metrics encoding produced invalid UTF-8: {e}"))
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a request path by replacing record-id segments with `{id}`.
///
/// Prevents cardinality explosion in Prometheus labels. Record ids have the
/// form `prefix-xxxxxxxx` (eight base-36 characters after the last hyphen),
/// and `/capsules/{id}` is the only route that puts one in the path.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            match segment.rsplit_once('-') {
                Some((prefix, suffix))
                    if !prefix.is_empty()
                        && suffix.len() == 8
                        && suffix
                            .chars()
                            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) =>
                {
                    "{id}"
                }
                _ => segment,
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Middleware that records HTTP request metrics via Prometheus.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        let duration = start.elapsed().as_secs_f64();
        let status = response.status().as_u16();
        m.record_request(&method, &path, status, duration);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_metrics_new_starts_at_zero() {
        let m = ApiMetrics::new();
        assert_eq!(m.requests(), 0);
        assert_eq!(m.errors(), 0);
    }

    #[test]
    fn requests_increments() {
        let m = ApiMetrics::new();
        m.record_request("GET", "/capsules", 200, 0.01);
        assert_eq!(m.requests(), 1);
        m.record_request("POST", "/capsules", 200, 0.02);
        m.record_request("GET", "/onchain/bindings", 200, 0.005);
        assert_eq!(m.requests(), 3);
    }

    #[test]
    fn errors_increments() {
        let m = ApiMetrics::new();
        m.record_request("POST", "/onchain/bind", 400, 0.1);
        assert_eq!(m.errors(), 1);
        m.record_request("POST", "/admin/reset", 401, 0.05);
        assert_eq!(m.errors(), 2);
        assert_eq!(m.requests(), 2);
    }

    #[test]
    fn clone_shares_underlying_counters() {
        let m = ApiMetrics::new();
        let clone = m.clone();

        m.record_request("GET", "/capsules", 200, 0.01);
        assert_eq!(clone.requests(), 1, "clone should see the same counter");

        clone.record_request("POST", "/onchain/bind", 500, 0.01);
        assert_eq!(m.errors(), 1, "original should see clone's increment");
    }

    #[test]
    fn gather_and_encode_produces_text() {
        let m = ApiMetrics::new();
        m.record_request("GET", "/capsules", 200, 0.01);
        let output = m.gather_and_encode().unwrap();
        assert!(output.contains("opcn_http_requests_total"));
        assert!(output.contains("opcn_http_request_duration_seconds"));
    }

    #[test]
    fn normalize_path_replaces_record_ids() {
        assert_eq!(normalize_path("/capsules/capsule-k3f9x2qa"), "/capsules/{id}");
    }

    #[test]
    fn normalize_path_preserves_static_segments() {
        assert_eq!(
            normalize_path("/onchain/bindings/by-agent"),
            "/onchain/bindings/by-agent"
        );
        assert_eq!(normalize_path("/onchain/mint-credential"), "/onchain/mint-credential");
        assert_eq!(normalize_path("/capsules/verify"), "/capsules/verify");
    }

    #[test]
    fn domain_gauges_update() {
        let m = ApiMetrics::new();
        m.bindings_total().set(3.0);
        m.credentials_total().set(2.0);
        m.capsules_total().with_label_values(&["ok"]).set(1.0);
        m.capsules_total().with_label_values(&["failed"]).set(1.0);

        let output = m.gather_and_encode().unwrap();
        assert!(output.contains("opcn_bindings_total"));
        assert!(output.contains("opcn_credentials_total"));
        assert!(output.contains("opcn_capsules_total"));
    }
}
