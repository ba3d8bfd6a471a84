//! Prometheus metrics for the backend.
//!
//! Tracks:
//! - Chat relay requests and errors
//! - Bytes moved by the download/upload probes
//! - Active requests (gauge) and request latency
//!
//! Metrics are exposed via GET /metrics.

use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_gauge, register_histogram, Counter, Encoder, Gauge, Histogram,
    Registry, TextEncoder,
};

lazy_static! {
    /// Global metrics registry.
    pub static ref REGISTRY: Registry = Registry::new();

    /// Total number of chat relay requests.
    pub static ref CHAT_REQUESTS: Counter = register_counter!(
        "netprobe_chat_requests_total",
        "Total number of chat relay requests"
    )
    .unwrap();

    /// Total number of failed chat relay requests.
    pub static ref CHAT_ERRORS: Counter = register_counter!(
        "netprobe_chat_errors_total",
        "Total number of failed chat relay requests"
    )
    .unwrap();

    /// Bytes served by the download probe.
    pub static ref DOWNLOAD_BYTES: Counter = register_counter!(
        "netprobe_download_bytes_total",
        "Total bytes served by the download probe"
    )
    .unwrap();

    /// Bytes drained by the upload probe.
    pub static ref UPLOAD_BYTES: Counter = register_counter!(
        "netprobe_upload_bytes_total",
        "Total bytes received by the upload probe"
    )
    .unwrap();

    /// Number of currently active requests.
    pub static ref ACTIVE_REQUESTS: Gauge = register_gauge!(
        "netprobe_active_requests",
        "Number of currently active requests"
    )
    .unwrap();

    /// Request latency histogram in seconds.
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "netprobe_request_latency_seconds",
        "Request latency in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();
}

static REGISTER_ONCE: std::sync::Once = std::sync::Once::new();

/// Register all metrics with the global registry. Safe to call repeatedly;
/// registration happens once.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY.register(Box::new(CHAT_REQUESTS.clone())).unwrap();
        REGISTRY.register(Box::new(CHAT_ERRORS.clone())).unwrap();
        REGISTRY.register(Box::new(DOWNLOAD_BYTES.clone())).unwrap();
        REGISTRY.register(Box::new(UPLOAD_BYTES.clone())).unwrap();
        REGISTRY
            .register(Box::new(ACTIVE_REQUESTS.clone()))
            .unwrap();
        REGISTRY
            .register(Box::new(REQUEST_LATENCY.clone()))
            .unwrap();
    });
}

/// Render metrics in Prometheus text format.
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// RAII guard for tracking active requests.
///
/// Increments ACTIVE_REQUESTS on creation, decrements on drop.
pub struct ActiveRequestGuard;

impl ActiveRequestGuard {
    pub fn new() -> Self {
        ACTIVE_REQUESTS.inc();
        Self
    }
}

impl Drop for ActiveRequestGuard {
    fn drop(&mut self) {
        ACTIVE_REQUESTS.dec();
    }
}

impl Default for ActiveRequestGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for timing requests.
///
/// Records latency to REQUEST_LATENCY histogram on drop.
pub struct LatencyTimer {
    start: std::time::Instant,
}

impl LatencyTimer {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed().as_secs_f64();
        REQUEST_LATENCY.observe(elapsed);
    }
}

impl Default for LatencyTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // Ensure metrics can be registered without panic
        register_metrics();

        CHAT_REQUESTS.inc();
        ACTIVE_REQUESTS.set(2.0);
        DOWNLOAD_BYTES.inc_by(1_048_576.0);

        let output = render_metrics();
        assert!(output.contains("netprobe_chat_requests_total"));
        assert!(output.contains("netprobe_download_bytes_total"));
        assert!(output.contains("netprobe_active_requests"));
    }

    #[test]
    fn test_active_request_guard() {
        let initial = ACTIVE_REQUESTS.get();
        {
            let _guard = ActiveRequestGuard::new();
            assert_eq!(ACTIVE_REQUESTS.get(), initial + 1.0);
        }
        assert_eq!(ACTIVE_REQUESTS.get(), initial);
    }

    #[test]
    fn test_latency_timer() {
        let initial_count = REQUEST_LATENCY.get_sample_count();
        {
            let _timer = LatencyTimer::new();
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        assert_eq!(REQUEST_LATENCY.get_sample_count(), initial_count + 1);
    }
}
