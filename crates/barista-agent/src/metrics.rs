//! Metrics recording.
//!
//! Calls are no-ops until a recorder is installed, either by the hosting
//! voice platform or with [`install_prometheus_recorder`].

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus metrics recorder and return the handle for rendering.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record a tool call by tool name.
pub fn record_tool_call(tool: &str) {
    let labels = [("tool", tool.to_string())];
    metrics::counter!("barista_tool_calls_total", &labels).increment(1);
}

/// Record a saved order.
pub fn record_order_completed() {
    metrics::counter!("barista_orders_completed_total").increment(1);
}

/// Record an error of a given kind.
pub fn record_error(kind: &str) {
    let labels = [("kind", kind.to_string())];
    metrics::counter!("barista_errors_total", &labels).increment(1);
}
