//! Prometheus exposition plus domain counters for the token lifecycle.
//!
//! Counters go through the `metrics` facade; before [`init_metrics`] runs
//! they are no-ops, which is what the test suites rely on.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init_metrics() -> Result<(), anyhow::Error> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("Metrics recorder already initialized"))
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

pub fn record_issued(module_count: usize) {
    counter!("access_tokens_issued_total").increment(1);
    counter!("access_token_modules_granted_total").increment(module_count as u64);
}

pub fn record_validation(granted: bool) {
    let outcome = if granted { "granted" } else { "denied" };
    counter!("access_token_validations_total", "outcome" => outcome).increment(1);
}

pub fn record_revoked() {
    counter!("access_tokens_revoked_total").increment(1);
}
