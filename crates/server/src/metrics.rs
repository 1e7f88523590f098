//! Process metrics (spec §4.10 Observability, §6 `GET /metrics`): counters,
//! histograms and gauges exported in Prometheus text format via the
//! `metrics`/`metrics-exporter-prometheus` crates already used for the
//! cache tier's and LLM router's rolling counters elsewhere in this
//! workspace.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Installs the global recorder and returns a handle that renders the
/// current snapshot as Prometheus text exposition format. Call once at
/// process startup, before any `metrics::counter!`/`histogram!` call. The
/// handle is stored on `AppState` so the `/metrics` route can render it.
pub fn install_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install the process-wide metrics recorder")
}

pub fn record_request(route: &'static str, status: u16) {
    metrics::counter!("requests_total", "route" => route, "status" => status.to_string()).increment(1);
}

pub fn record_stage_latency(stage: &'static str, millis: f64) {
    metrics::histogram!("stage_duration_ms", "stage" => stage).record(millis);
}

pub fn record_cache_outcome(category: &'static str, hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    metrics::counter!("cache_lookups_total", "category" => category, "outcome" => outcome).increment(1);
}

pub fn set_active_sessions(count: usize) {
    metrics::gauge!("active_sessions").set(count as f64);
}

pub fn set_pending_clarifications(count: usize) {
    metrics::gauge!("pending_clarifications").set(count as f64);
}

pub fn record_error(kind: &'static str) {
    metrics::counter!("errors_total", "kind" => kind).increment(1);
}

/// Used only by the binary to log the bound metrics listen address once.
pub fn log_bound_address(addr: SocketAddr) {
    tracing::info!(%addr, "metrics endpoint ready");
}
