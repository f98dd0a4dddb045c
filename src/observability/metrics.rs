//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lambda_proxy_requests_total` (counter): requests by method, status
//! - `lambda_proxy_request_duration_seconds` (histogram): end-to-end latency
//! - `lambda_proxy_invocations_total` (counter): invocations by outcome
//! - `lambda_proxy_invocation_duration_seconds` (histogram): time inside the function
//! - `lambda_proxy_gate_waiting` (gauge): requests queued at the admission gate
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationOutcome {
    Success,
    FunctionError,
    Failed,
}

impl InvocationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationOutcome::Success => "success",
            InvocationOutcome::FunctionError => "function_error",
            InvocationOutcome::Failed => "failed",
        }
    }
}

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "lambda_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("lambda_proxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_invocation(outcome: InvocationOutcome, start: Instant) {
    metrics::counter!("lambda_proxy_invocations_total", "outcome" => outcome.as_str()).increment(1);
    metrics::histogram!("lambda_proxy_invocation_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Track a request waiting at the admission gate until the guard drops.
pub fn gate_waiting() -> GateWaitGuard {
    metrics::gauge!("lambda_proxy_gate_waiting").increment(1.0);
    GateWaitGuard
}

#[derive(Debug)]
pub struct GateWaitGuard;

impl Drop for GateWaitGuard {
    fn drop(&mut self) {
        metrics::gauge!("lambda_proxy_gate_waiting").decrement(1.0);
    }
}
