use std::time::Duration;

use crate::{Operation, OperationMetrics, Status};

/// Emits through the `metrics` facade.
///
/// Nothing is exported unless the process installs a `metrics` recorder;
/// without one the macros are no-ops.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsRecorder;

impl OperationMetrics for MetricsRecorder {
    fn record_operation(
        &self,
        operation: Operation,
        latency: Duration,
        status: Status,
        items: usize,
    ) {
        metrics::counter!(
            "clausefp_operations_total",
            "operation" => operation.as_str(),
            "status" => status.as_str()
        )
        .increment(1);
        metrics::histogram!(
            "clausefp_operation_duration_ms",
            "operation" => operation.as_str()
        )
        .record(latency.as_secs_f64() * 1000.0);
        if status == Status::Success {
            metrics::histogram!("clausefp_operation_items", "operation" => operation.as_str())
                .record(items as f64);
        }
    }

    fn record_score(&self, name: &'static str, value: f64) {
        metrics::gauge!("clausefp_eval_score", "metric" => name).set(value);
    }

    fn record_label(&self, operation: Operation, label: &'static str) {
        metrics::counter!(
            "clausefp_operation_labels_total",
            "operation" => operation.as_str(),
            "label" => label
        )
        .increment(1);
    }
}

/// Writes one structured `tracing` event per operation.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetrics;

impl OperationMetrics for TracingMetrics {
    fn record_operation(
        &self,
        operation: Operation,
        latency: Duration,
        status: Status,
        items: usize,
    ) {
        let latency_ms = latency.as_secs_f64() * 1000.0;
        match status {
            Status::Success => tracing::debug!(
                operation = operation.as_str(),
                latency_ms,
                items,
                "operation completed"
            ),
            Status::Error => tracing::warn!(
                operation = operation.as_str(),
                latency_ms,
                "operation failed"
            ),
        }
    }

    fn record_score(&self, name: &'static str, value: f64) {
        tracing::info!(metric = name, value, "evaluation score");
    }

    fn record_label(&self, operation: Operation, label: &'static str) {
        tracing::debug!(operation = operation.as_str(), label, "operation label");
    }
}
