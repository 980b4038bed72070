//! Observer hooks for externally bound operations.
//!
//! Provider-facing calls (embedding, persisted insert, persisted search and
//! the evaluation judge) and the two analysis tools report through a single
//! [`OperationMetrics`] observer. Callers own the observer and pass it to the
//! components they build; there is no process-wide registry.
//!
//! Components do not time themselves. They are wrapped by decorators that call
//! [`instrument`] / [`instrument_sync`], which read the item count straight
//! from the structured result.
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

mod recorders;

pub use recorders::{MetricsRecorder, TracingMetrics};

/// Instrumented operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Embed,
    Insert,
    Search,
    Judge,
    ExtractClauses,
    ScoreRisk,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Embed => "embed",
            Operation::Insert => "insert",
            Operation::Search => "search",
            Operation::Judge => "judge",
            Operation::ExtractClauses => "extract_clauses",
            Operation::ScoreRisk => "score_risk",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Error => "error",
        }
    }
}

/// Metrics observer for instrumented operations.
pub trait OperationMetrics: Send + Sync {
    /// Record one completed operation.
    ///
    /// `items` is the size of the result (vectors embedded, rows inserted,
    /// hits returned, samples judged, clauses found). It is zero on error.
    fn record_operation(
        &self,
        operation: Operation,
        latency: Duration,
        status: Status,
        items: usize,
    );

    /// Record a named quality score such as `faithfulness`.
    fn record_score(&self, _name: &'static str, _value: f64) {}

    /// Record a categorical outcome such as the tier of a risk assessment.
    fn record_label(&self, _operation: Operation, _label: &'static str) {}
}

pub type SharedMetrics = Arc<dyn OperationMetrics>;

/// Observer that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl OperationMetrics for NoopMetrics {
    fn record_operation(&self, _: Operation, _: Duration, _: Status, _: usize) {}
}

pub fn noop() -> SharedMetrics {
    Arc::new(NoopMetrics)
}

/// Forwards every event to each inner observer in order.
#[derive(Clone, Default)]
pub struct FanoutMetrics {
    inner: Vec<SharedMetrics>,
}

impl FanoutMetrics {
    pub fn new(inner: Vec<SharedMetrics>) -> Self {
        Self { inner }
    }

    pub fn push(&mut self, recorder: SharedMetrics) {
        self.inner.push(recorder);
    }
}

impl OperationMetrics for FanoutMetrics {
    fn record_operation(
        &self,
        operation: Operation,
        latency: Duration,
        status: Status,
        items: usize,
    ) {
        for recorder in &self.inner {
            recorder.record_operation(operation, latency, status, items);
        }
    }

    fn record_score(&self, name: &'static str, value: f64) {
        for recorder in &self.inner {
            recorder.record_score(name, value);
        }
    }

    fn record_label(&self, operation: Operation, label: &'static str) {
        for recorder in &self.inner {
            recorder.record_label(operation, label);
        }
    }
}

/// A recorded operation, as captured by [`RecordingMetrics`].
#[derive(Debug, Clone, PartialEq)]
pub struct OperationEvent {
    pub operation: Operation,
    pub status: Status,
    pub items: usize,
    pub latency: Duration,
}

/// Keeps every event in memory. Useful in tests and for one-shot CLI summaries.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    events: Mutex<Vec<OperationEvent>>,
    scores: Mutex<Vec<(&'static str, f64)>>,
    labels: Mutex<Vec<(Operation, &'static str)>>,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<OperationEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn events_for(&self, operation: Operation) -> Vec<OperationEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.operation == operation)
            .collect()
    }

    pub fn scores(&self) -> Vec<(&'static str, f64)> {
        self.scores
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn labels(&self) -> Vec<(Operation, &'static str)> {
        self.labels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl OperationMetrics for RecordingMetrics {
    fn record_operation(
        &self,
        operation: Operation,
        latency: Duration,
        status: Status,
        items: usize,
    ) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(OperationEvent {
                operation,
                status,
                items,
                latency,
            });
    }

    fn record_score(&self, name: &'static str, value: f64) {
        self.scores
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((name, value));
    }

    fn record_label(&self, operation: Operation, label: &'static str) {
        self.labels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((operation, label));
    }
}

/// Timer for one operation; reports to the recorder when finished.
pub struct OperationSpan<'a> {
    recorder: &'a dyn OperationMetrics,
    operation: Operation,
    start: Instant,
}

impl<'a> OperationSpan<'a> {
    pub fn start(recorder: &'a dyn OperationMetrics, operation: Operation) -> Self {
        Self {
            recorder,
            operation,
            start: Instant::now(),
        }
    }

    pub fn success(self, items: usize) {
        self.recorder
            .record_operation(self.operation, self.start.elapsed(), Status::Success, items);
    }

    pub fn failure(self) {
        self.recorder
            .record_operation(self.operation, self.start.elapsed(), Status::Error, 0);
    }

    pub fn finish<T, E>(self, result: &Result<T, E>, items: impl FnOnce(&T) -> usize) {
        match result {
            Ok(value) => {
                let count = items(value);
                self.success(count);
            }
            Err(_) => self.failure(),
        }
    }
}

/// Time an async operation and report its outcome.
pub async fn instrument<T, E, Fut>(
    recorder: &dyn OperationMetrics,
    operation: Operation,
    items: impl FnOnce(&T) -> usize,
    fut: Fut,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    let span = OperationSpan::start(recorder, operation);
    let result = fut.await;
    span.finish(&result, items);
    result
}

/// Time a synchronous operation and report its outcome.
pub fn instrument_sync<T, E>(
    recorder: &dyn OperationMetrics,
    operation: Operation,
    items: impl FnOnce(&T) -> usize,
    op: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let span = OperationSpan::start(recorder, operation);
    let result = op();
    span.finish(&result, items);
    result
}
