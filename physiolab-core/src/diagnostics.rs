//! Non-fatal diagnostics raised while computing indicators.
//!
//! Degenerate inputs (no peaks, no boundaries) never produce an `Err`. The
//! indicator returns NaN (or 0 for counts) and attaches a `Diagnostic` to its
//! output. Callers that want a push-style hook pass a `DiagnosticSink`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The detector found no maxima.
    NoPeaks,
    /// Peaks were found but none had both a start and a stop boundary.
    NoBoundaries,
    /// Every extracted value was NaN, so the reduction has nothing to work on.
    AllNan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Name of the indicator that raised it (e.g. `duration_mean`).
    pub indicator: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(indicator: &str, kind: DiagnosticKind) -> Self {
        let message = match kind {
            DiagnosticKind::NoPeaks => "no peaks found",
            DiagnosticKind::NoBoundaries => "unable to detect the start and stop of the peaks",
            DiagnosticKind::AllNan => "every extracted value is NaN",
        };
        Self {
            indicator: indicator.to_string(),
            kind,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.indicator, self.message)
    }
}

/// Receives diagnostics as they are produced.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Forwards diagnostics to the `log` facade at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: &Diagnostic) {
        log::warn!("{diagnostic}");
    }
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _diagnostic: &Diagnostic) {}
}

/// Keeps every diagnostic in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    seen: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.seen.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.seen.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(diagnostic.clone());
        }
    }
}
