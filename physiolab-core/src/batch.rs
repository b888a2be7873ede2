//! Batch evaluation — many indicators over many signals, optionally in
//! parallel, all sharing one cache and one diagnostic sink.
//!
//! A degenerate signal never aborts the batch: its `DataError`s stay in the
//! row of that signal and every other signal is still evaluated.

use rayon::prelude::*;

use crate::cache::IndicatorCache;
use crate::diagnostics::DiagnosticSink;
use crate::indicators::Indicator;
use crate::signal::{DataError, Signal};

/// Values of every indicator, in indicator order, for one signal.
pub type BatchRow = Vec<Result<f64, DataError>>;

/// Runs a fixed set of indicators over a collection of signals.
pub struct BatchEvaluator<'a> {
    indicators: Vec<Indicator>,
    cache: &'a IndicatorCache,
    sink: &'a dyn DiagnosticSink,
    parallel: bool,
}

impl<'a> BatchEvaluator<'a> {
    pub fn new(
        indicators: Vec<Indicator>,
        cache: &'a IndicatorCache,
        sink: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            indicators,
            cache,
            sink,
            parallel: true,
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    /// Evaluate every indicator on a single signal.
    pub fn evaluate_one(&self, signal: &Signal) -> BatchRow {
        self.indicators
            .iter()
            .map(|ind| ind.compute(signal, self.cache, self.sink))
            .collect()
    }

    /// Evaluate every indicator on every signal. Rows keep the order of
    /// `signals`.
    pub fn run(&self, signals: &[Signal]) -> BatchResults {
        self.run_with_progress(signals, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `progress(done, total)` after each
    /// signal completes. With parallelism on, completion order is arbitrary.
    pub fn run_with_progress<F>(&self, signals: &[Signal], progress: F) -> BatchResults
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        let total = signals.len();
        let done = std::sync::atomic::AtomicUsize::new(0);
        let eval = |signal: &Signal| {
            let row = self.evaluate_one(signal);
            let n = done.fetch_add(1, std::sync::atomic::Ordering::Relaxed) + 1;
            progress(n, total);
            row
        };

        let rows: Vec<BatchRow> = if self.parallel {
            signals.par_iter().map(eval).collect()
        } else {
            signals.iter().map(eval).collect()
        };

        let failed = rows.iter().filter(|r| r.iter().any(|v| v.is_err())).count();
        if failed > 0 {
            log::warn!("batch: {failed} of {total} signals had data errors");
        }
        log::debug!(
            "batch: {} indicators x {} signals, cache {:?}",
            self.indicators.len(),
            total,
            self.cache.stats()
        );

        BatchResults {
            names: self.indicators.iter().map(|i| i.name()).collect(),
            rows,
        }
    }
}

/// Results of a batch run: one row per signal, one column per indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResults {
    names: Vec<&'static str>,
    rows: Vec<BatchRow>,
}

impl BatchResults {
    /// Indicator names, in column order.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn rows(&self) -> &[BatchRow] {
        &self.rows
    }

    /// Number of signals evaluated.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one indicator, by name, in signal order.
    pub fn column(&self, name: &str) -> Option<Vec<Result<f64, DataError>>> {
        let col = self.names.iter().position(|n| *n == name)?;
        Some(self.rows.iter().map(|row| row[col].clone()).collect())
    }
}
