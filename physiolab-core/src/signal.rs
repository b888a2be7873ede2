//! Signal — the sampled waveform every indicator reads.
//!
//! A signal is an ordered run of finite samples plus a time axis. The axis is
//! either a uniform sampling rate or explicit timestamps (seconds). Signals are
//! validated once at construction and immutable afterwards, so the scanning
//! stages downstream never have to re-check their input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Slack used when comparing time spans, so that a window of exactly
/// `k / fs` seconds still includes the k-th sample.
const TIME_EPSILON: f64 = 1e-9;

/// Fatal problems with the data handed to the core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("signal has no samples")]
    Empty,

    #[error("sample {index} is not finite ({value})")]
    NonFinite { index: usize, value: f64 },

    #[error("sampling rate must be finite and > 0, got {0}")]
    InvalidSamplingRate(f64),

    #[error("time axis has {times} timestamps for {samples} samples")]
    TimeAxisLength { samples: usize, times: usize },

    #[error("timestamp {index} is not finite or goes backwards")]
    NonMonotonicTime { index: usize },

    #[error("sample index {index} is out of bounds for a signal of {len} samples")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("boundary sequences differ in length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
}

/// How sample positions map to seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimeAxis {
    /// Evenly spaced samples; `t[i] = i / fs`.
    Uniform { fs: f64 },
    /// One timestamp per sample, non-decreasing.
    Explicit { times: Vec<f64> },
}

/// Validated samples plus their time axis.
///
/// Not `Deserialize`: the only way in is through the checking constructors.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    values: Vec<f64>,
    axis: TimeAxis,
}

impl Signal {
    /// Build a uniformly sampled signal.
    pub fn new(values: Vec<f64>, fs: f64) -> Result<Self, DataError> {
        if !fs.is_finite() || fs <= 0.0 {
            return Err(DataError::InvalidSamplingRate(fs));
        }
        check_samples(&values)?;
        Ok(Self {
            values,
            axis: TimeAxis::Uniform { fs },
        })
    }

    /// Build a signal with explicit timestamps (seconds).
    pub fn with_times(values: Vec<f64>, times: Vec<f64>) -> Result<Self, DataError> {
        check_samples(&values)?;
        if times.len() != values.len() {
            return Err(DataError::TimeAxisLength {
                samples: values.len(),
                times: times.len(),
            });
        }
        for (index, t) in times.iter().enumerate() {
            let backwards = index > 0 && *t < times[index - 1];
            if !t.is_finite() || backwards {
                return Err(DataError::NonMonotonicTime { index });
            }
        }
        Ok(Self {
            values,
            axis: TimeAxis::Explicit { times },
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sampling rate, when the axis is uniform.
    pub fn sampling_rate(&self) -> Option<f64> {
        match self.axis {
            TimeAxis::Uniform { fs } => Some(fs),
            TimeAxis::Explicit { .. } => None,
        }
    }

    /// Time of sample `index` in seconds. Caller guarantees `index < len()`.
    pub fn time_at(&self, index: usize) -> f64 {
        match &self.axis {
            TimeAxis::Uniform { fs } => index as f64 / fs,
            TimeAxis::Explicit { times } => times[index],
        }
    }

    /// Checked variant of [`Signal::value_at`] / [`Signal::time_at`] for
    /// indices that come from outside the crate.
    pub fn check_index(&self, index: usize) -> Result<(), DataError> {
        if index < self.values.len() {
            Ok(())
        } else {
            Err(DataError::IndexOutOfBounds {
                index,
                len: self.values.len(),
            })
        }
    }

    /// Amplitude of sample `index`. Caller guarantees `index < len()`.
    pub fn value_at(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// First index `j <= peak` whose time lies within `span` seconds before
    /// `peak`. Returns `peak` itself when the span covers no earlier sample.
    pub fn window_start(&self, peak: usize, span: f64) -> usize {
        match &self.axis {
            TimeAxis::Uniform { fs } => {
                let samples = (span * fs + TIME_EPSILON).floor() as usize;
                peak.saturating_sub(samples)
            }
            TimeAxis::Explicit { times } => {
                let earliest = times[peak] - span - TIME_EPSILON;
                times[..=peak].partition_point(|&t| t < earliest)
            }
        }
    }

    /// Last index `j >= peak` whose time lies within `span` seconds after
    /// `peak`, clipped to the end of the signal.
    pub fn window_end(&self, peak: usize, span: f64) -> usize {
        let last = self.values.len() - 1;
        match &self.axis {
            TimeAxis::Uniform { fs } => {
                let samples = (span * fs + TIME_EPSILON).floor() as usize;
                peak.saturating_add(samples).min(last)
            }
            TimeAxis::Explicit { times } => {
                let latest = times[peak] + span + TIME_EPSILON;
                let after = times[peak..].partition_point(|&t| t <= latest);
                peak + after.saturating_sub(1)
            }
        }
    }
}

fn check_samples(values: &[f64]) -> Result<(), DataError> {
    if values.is_empty() {
        return Err(DataError::Empty);
    }
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(DataError::NonFinite {
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_signal() {
        assert_eq!(Signal::new(vec![], 10.0), Err(DataError::Empty));
    }

    #[test]
    fn rejects_non_finite_samples() {
        let err = Signal::new(vec![1.0, f64::NAN, 2.0], 10.0).unwrap_err();
        assert!(matches!(err, DataError::NonFinite { index: 1, .. }));
    }

    #[test]
    fn rejects_bad_sampling_rate() {
        assert!(matches!(
            Signal::new(vec![1.0], 0.0),
            Err(DataError::InvalidSamplingRate(_))
        ));
        assert!(matches!(
            Signal::new(vec![1.0], f64::INFINITY),
            Err(DataError::InvalidSamplingRate(_))
        ));
    }

    #[test]
    fn rejects_mismatched_or_backwards_times() {
        assert_eq!(
            Signal::with_times(vec![1.0, 2.0], vec![0.0]),
            Err(DataError::TimeAxisLength {
                samples: 2,
                times: 1
            })
        );
        assert_eq!(
            Signal::with_times(vec![1.0, 2.0, 3.0], vec![0.0, 0.5, 0.4]),
            Err(DataError::NonMonotonicTime { index: 2 })
        );
    }

    #[test]
    fn rejects_non_finite_times() {
        for bad in [f64::INFINITY, f64::NAN] {
            assert_eq!(
                Signal::with_times(vec![1.0, 2.0], vec![0.0, bad]),
                Err(DataError::NonMonotonicTime { index: 1 })
            );
        }
    }

    #[test]
    fn uniform_time_axis() {
        let s = Signal::new(vec![0.0; 5], 4.0).unwrap();
        assert_eq!(s.time_at(0), 0.0);
        assert_eq!(s.time_at(2), 0.5);
        assert_eq!(s.sampling_rate(), Some(4.0));
    }

    #[test]
    fn uniform_windows_clip_to_bounds() {
        let s = Signal::new(vec![0.0; 10], 2.0).unwrap();
        // 1 s at 2 Hz = 2 samples either side
        assert_eq!(s.window_start(5, 1.0), 3);
        assert_eq!(s.window_end(5, 1.0), 7);
        assert_eq!(s.window_start(1, 100.0), 0);
        assert_eq!(s.window_end(8, 100.0), 9);
        // less than one sample period
        assert_eq!(s.window_start(5, 0.2), 5);
    }

    #[test]
    fn explicit_windows_follow_timestamps() {
        let times = vec![0.0, 0.1, 0.5, 0.6, 1.4, 2.0];
        let s = Signal::with_times(vec![0.0; 6], times).unwrap();
        assert_eq!(s.window_start(3, 0.5), 1);
        assert_eq!(s.window_end(3, 0.8), 4);
        assert_eq!(s.window_end(5, 1.0), 5);
        assert_eq!(s.time_at(4), 1.4);
    }

    #[test]
    fn check_index_reports_out_of_bounds() {
        let s = Signal::new(vec![1.0, 2.0], 1.0).unwrap();
        assert!(s.check_index(1).is_ok());
        assert_eq!(
            s.check_index(2),
            Err(DataError::IndexOutOfBounds { index: 2, len: 2 })
        );
    }
}
