//! Threshold-based alternating extrema detection.
//!
//! A single left-to-right scan tracks the running maximum and minimum. A
//! maximum is confirmed once the signal falls more than `delta` below it, a
//! minimum once the signal rises more than `delta` above it, and the scan then
//! switches to looking for the other kind. Maxima and minima therefore strictly
//! alternate.
//!
//! O(n) time, O(1) state besides the output.

use crate::params::{positive, ParamKind, ParameterDescriptor, ParameterError, ParamValue};
use crate::signal::Signal;
use serde::{Deserialize, Serialize};

pub const DELTA: ParameterDescriptor = ParameterDescriptor {
    name: "delta",
    default: None,
    kind: ParamKind::Float,
    description: "Amplitude of the minimum peak (> 0)",
    rule: "> 0",
    validity: positive,
};

/// Detected extrema, in detection order (which is also index order).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakSet {
    pub idx_maxs: Vec<usize>,
    pub idx_mins: Vec<usize>,
    pub val_maxs: Vec<f64>,
    pub val_mins: Vec<f64>,
}

impl PeakSet {
    /// Number of confirmed maxima.
    pub fn num_peaks(&self) -> usize {
        self.idx_maxs.len()
    }

    /// True when no maximum was confirmed.
    pub fn is_empty(&self) -> bool {
        self.idx_maxs.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakDetection {
    delta: f64,
}

impl PeakDetection {
    /// Fails on `delta <= 0` (or non-finite) before any scan can happen.
    pub fn new(delta: f64) -> Result<Self, ParameterError> {
        let delta = DELTA.resolve_f64(Some(&ParamValue::Float(delta)))?;
        Ok(Self { delta })
    }

    /// For deltas that already went through [`DELTA`] resolution.
    pub(crate) fn from_validated(delta: f64) -> Self {
        Self { delta }
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn detect(&self, signal: &Signal) -> PeakSet {
        self.detect_values(signal.values())
    }

    /// Scan raw samples. Fewer than two samples yields an empty set.
    pub fn detect_values(&self, values: &[f64]) -> PeakSet {
        let mut peaks = PeakSet::default();
        if values.len() < 2 {
            return peaks;
        }

        let mut running_max = f64::NEG_INFINITY;
        let mut running_min = f64::INFINITY;
        let mut max_pos = 0;
        let mut min_pos = 0;
        let mut seeking_max = true;

        for (i, &v) in values.iter().enumerate() {
            if v > running_max {
                running_max = v;
                max_pos = i;
            }
            if v < running_min {
                running_min = v;
                min_pos = i;
            }

            if seeking_max {
                if v < running_max - self.delta {
                    peaks.idx_maxs.push(max_pos);
                    peaks.val_maxs.push(running_max);
                    running_min = v;
                    min_pos = i;
                    seeking_max = false;
                }
            } else if v > running_min + self.delta {
                peaks.idx_mins.push(min_pos);
                peaks.val_mins.push(running_min);
                running_max = v;
                max_pos = i;
                seeking_max = true;
            }
        }

        peaks
    }
}
