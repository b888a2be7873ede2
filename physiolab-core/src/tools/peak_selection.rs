//! Peak boundary selection — where each detected peak starts and stops.
//!
//! For every peak the selector searches a window before it (`pre_max`
//! seconds) for the start and a window after it (`post_max` seconds) for the
//! stop. Windows are clipped to the signal. The boundary is the nearest trough:
//! walking outward from the peak, the lowest sample seen before the signal
//! climbs again (ties go to the sample nearer the peak).
//!
//! A peak whose window is empty, or whose neighbourhood never drops below the
//! peak value, is dropped. The output carries the peak index of every
//! surviving interval, so later stages never have to re-align sequences.

use crate::params::{positive, ParamKind, ParameterDescriptor, ParameterError, ParamValue};
use crate::signal::{DataError, Signal};
use serde::{Deserialize, Serialize};

pub const PRE_MAX: ParameterDescriptor = ParameterDescriptor {
    name: "pre_max",
    default: Some(1.0),
    kind: ParamKind::Float,
    description: "Duration (s) before the peak searched for the start of the peak (> 0)",
    rule: "> 0",
    validity: positive,
};

pub const POST_MAX: ParameterDescriptor = ParameterDescriptor {
    name: "post_max",
    default: Some(1.0),
    kind: ParamKind::Float,
    description: "Duration (s) after the peak searched for the end of the peak (> 0)",
    rule: "> 0",
    validity: positive,
};

/// Start, peak and stop sample of one accepted peak; `start <= peak <= stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakInterval {
    pub start: usize,
    pub peak: usize,
    pub stop: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakSelection {
    pre_max: f64,
    post_max: f64,
}

impl PeakSelection {
    pub fn new(pre_max: f64, post_max: f64) -> Result<Self, ParameterError> {
        Ok(Self {
            pre_max: PRE_MAX.resolve_f64(Some(&ParamValue::Float(pre_max)))?,
            post_max: POST_MAX.resolve_f64(Some(&ParamValue::Float(post_max)))?,
        })
    }

    /// For windows that already went through descriptor resolution.
    pub(crate) fn from_validated(pre_max: f64, post_max: f64) -> Self {
        Self { pre_max, post_max }
    }

    pub fn pre_max(&self) -> f64 {
        self.pre_max
    }

    pub fn post_max(&self) -> f64 {
        self.post_max
    }

    /// Find the interval around each peak in `idx_maxs`.
    ///
    /// The result may be shorter than `idx_maxs`. Out-of-range peak indices
    /// are a `DataError`.
    pub fn select(
        &self,
        signal: &Signal,
        idx_maxs: &[usize],
    ) -> Result<Vec<PeakInterval>, DataError> {
        let values = signal.values();
        let mut intervals = Vec::with_capacity(idx_maxs.len());

        for &peak in idx_maxs {
            signal.check_index(peak)?;

            let lo = signal.window_start(peak, self.pre_max);
            let hi = signal.window_end(peak, self.post_max);

            let start = nearest_trough(values, peak, (lo..peak).rev());
            let stop = nearest_trough(values, peak, peak + 1..=hi);

            if let (Some(start), Some(stop)) = (start, stop) {
                intervals.push(PeakInterval { start, peak, stop });
            }
        }

        Ok(intervals)
    }
}

/// Walk `path` (ordered outward from `peak`) and return the lowest sample
/// reached before the signal rises again, or `None` if it never drops below
/// the peak value.
fn nearest_trough(values: &[f64], peak: usize, path: impl Iterator<Item = usize>) -> Option<usize> {
    let mut best = peak;
    let mut best_val = values[peak];

    for j in path {
        let v = values[j];
        if v < best_val {
            best = j;
            best_val = v;
        } else if v > best_val {
            break;
        }
    }

    (best != peak).then_some(best)
}

/// Start indices of `intervals`, in order.
pub fn starts(intervals: &[PeakInterval]) -> Vec<usize> {
    intervals.iter().map(|iv| iv.start).collect()
}

/// Peak indices of `intervals`, in order.
pub fn peaks(intervals: &[PeakInterval]) -> Vec<usize> {
    intervals.iter().map(|iv| iv.peak).collect()
}

/// Stop indices of `intervals`, in order.
pub fn stops(intervals: &[PeakInterval]) -> Vec<usize> {
    intervals.iter().map(|iv| iv.stop).collect()
}
