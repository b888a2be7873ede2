//! Signal-processing primitives shared by the indicators.
//!
//! - `peak_detection`: alternating extrema above a `delta` swing
//! - `peak_selection`: start/stop boundary of each peak
//! - `durations` / `slopes`: per-interval scalars
//! - `ibi`: inter-beat intervals from peak times
//! - `rr_filter`: outlier removal for interval series

pub mod durations;
pub mod ibi;
pub mod peak_detection;
pub mod peak_selection;
pub mod rr_filter;
pub mod slopes;

pub use durations::durations;
pub use ibi::inter_beat_intervals;
pub use peak_detection::{PeakDetection, PeakSet, DELTA};
pub use peak_selection::{PeakInterval, PeakSelection, POST_MAX, PRE_MAX};
pub use rr_filter::OutlierFilter;
pub use slopes::slopes;

/// Build a 1 Hz signal from raw samples for testing.
#[cfg(test)]
pub fn make_signal(values: &[f64]) -> crate::signal::Signal {
    crate::signal::Signal::new(values.to_vec(), 1.0).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for numeric tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
