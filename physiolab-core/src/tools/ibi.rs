//! Inter-beat intervals from a pulse-like waveform (ECG, BVP).
//!
//! Beats are the maxima confirmed by `PeakDetection`; the intervals are the
//! successive differences of their times, in seconds.

use super::PeakDetection;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::signal::Signal;

/// Seconds between consecutive detected peaks.
///
/// Fewer than two peaks → empty, and a `NoPeaks` diagnostic goes to `sink`.
pub fn inter_beat_intervals(
    signal: &Signal,
    detection: &PeakDetection,
    sink: &dyn DiagnosticSink,
) -> Vec<f64> {
    let peaks = detection.detect(signal);
    if peaks.num_peaks() < 2 {
        sink.report(&Diagnostic::new("ibi", DiagnosticKind::NoPeaks));
        return Vec::new();
    }
    peaks
        .idx_maxs
        .windows(2)
        .map(|w| signal.time_at(w[1]) - signal.time_at(w[0]))
        .collect()
}
