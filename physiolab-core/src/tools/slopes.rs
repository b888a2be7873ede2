//! Peak slopes: rate of amplitude change from each interval's start to its peak.

use crate::signal::{DataError, Signal};

/// `(x[peak] - x[start]) / (time[peak] - time[start])` for every matched pair.
///
/// A zero time difference yields NaN. Mismatched lengths or out-of-range
/// indices are `DataError`s.
pub fn slopes(signal: &Signal, starts: &[usize], peaks: &[usize]) -> Result<Vec<f64>, DataError> {
    if starts.len() != peaks.len() {
        return Err(DataError::LengthMismatch {
            left: starts.len(),
            right: peaks.len(),
        });
    }

    starts
        .iter()
        .zip(peaks)
        .map(|(&start, &peak)| {
            signal.check_index(start)?;
            signal.check_index(peak)?;
            let dt = signal.time_at(peak) - signal.time_at(start);
            if dt == 0.0 {
                return Ok(f64::NAN);
            }
            Ok((signal.value_at(peak) - signal.value_at(start)) / dt)
        })
        .collect()
}
