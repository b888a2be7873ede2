//! Peak durations: elapsed time from each interval's start to its stop.

use crate::signal::{DataError, Signal};

/// `time[stop] - time[start]` for every matched pair, in order.
///
/// Nothing is dropped. A pair whose stop precedes its start yields NaN rather
/// than an error; mismatched lengths or out-of-range indices are `DataError`s.
pub fn durations(signal: &Signal, starts: &[usize], stops: &[usize]) -> Result<Vec<f64>, DataError> {
    if starts.len() != stops.len() {
        return Err(DataError::LengthMismatch {
            left: starts.len(),
            right: stops.len(),
        });
    }

    starts
        .iter()
        .zip(stops)
        .map(|(&start, &stop)| {
            signal.check_index(start)?;
            signal.check_index(stop)?;
            let d = signal.time_at(stop) - signal.time_at(start);
            Ok(if d < 0.0 { f64::NAN } else { d })
        })
        .collect()
}
