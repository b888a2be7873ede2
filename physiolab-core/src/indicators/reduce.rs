//! NaN-ignoring reductions over extracted per-peak values.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    Min,
    Max,
    Mean,
}

impl Reduction {
    /// Reduce the non-NaN entries of `values`. `None` when there are none.
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        let mut kept = values.iter().copied().filter(|v| !v.is_nan());
        let first = kept.next()?;
        Some(match self {
            Reduction::Min => kept.fold(first, f64::min),
            Reduction::Max => kept.fold(first, f64::max),
            Reduction::Mean => {
                let (sum, n) = kept.fold((first, 1usize), |(s, n), v| (s + v, n + 1));
                sum / n as f64
            }
        })
    }
}
