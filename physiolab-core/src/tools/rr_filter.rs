//! Outlier removal for inter-beat interval series.
//!
//! Two checks per interval, in series order. An interval outside
//! `[min_rr, max_rr]` seconds is dropped. A surviving interval is then kept
//! only if it lies within `tolerance` (a fraction) of the mean of the last
//! `window` intervals already kept. The first in-range interval seeds the
//! running mean.

use crate::params::{positive, ParamKind, ParameterDescriptor, ParameterError, ParamValue};

pub const MIN_RR: ParameterDescriptor = ParameterDescriptor {
    name: "min_rr",
    default: Some(0.4),
    kind: ParamKind::Float,
    description: "Shortest plausible interval in seconds (> 0)",
    rule: "> 0",
    validity: positive,
};

pub const MAX_RR: ParameterDescriptor = ParameterDescriptor {
    name: "max_rr",
    default: Some(2.0),
    kind: ParamKind::Float,
    description: "Longest plausible interval in seconds (> 0)",
    rule: "> 0",
    validity: positive,
};

pub const TOLERANCE: ParameterDescriptor = ParameterDescriptor {
    name: "tolerance",
    default: Some(0.25),
    kind: ParamKind::Float,
    description: "Largest relative deviation from the running mean (> 0)",
    rule: "> 0",
    validity: positive,
};

pub const WINDOW: ParameterDescriptor = ParameterDescriptor {
    name: "window",
    default: Some(50.0),
    kind: ParamKind::Integer,
    description: "Number of kept intervals in the running mean (> 0)",
    rule: "> 0",
    validity: positive,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierFilter {
    min_rr: f64,
    max_rr: f64,
    tolerance: f64,
    window: usize,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self {
            min_rr: 0.4,
            max_rr: 2.0,
            tolerance: 0.25,
            window: 50,
        }
    }
}

impl OutlierFilter {
    /// Fails on non-positive values or when `min_rr >= max_rr`.
    pub fn new(
        min_rr: f64,
        max_rr: f64,
        tolerance: f64,
        window: usize,
    ) -> Result<Self, ParameterError> {
        let min_rr = MIN_RR.resolve_f64(Some(&ParamValue::Float(min_rr)))?;
        let max_rr = MAX_RR.resolve_f64(Some(&ParamValue::Float(max_rr)))?;
        if min_rr >= max_rr {
            return Err(ParameterError::Invalid {
                name: MIN_RR.name.to_string(),
                value: min_rr,
                rule: "< max_rr",
            });
        }
        let tolerance = TOLERANCE.resolve_f64(Some(&ParamValue::Float(tolerance)))?;
        let window = WINDOW.resolve_f64(Some(&ParamValue::Int(window as i64)))? as usize;
        Ok(Self {
            min_rr,
            max_rr,
            tolerance,
            window,
        })
    }

    /// Intervals that pass both checks, in their original order.
    pub fn filter(&self, ibi: &[f64]) -> Vec<f64> {
        let mut kept: Vec<f64> = Vec::with_capacity(ibi.len());
        for &rr in ibi {
            if !(self.min_rr..=self.max_rr).contains(&rr) {
                continue;
            }
            let recent = &kept[kept.len().saturating_sub(self.window)..];
            if !recent.is_empty() {
                let mean = recent.iter().sum::<f64>() / recent.len() as f64;
                if (rr - mean).abs() > self.tolerance * mean {
                    continue;
                }
            }
            kept.push(rr);
        }
        if kept.len() < ibi.len() {
            log::debug!(
                "rr filter dropped {} of {} intervals",
                ibi.len() - kept.len(),
                ibi.len()
            );
        }
        kept
    }
}
