//! Amplitude indicators: statistics over the values of detected maxima.
//!
//! `peaks_max`, `peaks_min`, `peaks_mean` reduce `val_maxs`; `peaks_num`
//! counts them. No peaks → NaN (0 for the count) plus a `NoPeaks` diagnostic.

use super::reduce::Reduction;
use super::IndicatorOutput;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::params::{check_known, ParamMap, ParameterDescriptor, ParameterError};
use crate::signal::Signal;
use crate::tools::{PeakDetection, DELTA};
use serde::Serialize;
use std::collections::BTreeMap;

pub static PEAKS_PARAMS: [ParameterDescriptor; 1] = [DELTA];

/// Validated configuration of the amplitude group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeaksParams {
    delta: f64,
}

impl PeaksParams {
    pub fn builder() -> PeaksParamsBuilder {
        PeaksParamsBuilder::default()
    }

    /// Resolve every declared parameter against `provided`.
    pub fn from_map(provided: &ParamMap) -> Result<Self, ParameterError> {
        check_known(&PEAKS_PARAMS, provided)?;
        Ok(Self {
            delta: DELTA.resolve_f64(provided.get(DELTA.name))?,
        })
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn detection(&self) -> PeakDetection {
        PeakDetection::from_validated(self.delta)
    }

    pub(crate) fn to_map(self) -> BTreeMap<String, f64> {
        BTreeMap::from([(DELTA.name.to_string(), self.delta)])
    }
}

#[derive(Debug, Clone, Default)]
pub struct PeaksParamsBuilder {
    provided: ParamMap,
}

impl PeaksParamsBuilder {
    pub fn delta(mut self, delta: f64) -> Self {
        self.provided.insert(DELTA.name.to_string(), delta.into());
        self
    }

    pub fn build(self) -> Result<PeaksParams, ParameterError> {
        PeaksParams::from_map(&self.provided)
    }
}

/// What to report about the detected maxima.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PeakStat {
    Reduce(Reduction),
    Count,
}

pub(crate) fn compute(
    name: &str,
    params: PeaksParams,
    signal: &Signal,
    stat: PeakStat,
) -> IndicatorOutput {
    let peaks = params.detection().detect(signal);

    if peaks.is_empty() {
        let fallback = match stat {
            PeakStat::Count => 0.0,
            PeakStat::Reduce(_) => f64::NAN,
        };
        let diagnostic = Diagnostic::new(name, DiagnosticKind::NoPeaks);
        return IndicatorOutput::degraded(fallback, diagnostic);
    }

    match stat {
        PeakStat::Count => IndicatorOutput::value(peaks.num_peaks() as f64),
        // val_maxs is finite (signals are), so the reduction always has input
        PeakStat::Reduce(how) => {
            IndicatorOutput::value(how.apply(&peaks.val_maxs).unwrap_or(f64::NAN))
        }
    }
}
