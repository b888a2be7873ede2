//! Interval indicators: durations and slopes of bounded peaks.
//!
//! Pipeline: detect peaks → select start/stop boundaries → extract one
//! duration or slope per interval → reduce. Each stage short-circuits with
//! NaN and a diagnostic when it has nothing to hand on.

use super::reduce::Reduction;
use super::IndicatorOutput;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::params::{check_known, ParamMap, ParameterDescriptor, ParameterError};
use crate::signal::{DataError, Signal};
use crate::tools::peak_selection::{peaks, starts, stops};
use crate::tools::{durations, slopes, PeakDetection, PeakSelection, DELTA, POST_MAX, PRE_MAX};
use serde::Serialize;
use std::collections::BTreeMap;

pub static INTERVAL_PARAMS: [ParameterDescriptor; 3] = [DELTA, PRE_MAX, POST_MAX];

/// Validated configuration of the interval group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntervalParams {
    delta: f64,
    pre_max: f64,
    post_max: f64,
}

impl IntervalParams {
    pub fn builder() -> IntervalParamsBuilder {
        IntervalParamsBuilder::default()
    }

    pub fn from_map(provided: &ParamMap) -> Result<Self, ParameterError> {
        check_known(&INTERVAL_PARAMS, provided)?;
        Ok(Self {
            delta: DELTA.resolve_f64(provided.get(DELTA.name))?,
            pre_max: PRE_MAX.resolve_f64(provided.get(PRE_MAX.name))?,
            post_max: POST_MAX.resolve_f64(provided.get(POST_MAX.name))?,
        })
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn pre_max(&self) -> f64 {
        self.pre_max
    }

    pub fn post_max(&self) -> f64 {
        self.post_max
    }

    pub fn detection(&self) -> PeakDetection {
        PeakDetection::from_validated(self.delta)
    }

    pub fn selection(&self) -> PeakSelection {
        PeakSelection::from_validated(self.pre_max, self.post_max)
    }

    pub(crate) fn to_map(self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            (DELTA.name.to_string(), self.delta),
            (PRE_MAX.name.to_string(), self.pre_max),
            (POST_MAX.name.to_string(), self.post_max),
        ])
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntervalParamsBuilder {
    provided: ParamMap,
}

impl IntervalParamsBuilder {
    pub fn delta(mut self, delta: f64) -> Self {
        self.provided.insert(DELTA.name.to_string(), delta.into());
        self
    }

    pub fn pre_max(mut self, seconds: f64) -> Self {
        self.provided.insert(PRE_MAX.name.to_string(), seconds.into());
        self
    }

    pub fn post_max(mut self, seconds: f64) -> Self {
        self.provided.insert(POST_MAX.name.to_string(), seconds.into());
        self
    }

    pub fn build(self) -> Result<IntervalParams, ParameterError> {
        IntervalParams::from_map(&self.provided)
    }
}

/// Which per-interval scalar to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Measure {
    Duration,
    Slope,
}

pub(crate) fn compute(
    name: &str,
    params: IntervalParams,
    signal: &Signal,
    measure: Measure,
    how: Reduction,
) -> Result<IndicatorOutput, DataError> {
    let detected = params.detection().detect(signal);
    if detected.is_empty() {
        return Ok(IndicatorOutput::degraded(
            f64::NAN,
            Diagnostic::new(name, DiagnosticKind::NoPeaks),
        ));
    }

    let intervals = params.selection().select(signal, &detected.idx_maxs)?;
    if intervals.is_empty() {
        return Ok(IndicatorOutput::degraded(
            f64::NAN,
            Diagnostic::new(name, DiagnosticKind::NoBoundaries),
        ));
    }

    let extracted = match measure {
        Measure::Duration => durations(signal, &starts(&intervals), &stops(&intervals))?,
        Measure::Slope => slopes(signal, &starts(&intervals), &peaks(&intervals))?,
    };

    Ok(match how.apply(&extracted) {
        Some(v) => IndicatorOutput::value(v),
        None => {
            IndicatorOutput::degraded(f64::NAN, Diagnostic::new(name, DiagnosticKind::AllNan))
        }
    })
}
