//! Concrete indicators over peak structure.
//!
//! Indicator kinds form a closed set. Each `Indicator` variant carries the
//! validated parameters of its group and dispatches by `match`:
//!
//! | group     | kinds                                               | parameters                     |
//! |-----------|-----------------------------------------------------|--------------------------------|
//! | amplitude | `peaks_max`, `peaks_min`, `peaks_mean`, `peaks_num` | `delta`                        |
//! | interval  | `duration_{min,max,mean}`, `slope_{min,max,mean}`   | `delta`, `pre_max`, `post_max` |
//!
//! Degenerate inputs never fail: the output value becomes NaN (0 for counts)
//! and a `Diagnostic` travels with it.

pub mod interval;
pub mod peaks;
pub mod reduce;

pub use interval::{IntervalParams, IntervalParamsBuilder, INTERVAL_PARAMS};
pub use peaks::{PeaksParams, PeaksParamsBuilder, PEAKS_PARAMS};
pub use reduce::Reduction;

use crate::cache::IndicatorCache;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::fingerprint::{CacheKey, IndicatorConfig, SignalHash};
use crate::params::{ParamMap, ParameterDescriptor, ParameterError};
use crate::signal::{DataError, Signal};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Name that did not match any indicator kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown indicator '{0}'")]
pub struct UnknownIndicator(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    PeaksMax,
    PeaksMin,
    PeaksMean,
    PeaksNum,
    DurationMin,
    DurationMax,
    DurationMean,
    SlopeMin,
    SlopeMax,
    SlopeMean,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 10] = [
        IndicatorKind::PeaksMax,
        IndicatorKind::PeaksMin,
        IndicatorKind::PeaksMean,
        IndicatorKind::PeaksNum,
        IndicatorKind::DurationMin,
        IndicatorKind::DurationMax,
        IndicatorKind::DurationMean,
        IndicatorKind::SlopeMin,
        IndicatorKind::SlopeMax,
        IndicatorKind::SlopeMean,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IndicatorKind::PeaksMax => "peaks_max",
            IndicatorKind::PeaksMin => "peaks_min",
            IndicatorKind::PeaksMean => "peaks_mean",
            IndicatorKind::PeaksNum => "peaks_num",
            IndicatorKind::DurationMin => "duration_min",
            IndicatorKind::DurationMax => "duration_max",
            IndicatorKind::DurationMean => "duration_mean",
            IndicatorKind::SlopeMin => "slope_min",
            IndicatorKind::SlopeMax => "slope_max",
            IndicatorKind::SlopeMean => "slope_mean",
        }
    }

    /// One-line summary for listings.
    pub fn summary(self) -> &'static str {
        match self {
            IndicatorKind::PeaksMax => "Maximum amplitude of detected peaks",
            IndicatorKind::PeaksMin => "Minimum amplitude of detected peaks",
            IndicatorKind::PeaksMean => "Average amplitude of detected peaks",
            IndicatorKind::PeaksNum => "Number of detected peaks",
            IndicatorKind::DurationMin => "Minimum duration of detected peaks",
            IndicatorKind::DurationMax => "Maximum duration of detected peaks",
            IndicatorKind::DurationMean => "Average duration of detected peaks",
            IndicatorKind::SlopeMin => "Minimum rising slope of detected peaks",
            IndicatorKind::SlopeMax => "Maximum rising slope of detected peaks",
            IndicatorKind::SlopeMean => "Average rising slope of detected peaks",
        }
    }

    /// The static parameter table of this kind.
    pub fn descriptors(self) -> &'static [ParameterDescriptor] {
        match self {
            IndicatorKind::PeaksMax
            | IndicatorKind::PeaksMin
            | IndicatorKind::PeaksMean
            | IndicatorKind::PeaksNum => &PEAKS_PARAMS,
            _ => &INTERVAL_PARAMS,
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndicatorKind {
    type Err = UnknownIndicator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IndicatorKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| UnknownIndicator(s.to_string()))
    }
}

/// Result of one indicator evaluation: the scalar plus whatever went wrong
/// along the way without being fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorOutput {
    pub value: f64,
    pub diagnostics: Vec<Diagnostic>,
}

impl IndicatorOutput {
    pub fn value(value: f64) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    pub fn degraded(fallback: f64, diagnostic: Diagnostic) -> Self {
        Self {
            value: fallback,
            diagnostics: vec![diagnostic],
        }
    }
}

/// A configured indicator, ready to run on any number of signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Indicator {
    PeaksMax(PeaksParams),
    PeaksMin(PeaksParams),
    PeaksMean(PeaksParams),
    PeaksNum(PeaksParams),
    DurationMin(IntervalParams),
    DurationMax(IntervalParams),
    DurationMean(IntervalParams),
    SlopeMin(IntervalParams),
    SlopeMax(IntervalParams),
    SlopeMean(IntervalParams),
}

impl Indicator {
    /// Resolve `provided` against the kind's descriptors. Fails before any
    /// signal is involved.
    pub fn new(kind: IndicatorKind, provided: &ParamMap) -> Result<Self, ParameterError> {
        Ok(match kind {
            IndicatorKind::PeaksMax => Indicator::PeaksMax(PeaksParams::from_map(provided)?),
            IndicatorKind::PeaksMin => Indicator::PeaksMin(PeaksParams::from_map(provided)?),
            IndicatorKind::PeaksMean => Indicator::PeaksMean(PeaksParams::from_map(provided)?),
            IndicatorKind::PeaksNum => Indicator::PeaksNum(PeaksParams::from_map(provided)?),
            IndicatorKind::DurationMin => {
                Indicator::DurationMin(IntervalParams::from_map(provided)?)
            }
            IndicatorKind::DurationMax => {
                Indicator::DurationMax(IntervalParams::from_map(provided)?)
            }
            IndicatorKind::DurationMean => {
                Indicator::DurationMean(IntervalParams::from_map(provided)?)
            }
            IndicatorKind::SlopeMin => Indicator::SlopeMin(IntervalParams::from_map(provided)?),
            IndicatorKind::SlopeMax => Indicator::SlopeMax(IntervalParams::from_map(provided)?),
            IndicatorKind::SlopeMean => Indicator::SlopeMean(IntervalParams::from_map(provided)?),
        })
    }

    pub fn kind(&self) -> IndicatorKind {
        match self {
            Indicator::PeaksMax(_) => IndicatorKind::PeaksMax,
            Indicator::PeaksMin(_) => IndicatorKind::PeaksMin,
            Indicator::PeaksMean(_) => IndicatorKind::PeaksMean,
            Indicator::PeaksNum(_) => IndicatorKind::PeaksNum,
            Indicator::DurationMin(_) => IndicatorKind::DurationMin,
            Indicator::DurationMax(_) => IndicatorKind::DurationMax,
            Indicator::DurationMean(_) => IndicatorKind::DurationMean,
            Indicator::SlopeMin(_) => IndicatorKind::SlopeMin,
            Indicator::SlopeMax(_) => IndicatorKind::SlopeMax,
            Indicator::SlopeMean(_) => IndicatorKind::SlopeMean,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Kind plus resolved parameter values; the basis of the cache key.
    pub fn config(&self) -> IndicatorConfig {
        let params = match *self {
            Indicator::PeaksMax(p)
            | Indicator::PeaksMin(p)
            | Indicator::PeaksMean(p)
            | Indicator::PeaksNum(p) => p.to_map(),
            Indicator::DurationMin(p)
            | Indicator::DurationMax(p)
            | Indicator::DurationMean(p)
            | Indicator::SlopeMin(p)
            | Indicator::SlopeMax(p)
            | Indicator::SlopeMean(p) => p.to_map(),
        };
        IndicatorConfig {
            kind: self.name().to_string(),
            params,
        }
    }

    pub fn cache_key(&self, signal: &Signal) -> CacheKey {
        CacheKey {
            config: self.config().config_hash(),
            signal: SignalHash::of(signal),
        }
    }

    /// The pure computation. No caching, no sink.
    pub fn algorithm(&self, signal: &Signal) -> Result<IndicatorOutput, DataError> {
        use self::interval::Measure::{Duration, Slope};
        use self::peaks::PeakStat::{Count, Reduce};
        use self::reduce::Reduction::{Max, Mean, Min};

        let name = self.name();
        match *self {
            Indicator::PeaksMax(p) => Ok(peaks::compute(name, p, signal, Reduce(Max))),
            Indicator::PeaksMin(p) => Ok(peaks::compute(name, p, signal, Reduce(Min))),
            Indicator::PeaksMean(p) => Ok(peaks::compute(name, p, signal, Reduce(Mean))),
            Indicator::PeaksNum(p) => Ok(peaks::compute(name, p, signal, Count)),
            Indicator::DurationMin(p) => interval::compute(name, p, signal, Duration, Min),
            Indicator::DurationMax(p) => interval::compute(name, p, signal, Duration, Max),
            Indicator::DurationMean(p) => interval::compute(name, p, signal, Duration, Mean),
            Indicator::SlopeMin(p) => interval::compute(name, p, signal, Slope, Min),
            Indicator::SlopeMax(p) => interval::compute(name, p, signal, Slope, Max),
            Indicator::SlopeMean(p) => interval::compute(name, p, signal, Slope, Mean),
        }
    }

    /// Cached evaluation returning the full output. Diagnostics are forwarded
    /// to `sink` on every call, hit or miss.
    pub fn evaluate(
        &self,
        signal: &Signal,
        cache: &IndicatorCache,
        sink: &dyn DiagnosticSink,
    ) -> Result<IndicatorOutput, DataError> {
        let key = self.cache_key(signal);
        let output = cache.get_or_compute(&key, || self.algorithm(signal))?;
        for diagnostic in &output.diagnostics {
            sink.report(diagnostic);
        }
        Ok(output)
    }

    /// Cached evaluation returning only the scalar.
    pub fn compute(
        &self,
        signal: &Signal,
        cache: &IndicatorCache,
        sink: &dyn DiagnosticSink,
    ) -> Result<f64, DataError> {
        self.evaluate(signal, cache, sink).map(|out| out.value)
    }
}
