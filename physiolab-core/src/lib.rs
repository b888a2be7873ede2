//! PhysioLab Core — peak-based indicators for physiological signals.
//!
//! This crate contains:
//! - Validated signals with a uniform or explicit time axis
//! - Threshold peak detection and peak boundary selection
//! - Per-peak duration and rising-slope extraction
//! - Inter-beat intervals with RR outlier filtering
//! - Ten scalar indicators over detected peaks, with typed parameters
//! - A content-hash keyed, single-flight result cache
//! - Diagnostics for degenerate inputs, routed to a pluggable sink
//! - TOML settings and parallel batch evaluation

pub mod batch;
pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod fingerprint;
pub mod indicators;
pub mod params;
pub mod signal;
pub mod tools;

pub use batch::{BatchEvaluator, BatchResults, BatchRow};
pub use cache::{CacheStats, IndicatorCache};
pub use config::{Settings, SettingsError};
pub use diagnostics::{
    CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, LogSink, NullSink,
};
pub use indicators::{Indicator, IndicatorKind, IndicatorOutput, UnknownIndicator};
pub use params::{ParamMap, ParamValue, ParameterError};
pub use signal::{DataError, Signal, TimeAxis};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything shared across worker threads is
    /// Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Signal>();
        require_sync::<Signal>();
        require_send::<Indicator>();
        require_sync::<Indicator>();
        require_send::<IndicatorOutput>();
        require_sync::<IndicatorOutput>();
        require_send::<IndicatorCache>();
        require_sync::<IndicatorCache>();
        require_send::<Settings>();
        require_sync::<Settings>();

        require_send::<LogSink>();
        require_sync::<LogSink>();
        require_send::<CollectingSink>();
        require_sync::<CollectingSink>();

        require_send::<DataError>();
        require_sync::<DataError>();
        require_send::<ParameterError>();
        require_sync::<ParameterError>();
    }
}
