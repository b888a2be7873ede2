//! Property tests for peak invariants.
//!
//! Uses proptest to verify:
//! 1. Detected maxima and minima strictly alternate and are strictly increasing
//! 2. Detection is deterministic
//! 3. Every selected interval satisfies start <= peak <= stop
//! 4. Durations are non-negative (or NaN)
//! 5. Non-positive deltas never build an indicator
//! 6. Cached and uncached evaluation agree

use physiolab_core::tools::{durations, PeakDetection, PeakSelection};
use physiolab_core::tools::peak_selection::{starts, stops};
use physiolab_core::{
    Indicator, IndicatorCache, IndicatorKind, NullSink, ParamMap, ParamValue, ParameterError,
    Signal,
};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-100.0..100.0_f64, 2..300)
}

fn arb_delta() -> impl Strategy<Value = f64> {
    (0.01..50.0_f64).prop_map(|d| (d * 100.0).round() / 100.0 + 0.01)
}

fn arb_window() -> impl Strategy<Value = f64> {
    0.1..20.0_f64
}

fn arb_fs() -> impl Strategy<Value = f64> {
    prop_oneof![Just(1.0), Just(4.0), Just(64.0), 0.5..128.0_f64]
}

fn delta_map(delta: f64) -> ParamMap {
    ParamMap::from([("delta".to_string(), ParamValue::Float(delta))])
}

// ── 1. Alternation and ordering ──────────────────────────────────────

proptest! {
    #[test]
    fn extrema_alternate(values in arb_values(), delta in arb_delta()) {
        let peaks = PeakDetection::new(delta).unwrap().detect_values(&values);

        prop_assert!(peaks.idx_maxs.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(peaks.idx_mins.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(peaks.idx_maxs.len(), peaks.val_maxs.len());
        prop_assert_eq!(peaks.idx_mins.len(), peaks.val_mins.len());

        // scan starts seeking a maximum, so maxima lead by at most one
        let (nmax, nmin) = (peaks.idx_maxs.len(), peaks.idx_mins.len());
        prop_assert!(nmax == nmin || nmax == nmin + 1, "{} maxima, {} minima", nmax, nmin);
        for (i, &min) in peaks.idx_mins.iter().enumerate() {
            prop_assert!(peaks.idx_maxs[i] < min);
            if let Some(&next) = peaks.idx_maxs.get(i + 1) {
                prop_assert!(min < next);
            }
        }

        for (&i, &v) in peaks.idx_maxs.iter().zip(&peaks.val_maxs) {
            prop_assert_eq!(values[i], v);
        }
    }

    // ── 2. Determinism ───────────────────────────────────────────────

    #[test]
    fn detection_is_deterministic(values in arb_values(), delta in arb_delta()) {
        let detector = PeakDetection::new(delta).unwrap();
        prop_assert_eq!(detector.detect_values(&values), detector.detect_values(&values));
    }

    // ── 3/4. Interval ordering and durations ─────────────────────────

    #[test]
    fn intervals_are_ordered_and_durations_non_negative(
        values in arb_values(),
        delta in arb_delta(),
        fs in arb_fs(),
        pre in arb_window(),
        post in arb_window(),
    ) {
        let signal = Signal::new(values, fs).unwrap();
        let peaks = PeakDetection::new(delta).unwrap().detect(&signal);
        let intervals = PeakSelection::new(pre, post)
            .unwrap()
            .select(&signal, &peaks.idx_maxs)
            .unwrap();

        prop_assert!(intervals.len() <= peaks.idx_maxs.len());
        for iv in &intervals {
            prop_assert!(iv.start < iv.peak && iv.peak < iv.stop, "{:?}", iv);
            prop_assert!(peaks.idx_maxs.contains(&iv.peak));
            prop_assert!(signal.values()[iv.start] < signal.values()[iv.peak]);
            prop_assert!(signal.values()[iv.stop] < signal.values()[iv.peak]);
        }

        let d = durations(&signal, &starts(&intervals), &stops(&intervals)).unwrap();
        prop_assert_eq!(d.len(), intervals.len());
        for x in d {
            prop_assert!(x.is_nan() || x >= 0.0);
        }
    }

    // ── 5. Parameter validation ──────────────────────────────────────

    #[test]
    fn non_positive_delta_is_rejected(delta in -100.0..=0.0_f64) {
        for kind in IndicatorKind::ALL {
            let built = Indicator::new(kind, &delta_map(delta));
            let is_invalid = matches!(built, Err(ParameterError::Invalid { .. }));
            prop_assert!(is_invalid);
        }
    }

    // ── 6. Cache transparency ────────────────────────────────────────

    #[test]
    fn cached_matches_uncached(values in arb_values(), delta in arb_delta()) {
        let signal = Signal::new(values, 8.0).unwrap();
        let cache = IndicatorCache::new();
        for kind in IndicatorKind::ALL {
            let ind = Indicator::new(kind, &delta_map(delta)).unwrap();
            let direct = ind.algorithm(&signal).unwrap().value;
            let first = ind.compute(&signal, &cache, &NullSink).unwrap();
            let second = ind.compute(&signal, &cache, &NullSink).unwrap();
            prop_assert!(direct == first || (direct.is_nan() && first.is_nan()));
            prop_assert!(first == second || (first.is_nan() && second.is_nan()));
        }
        let stats = cache.stats();
        prop_assert_eq!(stats.misses, IndicatorKind::ALL.len() as u64);
        prop_assert_eq!(stats.hits, IndicatorKind::ALL.len() as u64);
    }
}
