//! Property-based tests for observation analytics and score normalization.

use proptest::prelude::*;
use tidewatch_core::config::NormalizationBounds;
use tidewatch_core::observations::{
    latest_valid_value, prepare, trailing_window, year_over_year_change,
};
use tidewatch_core::regime::normalize;
use tidewatch_market_data::Observation;

// =============================================================================
// Generators
// =============================================================================

/// A value that is missing roughly one time in five.
fn arb_value() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        4 => (-1.0e6f64..1.0e6).prop_map(Some),
    ]
}

/// A chronologically ordered monthly sequence.
fn arb_sequence(
    len: impl Into<prop::collection::SizeRange>,
) -> impl Strategy<Value = Vec<Observation>> {
    prop::collection::vec(arb_value(), len).prop_map(|values| {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let (year, month) = (2000 + i / 12, i % 12 + 1);
                Observation::new(format!("{}-{:02}-01", year, month), v)
            })
            .collect()
    })
}

fn arb_bounds() -> impl Strategy<Value = NormalizationBounds> {
    (-100.0f64..100.0, 0.001f64..100.0)
        .prop_map(|(low, width)| NormalizationBounds::new(low, low + width))
}

// =============================================================================
// Year-over-year change
// =============================================================================

proptest! {
    #[test]
    fn yoy_is_unavailable_below_thirteen_points(seq in arb_sequence(0..13)) {
        prop_assert_eq!(year_over_year_change(&seq), None);
    }

    #[test]
    fn yoy_is_unavailable_on_zero_base(mut seq in arb_sequence(13..40), last in 1.0f64..1.0e6) {
        let base = seq.len() - 13;
        seq[base].value = Some(0.0);
        let end = seq.len() - 1;
        seq[end].value = Some(last);
        prop_assert_eq!(year_over_year_change(&seq), None);
    }

    #[test]
    fn yoy_matches_endpoints(seq in arb_sequence(13..40)) {
        let last = seq[seq.len() - 1].value;
        let base = seq[seq.len() - 13].value;
        match (last, base) {
            (Some(l), Some(b)) if b != 0.0 => {
                let yoy = year_over_year_change(&seq);
                prop_assert!(yoy.is_some());
                let expected = (l - b) / b * 100.0;
                prop_assert!((yoy.unwrap() - expected).abs() <= expected.abs() * 1e-12);
            }
            _ => prop_assert_eq!(year_over_year_change(&seq), None),
        }
    }
}

// =============================================================================
// Latest value and trailing windows
// =============================================================================

proptest! {
    #[test]
    fn latest_valid_value_skips_missing_tail(
        head in arb_sequence(0..20),
        value in -1.0e6f64..1.0e6,
        missing in 0usize..10,
    ) {
        let mut seq = head;
        seq.push(Observation::new("2100-01-01", Some(value)));
        for i in 0..missing {
            seq.push(Observation::new(format!("2100-02-{:02}", i + 1), None));
        }
        prop_assert_eq!(latest_valid_value(&seq), Some(value));
    }

    #[test]
    fn trailing_window_keeps_last_valid_values(seq in arb_sequence(0..40), n in 0usize..20) {
        let window = trailing_window(Some(seq.as_slice()), n).unwrap();
        let valid: Vec<f64> = seq.iter().filter_map(|o| o.value).collect();
        prop_assert!(window.len() <= n);
        prop_assert_eq!(window.as_slice(), &valid[valid.len() - window.len()..]);
        prop_assert_eq!(window.len(), n.min(valid.len()));
    }

    #[test]
    fn prepare_orders_and_dedups(seq in arb_sequence(0..30)) {
        let mut shuffled = seq.clone();
        shuffled.reverse();
        shuffled.extend(seq.iter().cloned());
        let prepared = prepare(shuffled);
        prop_assert_eq!(prepared, seq);
    }
}

#[test]
fn trailing_window_of_absent_series_is_unavailable() {
    assert_eq!(trailing_window(None, 5), None);
}

// =============================================================================
// Normalization
// =============================================================================

proptest! {
    #[test]
    fn normalize_is_bounded(v in -1.0e9f64..1.0e9, bounds in arb_bounds()) {
        let n = normalize(Some(v), bounds);
        prop_assert!((0.0..=1.0).contains(&n));
    }

    #[test]
    fn normalize_is_monotonic(
        a in -1.0e3f64..1.0e3,
        b in -1.0e3f64..1.0e3,
        bounds in arb_bounds()
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(normalize(Some(lo), bounds) <= normalize(Some(hi), bounds));
    }

    #[test]
    fn normalize_missing_is_midpoint(bounds in arb_bounds()) {
        prop_assert_eq!(normalize(None, bounds), 0.5);
    }
}
