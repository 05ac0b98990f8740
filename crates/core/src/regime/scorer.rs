//! Regime scoring.
//!
//! Pure functions: the same series store always yields the same metrics,
//! and missing inputs degrade to neutral values instead of errors.

use std::collections::BTreeMap;

use tidewatch_market_data::{Observation, SeriesId, SpotPrice};

use super::model::{outlook, Current, DerivedMetrics, Reading, Regime, Scores};
use crate::config::{EngineConfig, NormalizationBounds, ScoringConfig, SeriesRole};
use crate::observations::{
    change_over, latest_valid_value, momentum, trailing_window, year_over_year_change,
};

/// Points used for the short-horizon liquidity helpers.
const SHORT_HORIZON: usize = 3;

/// Map `value` onto `[0, 1]` within `bounds`; a missing value is the midpoint.
pub fn normalize(value: Option<f64>, bounds: NormalizationBounds) -> f64 {
    let Some(v) = value else {
        return 0.5;
    };
    let range = bounds.high - bounds.low;
    if !v.is_finite() || !range.is_finite() || range <= 0.0 {
        return 0.5;
    }
    ((v - bounds.low) / range).clamp(0.0, 1.0)
}

/// Difference of two rates, or `0` when either is missing.
pub fn spread(minuend: Option<f64>, subtrahend: Option<f64>) -> f64 {
    match (minuend, subtrahend) {
        (Some(a), Some(b)) => a - b,
        _ => 0.0,
    }
}

/// Scoring inputs, all in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreInputs {
    pub liquidity_yoy: Option<f64>,
    pub real_rate: f64,
    pub real_growth: f64,
    pub policy_gap: f64,
    pub productivity_yoy: Option<f64>,
}

pub fn score(inputs: &ScoreInputs, bounds: &ScoringConfig) -> Scores {
    let tides = 0.6 * normalize(inputs.liquidity_yoy, bounds.liquidity_yoy)
        + 0.4 * normalize(Some(-inputs.real_rate), bounds.real_rate);
    let waves = 0.5 * normalize(Some(inputs.real_growth), bounds.real_growth)
        + 0.5 * normalize(Some(-inputs.policy_gap), bounds.policy_gap);
    let seafloor = normalize(inputs.productivity_yoy, bounds.productivity_yoy);
    let composite = 0.5 * tides + 0.35 * waves + 0.15 * seafloor;

    Scores {
        tides,
        waves,
        seafloor,
        composite: round_hundredths(composite),
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Derive the full metric set from a series store and spot price.
pub fn compute_metrics(
    series: &BTreeMap<SeriesId, Vec<Observation>>,
    spot: Option<&SpotPrice>,
    config: &EngineConfig,
) -> DerivedMetrics {
    let observations = |role: SeriesRole| {
        config
            .series_for(role)
            .and_then(|id| series.get(id))
            .map(Vec::as_slice)
    };
    let yoy = |role| observations(role).and_then(year_over_year_change);
    let level = |role| observations(role).and_then(latest_valid_value);

    let liquidity_yoy = yoy(SeriesRole::Liquidity);
    let output_yoy = yoy(SeriesRole::RealOutput);
    let inflation_yoy = yoy(SeriesRole::PriceLevel);
    let productivity_yoy = yoy(SeriesRole::Productivity);
    let long_rate = level(SeriesRole::LongRate);
    let policy_rate = level(SeriesRole::PolicyRate);

    let inputs = ScoreInputs {
        liquidity_yoy,
        real_rate: spread(long_rate, inflation_yoy),
        real_growth: spread(output_yoy, inflation_yoy),
        policy_gap: spread(policy_rate, inflation_yoy),
        productivity_yoy,
    };
    let scores = score(&inputs, &config.scoring);
    let regime = Regime::classify(scores.composite);
    let current = Current::classify(scores.tides, scores.waves);

    let liquidity = observations(SeriesRole::Liquidity);
    let trends = series
        .iter()
        .filter_map(|(id, seq)| {
            trailing_window(Some(seq.as_slice()), config.trend_window).map(|w| (id.clone(), w))
        })
        .collect();

    DerivedMetrics {
        liquidity_yoy: Reading::new(liquidity_yoy),
        output_yoy: Reading::new(output_yoy),
        inflation_yoy: Reading::new(inflation_yoy),
        productivity_yoy: Reading::new(productivity_yoy),
        long_rate,
        policy_rate,
        real_rate: inputs.real_rate,
        policy_gap: inputs.policy_gap,
        real_growth: inputs.real_growth,
        scores,
        regime,
        current,
        outlook: outlook(regime, current),
        liquidity_change_3m: liquidity.and_then(|seq| change_over(seq, SHORT_HORIZON)),
        liquidity_momentum: liquidity.and_then(|seq| momentum(seq, SHORT_HORIZON)),
        spot_price: spot.map(|s| s.price),
        trends,
    }
}
