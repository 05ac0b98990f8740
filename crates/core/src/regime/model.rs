//! Regime output types.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tidewatch_market_data::SeriesId;

use crate::observations::Direction;

/// Composite score at or above which the regime is risk-on.
pub const RISK_ON_THRESHOLD: f64 = 0.7;

/// Composite score at or above which the regime is neutral.
pub const NEUTRAL_THRESHOLD: f64 = 0.4;

/// Sub-score level the quadrant split is taken at.
pub const QUADRANT_THRESHOLD: f64 = 0.5;

/// Categorical summary of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    #[serde(rename = "Risk-On")]
    RiskOn,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Risk-Off")]
    RiskOff,
}

impl Regime {
    pub fn classify(composite: f64) -> Self {
        if composite >= RISK_ON_THRESHOLD {
            Regime::RiskOn
        } else if composite >= NEUTRAL_THRESHOLD {
            Regime::Neutral
        } else {
            Regime::RiskOff
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::RiskOn => "Risk-On",
            Regime::Neutral => "Neutral",
            Regime::RiskOff => "Risk-Off",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Quadrant of the liquidity (tides) and cycle (waves) sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Current {
    /// Liquidity and cycle both supportive.
    #[serde(rename = "Rising")]
    Rising,
    /// Liquidity supportive, cycle rolling over.
    #[serde(rename = "Rising/Fading")]
    RisingFading,
    /// Cycle recovering while liquidity stays tight.
    #[serde(rename = "Rebound")]
    Rebound,
    /// Neither supportive.
    #[serde(rename = "Ebb")]
    Ebb,
}

impl Current {
    /// A sub-score of exactly the threshold counts as below it.
    pub fn classify(tides: f64, waves: f64) -> Self {
        match (tides > QUADRANT_THRESHOLD, waves > QUADRANT_THRESHOLD) {
            (true, true) => Current::Rising,
            (true, false) => Current::RisingFading,
            (false, true) => Current::Rebound,
            (false, false) => Current::Ebb,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Current::Rising => "Rising",
            Current::RisingFading => "Rising/Fading",
            Current::Rebound => "Rebound",
            Current::Ebb => "Ebb",
        }
    }

    fn narrative(&self) -> &'static str {
        match self {
            Current::Rising => "liquidity is expanding and the cycle is supportive",
            Current::RisingFading => "liquidity is supportive but the cycle is losing momentum",
            Current::Rebound => "the cycle is recovering while liquidity stays tight",
            Current::Ebb => "liquidity is draining and the cycle is weak",
        }
    }
}

impl std::fmt::Display for Current {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One-line outlook combining regime and quadrant.
pub fn outlook(regime: Regime, current: Current) -> String {
    format!("{} ({}): {}.", regime, current, current.narrative())
}

/// A headline rate and its sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: Option<f64>,
    pub direction: Direction,
}

impl Reading {
    pub fn new(value: Option<f64>) -> Self {
        Self {
            value,
            direction: Direction::of(value),
        }
    }
}

/// Normalized sub-scores and their weighted composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    pub tides: f64,
    pub waves: f64,
    pub seafloor: f64,
    /// Weighted sum at two-decimal precision.
    pub composite: f64,
}

/// Everything derived from one snapshot of the series store.
///
/// Never persisted; recomputed from the store on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub liquidity_yoy: Reading,
    pub output_yoy: Reading,
    pub inflation_yoy: Reading,
    pub productivity_yoy: Reading,
    pub long_rate: Option<f64>,
    pub policy_rate: Option<f64>,

    /// Long rate minus inflation; `0` when an operand is missing.
    pub real_rate: f64,
    /// Policy rate minus inflation; `0` when an operand is missing.
    pub policy_gap: f64,
    /// Output growth minus inflation; `0` when an operand is missing.
    pub real_growth: f64,

    pub scores: Scores,
    pub regime: Regime,
    pub current: Current,
    pub outlook: String,

    /// Liquidity change over the last three points.
    pub liquidity_change_3m: Option<f64>,
    /// Liquidity YoY now minus three points earlier.
    pub liquidity_momentum: Option<f64>,

    pub spot_price: Option<Decimal>,

    /// Trailing valid values of every series that has an entry.
    pub trends: BTreeMap<SeriesId, Vec<f64>>,
}
