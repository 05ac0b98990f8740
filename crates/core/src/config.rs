//! Engine configuration.
//!
//! One [`EngineConfig`] is built per client session and handed to the
//! acquisition coordinator at construction. It fixes the tracked series,
//! the retry policy and the scoring calibration; none of it changes at
//! runtime.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tidewatch_market_data::{SeriesId, SeriesRequest};

use crate::errors::{Error, Result};

/// Delay between a cycle (or retry round) and the next retry round.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Number of retry rounds a failing series gets per acquisition cycle.
pub const DEFAULT_RETRY_CEILING: u32 = 3;

/// Number of valid points kept in each presentation trend window.
pub const DEFAULT_TREND_WINDOW: usize = 12;

/// First observation date requested from FRED.
pub const DEFAULT_OBSERVATION_START: &str = "2010-01-01";

/// What a series contributes to the regime score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeriesRole {
    /// Money supply; scored on its YoY growth.
    Liquidity,
    /// Real output; scored on its YoY growth.
    RealOutput,
    /// Price level; its YoY growth is the inflation rate.
    PriceLevel,
    /// Long-term yield level.
    LongRate,
    /// Policy rate level.
    PolicyRate,
    /// Labor productivity; scored on its YoY growth.
    Productivity,
}

/// One tracked series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub id: SeriesId,
    /// Scoring role, or `None` for series that are tracked but not scored.
    pub role: Option<SeriesRole>,
    /// Extra query parameters sent with every request.
    pub params: Vec<(String, String)>,
}

impl SeriesSpec {
    pub fn new(id: impl Into<SeriesId>, role: Option<SeriesRole>) -> Self {
        Self {
            id: id.into(),
            role,
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Request descriptor for the fetcher.
    pub fn request(&self) -> SeriesRequest {
        SeriesRequest {
            id: self.id.clone(),
            params: self.params.clone(),
        }
    }
}

/// Input range mapped onto `[0, 1]` by normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationBounds {
    pub low: f64,
    pub high: f64,
}

impl NormalizationBounds {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    fn is_valid(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.high > self.low
    }
}

/// Normalization bounds for every scored input, in percent.
///
/// `real_rate` and `policy_gap` bound the *negated* spreads, since lower
/// real rates and looser policy are the supportive direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    pub liquidity_yoy: NormalizationBounds,
    pub real_rate: NormalizationBounds,
    pub real_growth: NormalizationBounds,
    pub policy_gap: NormalizationBounds,
    pub productivity_yoy: NormalizationBounds,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            liquidity_yoy: NormalizationBounds::new(-5.0, 10.0),
            real_rate: NormalizationBounds::new(-3.0, 3.0),
            real_growth: NormalizationBounds::new(-5.0, 5.0),
            policy_gap: NormalizationBounds::new(-5.0, 5.0),
            productivity_yoy: NormalizationBounds::new(-2.0, 4.0),
        }
    }
}

impl ScoringConfig {
    fn validate(&self) -> Result<()> {
        let named = [
            ("liquidity_yoy", self.liquidity_yoy),
            ("real_rate", self.real_rate),
            ("real_growth", self.real_growth),
            ("policy_gap", self.policy_gap),
            ("productivity_yoy", self.productivity_yoy),
        ];
        for (name, bounds) in named {
            if !bounds.is_valid() {
                return Err(Error::InvalidConfigValue(format!(
                    "normalization bounds for {} must satisfy low < high (got {} .. {})",
                    name, bounds.low, bounds.high
                )));
            }
        }
        Ok(())
    }
}

/// Static configuration of one engine session.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tracked series, excluding the spot price which is always tracked.
    pub series: Vec<SeriesSpec>,
    pub retry_delay: Duration,
    pub retry_ceiling: u32,
    pub scoring: ScoringConfig,
    pub trend_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let spec = |id: &'static str, role| {
            SeriesSpec::new(id, Some(role))
                .with_param("observation_start", DEFAULT_OBSERVATION_START)
        };

        Self {
            series: vec![
                spec("M2SL", SeriesRole::Liquidity),
                spec("GDPC1", SeriesRole::RealOutput),
                spec("CPIAUCSL", SeriesRole::PriceLevel),
                spec("DGS10", SeriesRole::LongRate),
                spec("FEDFUNDS", SeriesRole::PolicyRate),
                spec("OPHNFB", SeriesRole::Productivity),
            ],
            retry_delay: DEFAULT_RETRY_DELAY,
            retry_ceiling: DEFAULT_RETRY_CEILING,
            scoring: ScoringConfig::default(),
            trend_window: DEFAULT_TREND_WINDOW,
        }
    }
}

impl EngineConfig {
    /// Check the configuration before an engine is built from it.
    pub fn validate(&self) -> Result<()> {
        if self.series.is_empty() {
            return Err(Error::InvalidConfigValue(
                "at least one series must be tracked".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for spec in &self.series {
            if spec.id.is_spot_price() {
                return Err(Error::InvalidConfigValue(format!(
                    "series id '{}' is reserved for the spot price",
                    spec.id
                )));
            }
            if !seen.insert(&spec.id) {
                return Err(Error::InvalidConfigValue(format!(
                    "series id '{}' is configured twice",
                    spec.id
                )));
            }
        }

        self.scoring.validate()
    }

    /// Id of the series playing `role`, if one is configured.
    pub fn series_for(&self, role: SeriesRole) -> Option<&SeriesId> {
        self.series
            .iter()
            .find(|s| s.role == Some(role))
            .map(|s| &s.id)
    }

    /// Every status key: configured series plus the spot-price pseudo-series.
    pub fn tracked_ids(&self) -> Vec<SeriesId> {
        self.series
            .iter()
            .map(|s| s.id.clone())
            .chain(std::iter::once(SeriesId::SPOT_PRICE))
            .collect()
    }
}
