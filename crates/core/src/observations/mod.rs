//! Observation parsing and point-in-time analytics.
//!
//! All functions here are pure and total: short, empty or all-missing
//! input yields `None` ("unavailable"), never a panic.
//!
//! Lags are counted in points, not calendar time. The series tracked by
//! default are monthly or quarterly, so gaps in the upstream data shift
//! the comparison point; the short-horizon helpers ([`change_over`],
//! [`momentum`]) share that approximation.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tidewatch_market_data::Observation;

/// Number of periods between the two endpoints of a year-over-year change.
pub const YOY_LAG: usize = 12;

/// Orders observations by timestamp and drops duplicate timestamps.
///
/// The sort is stable, so when a timestamp repeats the observation that
/// came last in the upstream payload is kept.
pub fn prepare(mut observations: Vec<Observation>) -> Vec<Observation> {
    observations.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    let mut prepared: Vec<Observation> = Vec::with_capacity(observations.len());
    for observation in observations {
        match prepared.last_mut() {
            Some(last) if last.timestamp == observation.timestamp => *last = observation,
            _ => prepared.push(observation),
        }
    }
    prepared
}

/// Percentage change between the last point and the point `periods` earlier.
///
/// Unavailable when there are not enough points, either endpoint is missing
/// or the base value is zero.
pub fn change_over(seq: &[Observation], periods: usize) -> Option<f64> {
    if periods == 0 || seq.len() < periods + 1 {
        return None;
    }
    let last = seq[seq.len() - 1].value?;
    let base = seq[seq.len() - 1 - periods].value?;
    if base == 0.0 {
        return None;
    }
    let change = (last - base) / base * 100.0;
    change.is_finite().then_some(change)
}

/// Year-over-year percentage change (12-period lag; needs 13 points).
pub fn year_over_year_change(seq: &[Observation]) -> Option<f64> {
    change_over(seq, YOY_LAG)
}

/// Most recent numerically valid value.
pub fn latest_valid_value(seq: &[Observation]) -> Option<f64> {
    seq.iter().rev().find_map(|o| o.value.filter(|v| v.is_finite()))
}

/// Up to the last `n` valid values, oldest first.
///
/// `None` input stays unavailable; a present series with no valid values
/// yields an empty window.
pub fn trailing_window(seq: Option<&[Observation]>, n: usize) -> Option<Vec<f64>> {
    let seq = seq?;
    let mut window: Vec<f64> = seq
        .iter()
        .rev()
        .filter_map(|o| o.value.filter(|v| v.is_finite()))
        .take(n)
        .collect();
    window.reverse();
    Some(window)
}

/// Change in YoY growth over the last `periods` points (acceleration).
pub fn momentum(seq: &[Observation], periods: usize) -> Option<f64> {
    if periods == 0 || seq.len() <= periods {
        return None;
    }
    let now = year_over_year_change(seq)?;
    let then = year_over_year_change(&seq[..seq.len() - periods])?;
    Some(now - then)
}

/// Sign of a headline value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Up,
    Down,
    Flat,
    Unknown,
}

impl Direction {
    pub fn of(value: Option<f64>) -> Self {
        match value.and_then(|v| v.partial_cmp(&0.0)) {
            Some(Ordering::Greater) => Direction::Up,
            Some(Ordering::Less) => Direction::Down,
            Some(Ordering::Equal) => Direction::Flat,
            None => Direction::Unknown,
        }
    }

    /// Arrow glyph for compact display.
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
            Direction::Flat => "→",
            Direction::Unknown => "",
        }
    }
}
