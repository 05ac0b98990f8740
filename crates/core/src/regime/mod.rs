//! Liquidity regime scoring.
//!
//! Three sub-scores, each normalized to `[0, 1]`:
//!
//! - **tides**: liquidity growth and (inverted) real rates
//! - **waves**: real growth and (inverted) policy gap
//! - **seafloor**: productivity growth
//!
//! They are weighted into a composite, which maps to a [`Regime`]; the
//! tides/waves pair maps to a [`Current`] quadrant.

mod model;
mod scorer;

pub use model::{
    outlook, Current, DerivedMetrics, Reading, Regime, Scores, NEUTRAL_THRESHOLD,
    QUADRANT_THRESHOLD, RISK_ON_THRESHOLD,
};
pub use scorer::{compute_metrics, normalize, score, spread, ScoreInputs};
