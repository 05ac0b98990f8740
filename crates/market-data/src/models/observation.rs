use serde::{Deserialize, Serialize};

/// One timestamped value of a series.
///
/// `timestamp` is the upstream date identifier (ISO `YYYY-MM-DD` for FRED),
/// so lexical order is chronological order. A missing or unparseable value
/// is stored as `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: String,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(timestamp: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            timestamp: timestamp.into(),
            value: value.filter(|v| v.is_finite()),
        }
    }
}

/// Parse an upstream value string.
///
/// FRED marks missing values with `"."`; anything that is not a finite
/// number is treated the same way.
pub fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
