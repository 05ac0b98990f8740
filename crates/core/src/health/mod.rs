//! Feed health.
//!
//! Reduces the per-series status map to one label describing how fresh
//! the data behind the current metrics is.

use serde::{Deserialize, Serialize};

use crate::acquisition::FetchStatus;

/// Aggregate freshness of all tracked feeds.
///
/// Ordered from best to worst, except `Unknown` which sorts first and
/// means no cycle has completed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeedHealth {
    Unknown,
    /// Every series is fresh.
    Stable,
    /// Some series are cached or missing, but not all are missing.
    Degraded,
    /// Every series failed.
    Outage,
}

impl FeedHealth {
    /// Reduce a set of statuses to a single label.
    pub fn from_statuses<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = &'a FetchStatus>,
    {
        let (mut total, mut ok, mut failed) = (0usize, 0usize, 0usize);
        for status in statuses {
            total += 1;
            match status {
                FetchStatus::Ok => ok += 1,
                FetchStatus::Fail => failed += 1,
                FetchStatus::Cache => {}
            }
        }

        match total {
            0 => FeedHealth::Unknown,
            _ if ok == total => FeedHealth::Stable,
            _ if failed == total => FeedHealth::Outage,
            _ => FeedHealth::Degraded,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedHealth::Unknown => "Unknown",
            FeedHealth::Stable => "Stable",
            FeedHealth::Degraded => "Degraded",
            FeedHealth::Outage => "Outage",
        }
    }
}

impl std::fmt::Display for FeedHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
