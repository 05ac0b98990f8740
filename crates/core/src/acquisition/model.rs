//! Acquisition state as seen by consumers.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tidewatch_market_data::{Observation, SeriesId, SpotPrice};

/// Provenance of a series' current data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetchStatus {
    /// Fresh data from the last fetch.
    #[serde(rename = "OK")]
    Ok,
    /// Last-known-good data from the cache.
    #[serde(rename = "CACHE")]
    Cache,
    /// No fresh data and nothing usable in the cache.
    #[serde(rename = "FAIL")]
    Fail,
}

impl FetchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Ok => "OK",
            FetchStatus::Cache => "CACHE",
            FetchStatus::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Point-in-time copy of everything the coordinator owns.
///
/// `series` holds the macro series only; the spot price lives in
/// `spot_price` but reports its status under [`SeriesId::SPOT_PRICE`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionSnapshot {
    pub series: BTreeMap<SeriesId, Vec<Observation>>,
    pub spot_price: Option<SpotPrice>,
    pub statuses: BTreeMap<SeriesId, FetchStatus>,
    /// Last failure message of every series not currently `OK`.
    pub errors: BTreeMap<SeriesId, String>,
    /// Series that exhausted their retries in the current cycle.
    pub abandoned: BTreeSet<SeriesId>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl AcquisitionSnapshot {
    pub fn status(&self, id: &SeriesId) -> Option<FetchStatus> {
        self.statuses.get(id).copied()
    }

    /// Observations of a series, if it has an entry.
    pub fn observations(&self, id: &SeriesId) -> Option<&[Observation]> {
        self.series.get(id).map(Vec::as_slice)
    }

    pub fn count(&self, status: FetchStatus) -> usize {
        self.statuses.values().filter(|s| **s == status).count()
    }
}

/// Outcome of one full acquisition cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    pub generation: u64,
    pub ok: usize,
    pub cached: usize,
    pub failed: usize,
    /// Whether a retry round is pending after this cycle.
    pub retry_scheduled: bool,
    /// A newer cycle started before this one settled; its results were dropped.
    pub superseded: bool,
}
