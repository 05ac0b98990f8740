use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Stable key identifying one tracked series.
///
/// For FRED-backed series this is the FRED series code (e.g. `M2SL`).
/// One reserved id, [`SeriesId::SPOT_PRICE`], names the crypto spot-price
/// pseudo-series so it can share status and retry bookkeeping with the
/// macro series.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(Cow<'static, str>);

impl SeriesId {
    /// Reserved id for the BTC/USD spot price.
    pub const SPOT_PRICE: SeriesId = SeriesId(Cow::Borrowed("BTC-USD"));

    /// Create an id from a static string.
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// Create an id from a runtime string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the reserved spot-price pseudo-series.
    pub fn is_spot_price(&self) -> bool {
        self.0 == Self::SPOT_PRICE.0
    }
}

impl std::fmt::Display for SeriesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for SeriesId {
    fn from(id: &'static str) -> Self {
        Self::from_static(id)
    }
}

/// Parameters for one series request.
///
/// `params` are forwarded as extra query parameters (e.g.
/// `observation_start=2010-01-01`, `frequency=m`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeriesRequest {
    pub id: SeriesId,
    pub params: Vec<(String, String)>,
}

impl SeriesRequest {
    pub fn new(id: SeriesId) -> Self {
        Self {
            id,
            params: Vec::new(),
        }
    }

    /// Add a query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

/// One logical data request handled by a fetcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchRequest {
    /// Observations of a single series.
    Series(SeriesRequest),
    /// The crypto spot price.
    SpotPrice,
}

impl FetchRequest {
    /// The status key this request reports under.
    pub fn series_id(&self) -> SeriesId {
        match self {
            FetchRequest::Series(request) => request.id.clone(),
            FetchRequest::SpotPrice => SeriesId::SPOT_PRICE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_price_id_is_reserved() {
        assert!(SeriesId::SPOT_PRICE.is_spot_price());
        assert!(SeriesId::new("BTC-USD").is_spot_price());
        assert!(!SeriesId::from_static("M2SL").is_spot_price());
    }

    #[test]
    fn test_owned_and_borrowed_ids_compare_equal() {
        assert_eq!(SeriesId::new("GDPC1"), SeriesId::from_static("GDPC1"));
    }

    #[test]
    fn test_request_series_id() {
        let request = FetchRequest::Series(
            SeriesRequest::new("M2SL".into()).with_param("observation_start", "2010-01-01"),
        );
        assert_eq!(request.series_id(), SeriesId::from_static("M2SL"));
        assert_eq!(FetchRequest::SpotPrice.series_id(), SeriesId::SPOT_PRICE);
    }

    #[test]
    fn test_series_id_serializes_as_string() {
        let json = serde_json::to_string(&SeriesId::from_static("DGS10")).unwrap();
        assert_eq!(json, "\"DGS10\"");
    }
}
