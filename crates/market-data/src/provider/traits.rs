//! Provider trait definitions.
//!
//! A provider performs exactly one round trip per call and returns either a
//! validated payload or a classified [`MarketDataError`]. Providers never
//! touch cache or status state.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{Observation, SeriesRequest, SpotPrice};

/// Source of series observations.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tidewatch_market_data::provider::SeriesProvider;
///
/// struct CsvProvider;
///
/// #[async_trait]
/// impl SeriesProvider for CsvProvider {
///     fn id(&self) -> &'static str {
///         "CSV"
///     }
///
///     async fn fetch_observations(
///         &self,
///         request: &SeriesRequest,
///     ) -> Result<Vec<Observation>, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Unique identifier for this provider, used in errors and logs.
    fn id(&self) -> &'static str;

    /// Fetch the observations of one series.
    ///
    /// A successfully parsed but empty observation list is `Ok(vec![])`,
    /// not an error.
    async fn fetch_observations(
        &self,
        request: &SeriesRequest,
    ) -> Result<Vec<Observation>, MarketDataError>;
}

/// Source of the crypto spot price.
#[async_trait]
pub trait SpotPriceProvider: Send + Sync {
    /// Unique identifier for this provider, used in errors and logs.
    fn id(&self) -> &'static str;

    /// Fetch the current USD spot price.
    async fn fetch_spot_price(&self) -> Result<SpotPrice, MarketDataError>;
}
