//! Resilient fetcher.
//!
//! Wraps one logical request (a series or the spot price) and returns a
//! uniform result: a validated [`FetchPayload`] or a classified
//! [`MarketDataError`]. Nothing here panics or touches cache/status state.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use crate::config::MarketDataConfig;
use crate::errors::MarketDataError;
use crate::models::{FetchPayload, FetchRequest};
use crate::provider::coingecko::CoinGeckoProvider;
use crate::provider::fred::FredProvider;
use crate::provider::{SeriesProvider, SpotPriceProvider};

/// Single-request fetch boundary used by the acquisition layer.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform one round trip for `request`.
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchPayload, MarketDataError>;
}

/// Default [`Fetcher`]: routes series requests to a series provider and the
/// spot-price request to a spot-price provider.
pub struct ResilientFetcher {
    series: Arc<dyn SeriesProvider>,
    spot: Arc<dyn SpotPriceProvider>,
}

impl ResilientFetcher {
    pub fn new(series: Arc<dyn SeriesProvider>, spot: Arc<dyn SpotPriceProvider>) -> Self {
        Self { series, spot }
    }

    /// FRED for series, CoinGecko for the spot price.
    pub fn from_config(config: &MarketDataConfig) -> Self {
        Self::new(
            Arc::new(FredProvider::new(config)),
            Arc::new(CoinGeckoProvider::new(config)),
        )
    }
}

#[async_trait]
impl Fetcher for ResilientFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchPayload, MarketDataError> {
        let result = match request {
            FetchRequest::Series(series) => self
                .series
                .fetch_observations(series)
                .await
                .map(FetchPayload::Observations),
            FetchRequest::SpotPrice => self
                .spot
                .fetch_spot_price()
                .await
                .map(FetchPayload::SpotPrice),
        };

        match &result {
            Ok(_) => debug!("Fetched {}", request.series_id()),
            Err(e) => warn!(
                "Fetch failed for {} ({}): {}",
                request.series_id(),
                e.kind(),
                e
            ),
        }

        result
    }
}
