//! Endpoint and client configuration for the upstream providers.

use std::time::Duration;

/// Public FRED observations endpoint.
pub const DEFAULT_FRED_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// Public CoinGecko bitcoin endpoint, trimmed to the market data section.
pub const DEFAULT_SPOT_URL: &str = "https://api.coingecko.com/api/v3/coins/bitcoin?localization=false&tickers=false&market_data=true&community_data=false&developer_data=false&sparkline=false";

/// Default HTTP request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how the fetchers reach the upstream data.
///
/// Both URLs may point at a pass-through proxy instead of the public
/// endpoints; the proxy is expected to forward query parameters unchanged.
#[derive(Clone, Debug)]
pub struct MarketDataConfig {
    /// FRED `series/observations` endpoint (or its proxy).
    pub fred_url: String,

    /// FRED API key, sent as the `api_key` query parameter.
    pub fred_api_key: String,

    /// Spot-price endpoint (or its proxy).
    pub spot_url: String,

    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            fred_url: DEFAULT_FRED_URL.to_string(),
            fred_api_key: String::new(),
            spot_url: DEFAULT_SPOT_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
