//! CoinGecko spot-price provider.
//!
//! Reads the BTC/USD price from the `coins/bitcoin` endpoint at
//! `market_data.current_price.usd`. The endpoint may be reached through a
//! pass-through proxy that relays the body unchanged.

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;

use super::response::{parse_body, send};
use crate::config::MarketDataConfig;
use crate::errors::MarketDataError;
use crate::models::SpotPrice;
use crate::provider::SpotPriceProvider;

/// Provider ID constant
const PROVIDER_ID: &str = "COINGECKO";

/// Field path of the USD price, for error reporting.
const PRICE_FIELD: &str = "market_data.current_price.usd";

/// JSON pointer of the USD price.
const PRICE_POINTER: &str = "/market_data/current_price/usd";

/// CoinGecko spot-price provider.
pub struct CoinGeckoProvider {
    client: Client,
    url: String,
}

impl CoinGeckoProvider {
    pub fn new(config: &MarketDataConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            url: config.spot_url.clone(),
        }
    }

    /// Extract the USD price from a successful response body.
    fn decode(body: &str) -> Result<Decimal, MarketDataError> {
        let json = parse_body(PROVIDER_ID, body)?;

        let missing = || MarketDataError::MissingField {
            provider: PROVIDER_ID.to_string(),
            field: PRICE_FIELD,
        };

        let price = json
            .pointer(PRICE_POINTER)
            .and_then(Value::as_f64)
            .ok_or_else(missing)?;

        Decimal::try_from(price).map_err(|_| missing())
    }
}

#[async_trait]
impl SpotPriceProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_spot_price(&self) -> Result<SpotPrice, MarketDataError> {
        let body = send(PROVIDER_ID, self.client.get(&self.url)).await?;
        let price = Self::decode(&body)?;

        debug!("CoinGecko spot price: {}", price);
        Ok(SpotPrice::new(price, Utc::now()))
    }
}
