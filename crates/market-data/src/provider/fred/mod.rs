//! FRED (Federal Reserve Economic Data) series provider.
//!
//! Fetches observations from the `series/observations` endpoint, either
//! directly or through a pass-through proxy that forwards the same query
//! parameters. API documentation:
//! https://fred.stlouisfed.org/docs/api/fred/series_observations.html

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::response::{parse_body, send};
use crate::config::MarketDataConfig;
use crate::errors::MarketDataError;
use crate::models::{parse_value, Observation, SeriesRequest};
use crate::provider::SeriesProvider;

/// Provider ID constant
const PROVIDER_ID: &str = "FRED";

/// Observations response. Only the fields we use are declared.
#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Option<Vec<RawObservation>>,
    /// Present on FRED error payloads (often served with a 200 by proxies)
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    #[serde(alias = "timestamp")]
    date: String,
    #[serde(default)]
    value: Value,
}

impl RawObservation {
    fn into_observation(self) -> Observation {
        let value = match &self.value {
            Value::String(s) => parse_value(s),
            Value::Number(n) => n.as_f64(),
            _ => None,
        };
        Observation::new(self.date, value)
    }
}

/// FRED series provider.
///
/// # Example
///
/// ```ignore
/// use tidewatch_market_data::{FredProvider, MarketDataConfig};
///
/// let provider = FredProvider::new(&MarketDataConfig::default());
/// ```
pub struct FredProvider {
    client: Client,
    url: String,
    api_key: String,
}

impl FredProvider {
    pub fn new(config: &MarketDataConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            url: config.fred_url.clone(),
            api_key: config.fred_api_key.clone(),
        }
    }

    /// Extract observations from a successful response body.
    fn decode(body: &str) -> Result<Vec<Observation>, MarketDataError> {
        let json = parse_body(PROVIDER_ID, body)?;

        let response: ObservationsResponse =
            serde_json::from_value(json).map_err(|e| MarketDataError::Parse {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })?;

        match response.observations {
            Some(raw) => Ok(raw.into_iter().map(RawObservation::into_observation).collect()),
            None => {
                if let Some(message) = response.error_message {
                    warn!("FRED returned an error payload: {}", message);
                }
                Err(MarketDataError::MissingField {
                    provider: PROVIDER_ID.to_string(),
                    field: "observations",
                })
            }
        }
    }
}

#[async_trait]
impl SeriesProvider for FredProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_observations(
        &self,
        request: &SeriesRequest,
    ) -> Result<Vec<Observation>, MarketDataError> {
        debug!(
            "FRED request: {} with {} extra params",
            request.id,
            request.params.len()
        );

        let http = self
            .client
            .get(&self.url)
            .query(&[
                ("series_id", request.id.as_str()),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
            ])
            .query(&request.params);

        let body = send(PROVIDER_ID, http).await?;
        let observations = Self::decode(&body)?;

        debug!(
            "FRED {}: {} observations",
            request.id,
            observations.len()
        );
        Ok(observations)
    }
}
