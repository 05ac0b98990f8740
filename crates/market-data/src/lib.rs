//! Tidewatch Market Data Crate
//!
//! This crate fetches the raw inputs of the liquidity regime engine:
//! macroeconomic series from FRED and the BTC/USD spot price from CoinGecko.
//!
//! # Overview
//!
//! ```text
//! +------------------+     +------------------+
//! |  FetchRequest    | --> | ResilientFetcher |
//! +------------------+     +------------------+
//!                              |          |
//!                              v          v
//!                    +--------------+  +------------------+
//!                    | FredProvider |  | CoinGeckoProvider|
//!                    +--------------+  +------------------+
//!                              |          |
//!                              v          v
//!                  Result<FetchPayload, MarketDataError>
//! ```
//!
//! Every response is validated in the same order: transport failure, HTTP
//! status, markup body (an intermediary's error page), malformed JSON, and
//! finally the expected field. Each failure is classified by [`FailureKind`].
//!
//! # Core Types
//!
//! - [`SeriesId`] - Stable key of a tracked series (plus the spot-price pseudo-series)
//! - [`Observation`] - One timestamped value, `None` when missing upstream
//! - [`SpotPrice`] - USD price with its capture time
//! - [`Fetcher`] - The single-request boundary used by the acquisition layer

pub mod config;
pub mod errors;
pub mod fetcher;
pub mod models;
pub mod provider;

pub use config::MarketDataConfig;
pub use errors::{FailureKind, MarketDataError};
pub use fetcher::{Fetcher, ResilientFetcher};
pub use models::{
    parse_value, FetchPayload, FetchRequest, Observation, SeriesId, SeriesRequest, SpotPrice,
};
pub use provider::coingecko::CoinGeckoProvider;
pub use provider::fred::FredProvider;
pub use provider::{SeriesProvider, SpotPriceProvider};
