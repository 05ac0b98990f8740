//! Upstream provider abstractions and implementations.
//!
//! This module contains:
//! - The `SeriesProvider` and `SpotPriceProvider` traits
//! - Shared response validation (markup detection, JSON parsing)
//! - Concrete providers: FRED for macro series, CoinGecko for the spot price

mod response;
mod traits;

pub mod coingecko;
pub mod fred;

// Re-exports
pub use response::looks_like_markup;
pub use traits::{SeriesProvider, SpotPriceProvider};
