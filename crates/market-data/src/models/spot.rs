use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A crypto spot price and the moment it was captured.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotPrice {
    /// Price in USD
    pub price: Decimal,

    /// When the price was fetched
    pub captured_at: DateTime<Utc>,
}

impl SpotPrice {
    pub fn new(price: Decimal, captured_at: DateTime<Utc>) -> Self {
        Self { price, captured_at }
    }
}
