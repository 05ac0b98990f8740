//! Market data models
//!
//! This module contains the core data types for fetch operations:
//! - `series` - Series identity (SeriesId) and request descriptors (FetchRequest)
//! - `observation` - Timestamped series values (Observation)
//! - `spot` - Crypto spot price snapshot (SpotPrice)
//! - `payload` - Validated fetch results (FetchPayload)

mod observation;
mod payload;
mod series;
mod spot;

pub use observation::{parse_value, Observation};
pub use payload::FetchPayload;
pub use series::{FetchRequest, SeriesId, SeriesRequest};
pub use spot::SpotPrice;
