use super::{Observation, SpotPrice};

/// Validated payload of a successful fetch.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchPayload {
    /// Observations of a series, possibly empty.
    Observations(Vec<Observation>),
    /// The current spot price.
    SpotPrice(SpotPrice),
}
