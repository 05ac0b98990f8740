//! Acquisition: concurrent fetch, cache reconciliation and bounded retries.

mod coordinator;
mod model;

pub use coordinator::AcquisitionCoordinator;
pub use model::{AcquisitionSnapshot, CycleSummary, FetchStatus};
