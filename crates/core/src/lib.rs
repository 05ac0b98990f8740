//! Tidewatch Core - acquisition, cache reconciliation and regime scoring.
//!
//! ```text
//! AcquisitionCoordinator ──fetch──▶ Fetcher (tidewatch-market-data)
//!        │  ▲
//!   save │  │ load on failure
//!        ▼  │
//!      CacheStore ──▶ KeyValueStore (memory / files)
//!        │
//!        ├──▶ snapshot()    series store + status map
//!        ├──▶ metrics()     regime::compute_metrics
//!        └──▶ feed_health() health::FeedHealth
//! ```
//!
//! The coordinator is the only writer of acquisition state. Everything
//! downstream works on snapshots and is pure.

pub mod acquisition;
pub mod cache;
pub mod config;
pub mod errors;
pub mod health;
pub mod observations;
pub mod regime;

pub use acquisition::{AcquisitionCoordinator, AcquisitionSnapshot, CycleSummary, FetchStatus};
pub use cache::{CacheStore, FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore};
pub use config::{EngineConfig, NormalizationBounds, ScoringConfig, SeriesRole, SeriesSpec};
pub use health::FeedHealth;
pub use regime::{DerivedMetrics, Regime};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
