//! Last-known-good cache of fetched data.
//!
//! The cache is written only with payloads that passed fetch validation and
//! read only as a fallback when a fetch fails. Reads never fail: a missing,
//! unreadable or corrupt entry is logged and treated as absent.

mod store;

pub use store::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore};

use std::sync::Arc;

use log::{debug, warn};
use tidewatch_market_data::{Observation, SeriesId, SpotPrice};

use crate::errors::{CacheError, Result};

/// Key prefix for series entries.
const SERIES_KEY_PREFIX: &str = "tidewatch:series:";

/// Reserved key of the spot-price slot.
const SPOT_PRICE_KEY: &str = "tidewatch:spot-price";

/// Per-series cache over a [`KeyValueStore`].
#[derive(Clone)]
pub struct CacheStore {
    store: Arc<dyn KeyValueStore>,
}

impl CacheStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Cache backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryKeyValueStore::new()))
    }

    fn series_key(id: &SeriesId) -> String {
        format!("{}{}", SERIES_KEY_PREFIX, id)
    }

    /// Persist the observations of a series, replacing the previous entry.
    pub fn save(&self, id: &SeriesId, observations: &[Observation]) -> Result<()> {
        let value = serde_json::to_string(observations).map_err(CacheError::from)?;
        self.store.set(&Self::series_key(id), &value)?;
        debug!("Cached {} observations for {}", observations.len(), id);
        Ok(())
    }

    /// Last saved observations of a series, or an empty sequence.
    pub fn load(&self, id: &SeriesId) -> Vec<Observation> {
        self.read(&Self::series_key(id)).unwrap_or_default()
    }

    /// Persist the spot-price snapshot.
    pub fn save_spot_price(&self, spot: &SpotPrice) -> Result<()> {
        let value = serde_json::to_string(spot).map_err(CacheError::from)?;
        self.store.set(SPOT_PRICE_KEY, &value)
    }

    /// Last saved spot-price snapshot, if any.
    pub fn load_spot_price(&self) -> Option<SpotPrice> {
        self.read(SPOT_PRICE_KEY)
    }

    fn read<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Cache read failed for '{}': {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring corrupt cache entry '{}': {}", key, e);
                None
            }
        }
    }
}
