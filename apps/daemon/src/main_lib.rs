//! Tracing setup and coordinator wiring for the daemon.

use std::sync::Arc;

use tidewatch_core::{AcquisitionCoordinator, CacheStore, FileKeyValueStore};
use tidewatch_market_data::ResilientFetcher;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub fn init_tracing() {
    let log_format = std::env::var("TW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_coordinator(config: &Config) -> anyhow::Result<AcquisitionCoordinator> {
    if config.market_data.fred_api_key.is_empty() {
        tracing::warn!(
            "TW_FRED_API_KEY is not set; FRED requests will fail and fall back to cache"
        );
    }

    let store = FileKeyValueStore::open(&config.cache_dir)?;
    tracing::info!("Cache directory in use: {}", config.cache_dir.display());

    let fetcher = ResilientFetcher::from_config(&config.market_data);
    Ok(AcquisitionCoordinator::new(
        config.engine.clone(),
        Arc::new(fetcher),
        CacheStore::new(Arc::new(store)),
    ))
}
