//! Daemon configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tidewatch_core::EngineConfig;
use tidewatch_market_data::MarketDataConfig;

const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 15 * 60;

pub struct Config {
    pub market_data: MarketDataConfig,
    pub engine: EngineConfig,
    pub cache_dir: PathBuf,
    pub refresh_interval: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut market_data = MarketDataConfig::default();
        if let Some(url) = var("TW_FRED_URL") {
            market_data.fred_url = url;
        }
        if let Some(url) = var("TW_SPOT_URL") {
            market_data.spot_url = url;
        }
        market_data.fred_api_key = var("TW_FRED_API_KEY").unwrap_or_default();
        if let Some(ms) = parse::<u64>(&var, "TW_REQUEST_TIMEOUT_MS")? {
            market_data.request_timeout = Duration::from_millis(ms);
        }

        let mut engine = EngineConfig::default();
        if let Some(secs) = parse::<u64>(&var, "TW_RETRY_DELAY_SECS")? {
            engine.retry_delay = Duration::from_secs(secs);
        }
        if let Some(ceiling) = parse::<u32>(&var, "TW_RETRY_CEILING")? {
            engine.retry_ceiling = ceiling;
        }
        engine.validate()?;

        let cache_dir = var("TW_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./cache"));
        let refresh_secs = parse::<u64>(&var, "TW_REFRESH_INTERVAL_SECS")?
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS);
        if refresh_secs == 0 {
            anyhow::bail!("TW_REFRESH_INTERVAL_SECS must be positive");
        }

        Ok(Self {
            market_data,
            engine,
            cache_dir,
            refresh_interval: Duration::from_secs(refresh_secs),
        })
    }
}

fn parse<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid {}: '{}'", key, raw))
        })
        .transpose()
}
