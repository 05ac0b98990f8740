mod config;
mod main_lib;
mod scheduler;

use config::Config;
use main_lib::{build_coordinator, init_tracing};
use scheduler::start_refresh_scheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();
    let coordinator = build_coordinator(&config)?;
    let scheduler = start_refresh_scheduler(coordinator, config.refresh_interval);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    scheduler.abort();
    Ok(())
}
