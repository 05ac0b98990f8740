//! Periodic refresh loop.

use std::time::Duration;

use tidewatch_core::AcquisitionCoordinator;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Starts the periodic refresh loop. The first cycle runs immediately.
pub fn start_refresh_scheduler(
    coordinator: AcquisitionCoordinator,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Refresh scheduler started ({:?} interval)", period);

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            run_refresh(&coordinator).await;
        }
    })
}

/// Runs a single acquisition cycle and reports the outcome.
async fn run_refresh(coordinator: &AcquisitionCoordinator) {
    let summary = coordinator.refresh().await;
    if summary.superseded {
        debug!("Refresh {} was superseded", summary.generation);
        return;
    }

    let health = coordinator.feed_health();
    let metrics = coordinator.metrics();
    info!(
        "Feed health {} | regime {} | composite {:.2} | current {}",
        health, metrics.regime, metrics.scores.composite, metrics.current
    );
    info!("{}", metrics.outlook);

    let snapshot = coordinator.snapshot();
    for (id, error) in &snapshot.errors {
        warn!("{}: {}", id, error);
    }

    match serde_json::to_string(&metrics) {
        Ok(json) => debug!("Derived metrics: {}", json),
        Err(e) => warn!("Failed to serialize metrics: {}", e),
    }
}
