//! Acquisition coordinator.
//!
//! Owns the series store, the status map and the retry counters. A full
//! cycle fetches every tracked series plus the spot price concurrently,
//! reconciles each result against the cache and, when something is left
//! without data, hands the remaining work to a single background retry task.
//!
//! Every cycle gets a generation number. Starting a cycle aborts the pending
//! retry task and bumps the generation; a round that still fires afterwards
//! sees a stale generation and changes nothing, neither the state nor the
//! cache.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, info, warn};
use tidewatch_market_data::{
    FetchPayload, FetchRequest, Fetcher, MarketDataError, Observation, SeriesId, SpotPrice,
};
use tokio::task::JoinHandle;

use super::model::{AcquisitionSnapshot, CycleSummary, FetchStatus};
use crate::cache::CacheStore;
use crate::config::EngineConfig;
use crate::health::FeedHealth;
use crate::observations::prepare;
use crate::regime::{compute_metrics, DerivedMetrics};

/// Mutable state guarded by the coordinator.
#[derive(Default)]
struct State {
    series: BTreeMap<SeriesId, Vec<Observation>>,
    spot_price: Option<SpotPrice>,
    statuses: BTreeMap<SeriesId, FetchStatus>,
    errors: BTreeMap<SeriesId, String>,
    attempts: HashMap<SeriesId, u32>,
    abandoned: BTreeSet<SeriesId>,
    last_updated: Option<DateTime<Utc>>,
}

impl State {
    fn apply(&mut self, outcomes: Vec<Reconciled>, now: DateTime<Utc>) {
        for outcome in outcomes {
            match outcome.data {
                ReconciledData::Series(observations) => {
                    self.series.insert(outcome.id.clone(), observations);
                }
                ReconciledData::SpotPrice(spot) => self.spot_price = spot,
            }
            match outcome.error {
                Some(message) => self.errors.insert(outcome.id.clone(), message),
                None => self.errors.remove(&outcome.id),
            };
            self.statuses.insert(outcome.id, outcome.status);
        }
        self.last_updated = Some(now);
    }

    fn failed(&self) -> impl Iterator<Item = &SeriesId> {
        self.statuses
            .iter()
            .filter(|(_, status)| **status == FetchStatus::Fail)
            .map(|(id, _)| id)
    }

    fn attempts(&self, id: &SeriesId) -> u32 {
        self.attempts.get(id).copied().unwrap_or(0)
    }

    /// `FAIL` series that still have retries left.
    fn retryable(&self, ceiling: u32) -> Vec<SeriesId> {
        self.failed()
            .filter(|id| self.attempts(id) < ceiling)
            .cloned()
            .collect()
    }

    /// Mark `FAIL` series without retries left as abandoned.
    fn abandon_exhausted(&mut self, ceiling: u32) {
        let exhausted: Vec<SeriesId> = self
            .failed()
            .filter(|id| self.attempts(id) >= ceiling && !self.abandoned.contains(*id))
            .cloned()
            .collect();
        for id in exhausted {
            warn!(
                "Giving up on {} after {} retries; it stays FAIL until the next cycle",
                id,
                self.attempts(&id)
            );
            self.abandoned.insert(id);
        }
    }
}

/// Data half of a reconciled fetch result.
enum ReconciledData {
    Series(Vec<Observation>),
    SpotPrice(Option<SpotPrice>),
}

/// One fetch result merged with the cache, ready to be applied.
///
/// `OK` results carry fresh data that still has to be cached.
struct Reconciled {
    id: SeriesId,
    status: FetchStatus,
    data: ReconciledData,
    error: Option<String>,
}

/// The single outstanding retry task and the cycle it belongs to.
struct ScheduledRetry {
    generation: u64,
    handle: JoinHandle<()>,
}

enum RoundOutcome {
    /// Some series can still be retried.
    Continue,
    /// Nothing left to retry.
    Done,
    /// A newer cycle superseded this round.
    Stale,
}

struct Inner {
    config: EngineConfig,
    fetcher: Arc<dyn Fetcher>,
    cache: CacheStore,
    state: RwLock<State>,
    generation: AtomicU64,
    pending_retry: Mutex<Option<ScheduledRetry>>,
}

/// Drives acquisition cycles and exposes their results.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct AcquisitionCoordinator {
    inner: Arc<Inner>,
}

impl AcquisitionCoordinator {
    pub fn new(config: EngineConfig, fetcher: Arc<dyn Fetcher>, cache: CacheStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                fetcher,
                cache,
                state: RwLock::new(State::default()),
                generation: AtomicU64::new(0),
                pending_retry: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Run a full acquisition cycle.
    ///
    /// Resets every retry counter and supersedes any pending retry round.
    /// Always settles: individual fetch failures end up as statuses.
    pub async fn refresh(&self) -> CycleSummary {
        let inner = &self.inner;
        let generation = inner.begin_cycle();

        let requests: Vec<FetchRequest> = inner
            .config
            .series
            .iter()
            .map(|spec| FetchRequest::Series(spec.request()))
            .chain(std::iter::once(FetchRequest::SpotPrice))
            .collect();
        debug!(
            "Cycle {}: dispatching {} requests",
            generation,
            requests.len()
        );
        let outcomes = inner.dispatch(requests).await;

        let needs_retry = {
            let mut state = inner.write_state();
            if !inner.is_current(generation) {
                debug!("Cycle {} superseded before it settled", generation);
                drop(state);
                return self.summary(generation, false, true);
            }
            inner.persist(&outcomes);
            state.attempts.clear();
            state.abandoned.clear();
            state.apply(outcomes, Utc::now());
            state.abandon_exhausted(inner.config.retry_ceiling);
            !state.retryable(inner.config.retry_ceiling).is_empty()
        };

        let retry_scheduled = needs_retry && Inner::schedule_retry(inner, generation);
        let summary = self.summary(generation, retry_scheduled, false);
        info!(
            "Cycle {} settled: {} OK, {} CACHE, {} FAIL{}",
            generation,
            summary.ok,
            summary.cached,
            summary.failed,
            if retry_scheduled { ", retry scheduled" } else { "" }
        );
        summary
    }

    /// Copy of the series store, spot price and status map.
    pub fn snapshot(&self) -> AcquisitionSnapshot {
        let state = self.inner.read_state();
        AcquisitionSnapshot {
            series: state.series.clone(),
            spot_price: state.spot_price.clone(),
            statuses: state.statuses.clone(),
            errors: state.errors.clone(),
            abandoned: state.abandoned.clone(),
            last_updated: state.last_updated,
        }
    }

    pub fn statuses(&self) -> BTreeMap<SeriesId, FetchStatus> {
        self.inner.read_state().statuses.clone()
    }

    /// Regime metrics over the current series store.
    pub fn metrics(&self) -> DerivedMetrics {
        let state = self.inner.read_state();
        compute_metrics(&state.series, state.spot_price.as_ref(), &self.inner.config)
    }

    pub fn feed_health(&self) -> FeedHealth {
        FeedHealth::from_statuses(self.inner.read_state().statuses.values())
    }

    /// Whether a retry round is waiting to fire.
    pub fn retry_pending(&self) -> bool {
        self.inner
            .lock_pending()
            .as_ref()
            .is_some_and(|pending| !pending.handle.is_finished())
    }

    /// Retry rounds a series has used in the current cycle.
    pub fn attempts(&self, id: &SeriesId) -> u32 {
        self.inner.read_state().attempts(id)
    }

    fn summary(&self, generation: u64, retry_scheduled: bool, superseded: bool) -> CycleSummary {
        let snapshot = self.snapshot();
        CycleSummary {
            generation,
            ok: snapshot.count(FetchStatus::Ok),
            cached: snapshot.count(FetchStatus::Cache),
            failed: snapshot.count(FetchStatus::Fail),
            retry_scheduled,
            superseded,
        }
    }
}

impl Inner {
    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<ScheduledRetry>> {
        self.pending_retry.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Start a new generation and cancel the retry task of the previous one.
    fn begin_cycle(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(pending) = self.lock_pending().take() {
            if !pending.handle.is_finished() {
                info!(
                    "Cancelling pending retry of cycle {} for cycle {}",
                    pending.generation, generation
                );
            }
            pending.handle.abort();
        }
        generation
    }

    /// Spawn the retry task for `generation` unless one is already pending.
    fn schedule_retry(this: &Arc<Self>, generation: u64) -> bool {
        let mut pending = this.lock_pending();
        if let Some(existing) = pending.as_ref() {
            if existing.generation == generation && !existing.handle.is_finished() {
                return false;
            }
            existing.handle.abort();
        }

        info!(
            "Scheduling retry in {:?} for cycle {}",
            this.config.retry_delay, generation
        );
        let handle = tokio::spawn(Self::run_retries(Arc::clone(this), generation));
        *pending = Some(ScheduledRetry { generation, handle });
        true
    }

    async fn run_retries(this: Arc<Self>, generation: u64) {
        loop {
            tokio::time::sleep(this.config.retry_delay).await;
            match this.retry_round(generation).await {
                RoundOutcome::Continue => continue,
                RoundOutcome::Done | RoundOutcome::Stale => break,
            }
        }

        let mut pending = this.lock_pending();
        if pending
            .as_ref()
            .is_some_and(|p| p.generation == generation)
        {
            *pending = None;
        }
    }

    /// Re-fetch the `FAIL` series that still have retries left.
    async fn retry_round(&self, generation: u64) -> RoundOutcome {
        let ceiling = self.config.retry_ceiling;

        let targets = {
            let mut state = self.write_state();
            if !self.is_current(generation) {
                return RoundOutcome::Stale;
            }
            let targets = state.retryable(ceiling);
            for id in &targets {
                *state.attempts.entry(id.clone()).or_insert(0) += 1;
            }
            targets
        };
        if targets.is_empty() {
            return RoundOutcome::Done;
        }

        info!(
            "Retry round for cycle {}: {}",
            generation,
            targets
                .iter()
                .map(SeriesId::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
        let requests = targets.iter().filter_map(|id| self.request_for(id)).collect();
        let outcomes = self.dispatch(requests).await;

        let mut state = self.write_state();
        if !self.is_current(generation) {
            debug!("Retry round of cycle {} superseded", generation);
            return RoundOutcome::Stale;
        }
        self.persist(&outcomes);
        state.apply(outcomes, Utc::now());
        state.abandon_exhausted(ceiling);
        if state.retryable(ceiling).is_empty() {
            RoundOutcome::Done
        } else {
            RoundOutcome::Continue
        }
    }

    fn request_for(&self, id: &SeriesId) -> Option<FetchRequest> {
        if id.is_spot_price() {
            return Some(FetchRequest::SpotPrice);
        }
        self.config
            .series
            .iter()
            .find(|spec| &spec.id == id)
            .map(|spec| FetchRequest::Series(spec.request()))
    }

    /// Fetch all requests concurrently and reconcile each result.
    async fn dispatch(&self, requests: Vec<FetchRequest>) -> Vec<Reconciled> {
        let results = join_all(requests.iter().map(|r| self.fetcher.fetch(r))).await;
        requests
            .into_iter()
            .zip(results)
            .map(|(request, result)| self.reconcile(request, result))
            .collect()
    }

    fn reconcile(
        &self,
        request: FetchRequest,
        result: Result<FetchPayload, MarketDataError>,
    ) -> Reconciled {
        let id = request.series_id();
        match (request, result) {
            (FetchRequest::Series(_), Ok(FetchPayload::Observations(observations))) => {
                Reconciled {
                    id,
                    status: FetchStatus::Ok,
                    data: ReconciledData::Series(prepare(observations)),
                    error: None,
                }
            }
            (FetchRequest::SpotPrice, Ok(FetchPayload::SpotPrice(spot))) => Reconciled {
                id,
                status: FetchStatus::Ok,
                data: ReconciledData::SpotPrice(Some(spot)),
                error: None,
            },
            (request, Ok(_)) => {
                let message = format!("Fetcher returned the wrong payload for {}", id);
                warn!("{}", message);
                self.fall_back(id, &request, message)
            }
            (request, Err(e)) => self.fall_back(id, &request, e.to_string()),
        }
    }

    /// Write fresh results to the cache.
    ///
    /// Only called for the current generation, with the state lock held.
    fn persist(&self, outcomes: &[Reconciled]) {
        for outcome in outcomes.iter().filter(|o| o.status == FetchStatus::Ok) {
            let saved = match &outcome.data {
                ReconciledData::Series(observations) => {
                    self.cache.save(&outcome.id, observations)
                }
                ReconciledData::SpotPrice(Some(spot)) => self.cache.save_spot_price(spot),
                ReconciledData::SpotPrice(None) => Ok(()),
            };
            if let Err(e) = saved {
                warn!("Could not cache {}: {}", outcome.id, e);
            }
        }
    }

    /// Substitute cached data for a failed fetch.
    fn fall_back(&self, id: SeriesId, request: &FetchRequest, error: String) -> Reconciled {
        let (status, data) = match request {
            FetchRequest::Series(_) => {
                let cached = self.cache.load(&id);
                let status = if cached.is_empty() {
                    FetchStatus::Fail
                } else {
                    FetchStatus::Cache
                };
                (status, ReconciledData::Series(cached))
            }
            FetchRequest::SpotPrice => {
                let cached = self.cache.load_spot_price();
                let status = if cached.is_some() {
                    FetchStatus::Cache
                } else {
                    FetchStatus::Fail
                };
                (status, ReconciledData::SpotPrice(cached))
            }
        };

        match status {
            FetchStatus::Cache => info!("Serving {} from cache: {}", id, error),
            _ => warn!("No data for {}: {}", id, error),
        }

        Reconciled {
            id,
            status,
            data,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SeriesRole, SeriesSpec};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    type Response = std::result::Result<FetchPayload, MarketDataError>;

    /// Fetcher answering from a per-series script and counting calls.
    ///
    /// Spot prices are stamped at fetch time, like the live provider does.
    #[derive(Default)]
    struct ScriptedFetcher {
        responses: Mutex<HashMap<SeriesId, Response>>,
        delays: Mutex<HashMap<SeriesId, Duration>>,
        calls: Mutex<HashMap<SeriesId, usize>>,
    }

    impl ScriptedFetcher {
        fn respond(&self, id: SeriesId, response: Response) {
            self.responses.lock().unwrap().insert(id, response);
        }

        fn observations(&self, id: &'static str, observations: Vec<Observation>) {
            self.respond(
                SeriesId::from_static(id),
                Ok(FetchPayload::Observations(observations)),
            );
        }

        fn fail(&self, id: SeriesId) {
            self.respond(
                id,
                Err(MarketDataError::Http {
                    provider: "FRED".to_string(),
                    status: 503,
                }),
            );
        }

        fn delay(&self, id: SeriesId, delay: Duration) {
            self.delays.lock().unwrap().insert(id, delay);
        }

        fn calls(&self, id: &SeriesId) -> usize {
            self.calls.lock().unwrap().get(id).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, request: &FetchRequest) -> Response {
            let id = request.series_id();
            *self.calls.lock().unwrap().entry(id.clone()).or_insert(0) += 1;
            let response = self
                .responses
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .unwrap_or(Err(MarketDataError::Transport {
                    provider: "TEST".to_string(),
                    message: "no script".to_string(),
                }));
            let delay = self.delays.lock().unwrap().get(&id).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            match response {
                Ok(FetchPayload::SpotPrice(spot)) => {
                    Ok(FetchPayload::SpotPrice(SpotPrice::new(spot.price, Utc::now())))
                }
                other => other,
            }
        }
    }

    const M2: SeriesId = SeriesId::from_static("M2SL");
    const DGS10: SeriesId = SeriesId::from_static("DGS10");
    const DELAY: Duration = Duration::from_secs(30);

    fn config() -> EngineConfig {
        EngineConfig {
            series: vec![
                SeriesSpec::new(M2, Some(SeriesRole::Liquidity)),
                SeriesSpec::new(DGS10, Some(SeriesRole::LongRate)),
            ],
            retry_delay: DELAY,
            retry_ceiling: 3,
            ..EngineConfig::default()
        }
    }

    fn m2_points() -> Vec<Observation> {
        vec![
            Observation::new("2024-02-01", Some(20900.0)),
            Observation::new("2024-01-01", Some(20833.4)),
        ]
    }

    fn healthy_fetcher() -> Arc<ScriptedFetcher> {
        let fetcher = Arc::new(ScriptedFetcher::default());
        fetcher.observations("M2SL", m2_points());
        fetcher.observations("DGS10", vec![Observation::new("2024-02-01", Some(4.2))]);
        fetcher.respond(
            SeriesId::SPOT_PRICE,
            Ok(FetchPayload::SpotPrice(SpotPrice::new(
                dec!(67250.5),
                Utc::now(),
            ))),
        );
        fetcher
    }

    fn coordinator(fetcher: Arc<ScriptedFetcher>) -> (AcquisitionCoordinator, CacheStore) {
        let cache = CacheStore::in_memory();
        (
            AcquisitionCoordinator::new(config(), fetcher, cache.clone()),
            cache,
        )
    }

    /// Let every due timer and the retry task run.
    async fn advance(duration: Duration) {
        tokio::time::sleep(duration).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_cycle_marks_everything_ok() {
        let fetcher = healthy_fetcher();
        let (coordinator, cache) = coordinator(fetcher.clone());

        let summary = coordinator.refresh().await;

        assert_eq!(summary.ok, 3);
        assert!(!summary.retry_scheduled);
        assert_eq!(coordinator.feed_health(), FeedHealth::Stable);

        let snapshot = coordinator.snapshot();
        // Stored sorted by timestamp.
        assert_eq!(
            snapshot.observations(&M2).unwrap()[0].timestamp,
            "2024-01-01"
        );
        assert_eq!(snapshot.spot_price.unwrap().price, dec!(67250.5));
        assert!(snapshot.last_updated.is_some());
        assert!(snapshot.errors.is_empty());
        assert_eq!(cache.load(&M2).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_tracked_series_gets_a_status() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let (coordinator, _) = coordinator(fetcher);

        assert_eq!(coordinator.feed_health(), FeedHealth::Unknown);
        coordinator.refresh().await;

        let statuses = coordinator.statuses();
        let keys: Vec<SeriesId> = statuses.keys().cloned().collect();
        let mut expected = config().tracked_ids();
        expected.sort();
        assert_eq!(keys, expected);
        assert!(statuses.values().all(|s| *s == FetchStatus::Fail));
        assert_eq!(coordinator.feed_health(), FeedHealth::Outage);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_observation_list_is_ok_and_not_retried() {
        let fetcher = healthy_fetcher();
        fetcher.observations("DGS10", Vec::new());
        let (coordinator, _) = coordinator(fetcher.clone());

        let summary = coordinator.refresh().await;
        assert!(!summary.retry_scheduled);
        assert_eq!(
            coordinator.snapshot().status(&DGS10),
            Some(FetchStatus::Ok)
        );
        assert_eq!(coordinator.snapshot().observations(&DGS10), Some(&[][..]));

        advance(DELAY * 5).await;
        assert_eq!(fetcher.calls(&DGS10), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_falls_back_to_previous_data() {
        let fetcher = healthy_fetcher();
        let (coordinator, cache) = coordinator(fetcher.clone());

        coordinator.refresh().await;
        let previous = coordinator.snapshot().series[&M2].clone();

        fetcher.fail(M2);
        let summary = coordinator.refresh().await;

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.status(&M2), Some(FetchStatus::Cache));
        assert_eq!(snapshot.series[&M2], previous);
        assert_eq!(snapshot.errors[&M2], "HTTP 503: FRED");
        assert_eq!(summary.cached, 1);
        // Cached data is usable, so nothing is retried.
        assert!(!summary.retry_scheduled);
        assert_eq!(coordinator.feed_health(), FeedHealth::Degraded);
        // The failure did not clobber the cache.
        assert_eq!(cache.load(&M2), previous);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spot_price_falls_back_to_cache() {
        let fetcher = healthy_fetcher();
        let (coordinator, cache) = coordinator(fetcher.clone());
        let cached = SpotPrice::new(dec!(60000), Utc::now());
        cache.save_spot_price(&cached).unwrap();

        fetcher.fail(SeriesId::SPOT_PRICE);
        coordinator.refresh().await;

        let snapshot = coordinator.snapshot();
        assert_eq!(
            snapshot.status(&SeriesId::SPOT_PRICE),
            Some(FetchStatus::Cache)
        );
        assert_eq!(snapshot.spot_price, Some(cached));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_without_cache_schedules_retry() {
        let fetcher = healthy_fetcher();
        fetcher.fail(M2);
        let (coordinator, _) = coordinator(fetcher.clone());

        let summary = coordinator.refresh().await;

        assert!(summary.retry_scheduled);
        assert!(coordinator.retry_pending());
        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.status(&M2), Some(FetchStatus::Fail));
        assert_eq!(snapshot.observations(&M2), Some(&[][..]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_round_recovers_series() {
        let fetcher = healthy_fetcher();
        fetcher.fail(M2);
        let (coordinator, _) = coordinator(fetcher.clone());
        coordinator.refresh().await;

        fetcher.observations("M2SL", m2_points());
        advance(DELAY + Duration::from_secs(1)).await;

        assert_eq!(coordinator.snapshot().status(&M2), Some(FetchStatus::Ok));
        assert_eq!(coordinator.attempts(&M2), 1);
        assert!(!coordinator.retry_pending());
        assert_eq!(fetcher.calls(&M2), 2);
        // Healthy series are not part of retry rounds.
        assert_eq!(fetcher.calls(&DGS10), 1);
        assert!(coordinator.snapshot().errors.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_stop_at_ceiling() {
        let fetcher = healthy_fetcher();
        fetcher.fail(M2);
        let (coordinator, _) = coordinator(fetcher.clone());
        coordinator.refresh().await;

        advance(DELAY * 20).await;

        // One cycle fetch plus one fetch per allowed retry round.
        assert_eq!(fetcher.calls(&M2), 4);
        assert_eq!(coordinator.attempts(&M2), 3);
        assert!(!coordinator.retry_pending());

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.status(&M2), Some(FetchStatus::Fail));
        assert!(snapshot.abandoned.contains(&M2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ceiling_never_retries() {
        let fetcher = healthy_fetcher();
        fetcher.fail(M2);
        let cache = CacheStore::in_memory();
        let config = EngineConfig {
            retry_ceiling: 0,
            ..config()
        };
        let coordinator = AcquisitionCoordinator::new(config, fetcher.clone(), cache);

        let summary = coordinator.refresh().await;
        assert!(!summary.retry_scheduled);
        assert!(coordinator.snapshot().abandoned.contains(&M2));
        advance(DELAY * 3).await;
        assert_eq!(fetcher.calls(&M2), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_cycle_cancels_pending_retry_and_resets_counters() {
        let fetcher = healthy_fetcher();
        fetcher.fail(M2);
        let (coordinator, _) = coordinator(fetcher.clone());

        coordinator.refresh().await;
        advance(DELAY + Duration::from_secs(1)).await;
        assert_eq!(coordinator.attempts(&M2), 1);
        assert!(coordinator.retry_pending());

        fetcher.observations("M2SL", m2_points());
        let summary = coordinator.refresh().await;
        assert_eq!(summary.generation, 2);
        assert!(!summary.retry_scheduled);
        assert!(!coordinator.retry_pending());
        assert_eq!(coordinator.attempts(&M2), 0);

        // The superseded round never fires.
        advance(DELAY * 3).await;
        assert_eq!(fetcher.calls(&M2), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_cycle_failures_replace_pending_round() {
        let fetcher = healthy_fetcher();
        fetcher.fail(M2);
        let (coordinator, _) = coordinator(fetcher.clone());

        coordinator.refresh().await;
        let summary = coordinator.refresh().await;
        assert!(summary.retry_scheduled);

        advance(DELAY + Duration::from_secs(1)).await;
        // Two cycle fetches and a single retry, not one per cycle.
        assert_eq!(fetcher.calls(&M2), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_is_idempotent() {
        let fetcher = healthy_fetcher();
        let (coordinator, _) = coordinator(fetcher);

        coordinator.refresh().await;
        let (statuses, metrics) = (coordinator.statuses(), coordinator.metrics());
        let first_capture = coordinator.snapshot().spot_price.unwrap().captured_at;
        std::thread::sleep(Duration::from_millis(2));
        coordinator.refresh().await;

        // The spot price was re-stamped, the metrics are unchanged.
        let second_capture = coordinator.snapshot().spot_price.unwrap().captured_at;
        assert!(second_capture > first_capture);
        assert_eq!(coordinator.statuses(), statuses);
        assert_eq!(coordinator.metrics(), metrics);
        assert!(statuses.values().all(|s| *s == FetchStatus::Ok));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_series_are_fetched_concurrently() {
        let fetcher = healthy_fetcher();
        fetcher.delay(M2, Duration::from_secs(10));
        fetcher.delay(DGS10, Duration::from_secs(10));
        let (coordinator, _) = coordinator(fetcher.clone());
        let started = tokio::time::Instant::now();

        let cycle = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.refresh().await }
        });

        advance(Duration::from_secs(5)).await;
        // Nothing is applied while the cycle is still in flight.
        assert!(coordinator.statuses().is_empty());
        assert_eq!(fetcher.calls(&M2), 1);
        assert_eq!(fetcher.calls(&DGS10), 1);

        let summary = cycle.await.unwrap();
        assert_eq!(summary.ok, 3);
        assert!(started.elapsed() >= Duration::from_secs(10));
        assert!(started.elapsed() < Duration::from_secs(20));
        assert_eq!(coordinator.feed_health(), FeedHealth::Stable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_refresh_keeps_newest_cycle() {
        let fetcher = healthy_fetcher();
        fetcher.delay(M2, Duration::from_secs(10));
        let (coordinator, cache) = coordinator(fetcher.clone());

        let first = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.refresh().await }
        });
        while fetcher.calls(&M2) == 0 {
            tokio::task::yield_now().await;
        }

        let latest = vec![Observation::new("2024-03-01", Some(21010.0))];
        fetcher.observations("M2SL", latest.clone());
        fetcher.delay(M2, Duration::ZERO);
        let second = coordinator.refresh().await;
        let first = first.await.unwrap();

        assert_eq!(first.generation, 1);
        assert!(first.superseded);
        assert_eq!(second.generation, 2);
        assert!(!second.superseded);

        // The slow, older cycle settled last but changed nothing.
        assert_eq!(coordinator.snapshot().series[&M2], latest);
        assert_eq!(cache.load(&M2), latest);
        assert_eq!(coordinator.feed_health(), FeedHealth::Stable);
        assert_eq!(fetcher.calls(&M2), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_state() {
        let fetcher = healthy_fetcher();
        let (coordinator, _) = coordinator(fetcher);
        let other = coordinator.clone();

        coordinator.refresh().await;
        assert_eq!(other.feed_health(), FeedHealth::Stable);
    }
}
