//! Mock telemetry feed.
//!
//! [`MockFeed`] perturbs the readings of online sensors by small uniform
//! deltas. [`spawn`] runs it on a fixed interval as a tokio task that owns the
//! [`SensorStore`], which keeps the store single-writer: readers only ever see
//! published snapshots through [`SensorStore::subscribe`].
//!
//! # Example
//!
//! ```
//! use turbidity_watch::data::SensorStore;
//! use turbidity_watch::feed::{self, FeedConfig, MockFeed};
//! use turbidity_watch::ChannelSource;
//!
//! # tokio_test::block_on(async {
//! let store = SensorStore::seeded();
//! let source = ChannelSource::new(store.subscribe(), "mock feed");
//! let handle = feed::spawn(store, MockFeed::seeded(7, FeedConfig::default()));
//! handle.stop();
//! # });
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::data::{SensorRecord, SensorStore, Snapshot};

/// Shortest tick interval the feed task accepts.
pub(crate) const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Cadence and perturbation bounds of the mock feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    /// Time between ticks.
    pub interval: Duration,
    /// Maximum absolute turbidity change per tick, in NTU.
    pub turbidity_jitter: f64,
    /// Maximum absolute temperature change per tick, in °C.
    pub temperature_jitter: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            turbidity_jitter: 0.5,
            temperature_jitter: 0.2,
        }
    }
}

/// Random-walk generator for sensor readings.
#[derive(Debug)]
pub struct MockFeed<R = StdRng> {
    rng: R,
    config: FeedConfig,
}

impl MockFeed<StdRng> {
    /// Generator with a reproducible random source.
    pub fn seeded(seed: u64, config: FeedConfig) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), config)
    }

    /// Generator seeded from OS entropy.
    pub fn from_entropy(config: FeedConfig) -> Self {
        Self::with_rng(StdRng::from_entropy(), config)
    }
}

impl<R: Rng> MockFeed<R> {
    /// Generator drawing from the given random source.
    pub fn with_rng(rng: R, mut config: FeedConfig) -> Self {
        config.turbidity_jitter = sanitize_jitter(config.turbidity_jitter);
        config.temperature_jitter = sanitize_jitter(config.temperature_jitter);
        Self { rng, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Produce the next snapshot.
    ///
    /// Online records get new turbidity and temperature values (rounded to one
    /// decimal, turbidity floored at 0) and a timestamp of `now`, never earlier
    /// than their previous one. All other records pass through unchanged.
    pub fn tick(&mut self, records: &[SensorRecord], now: DateTime<Utc>) -> Snapshot {
        records.iter().map(|record| self.perturb(record, now)).collect()
    }

    fn perturb(&mut self, record: &SensorRecord, now: DateTime<Utc>) -> SensorRecord {
        if !record.is_online() {
            return record.clone();
        }

        let turbidity_delta = self.delta(self.config.turbidity_jitter);
        let temperature_delta = self.delta(self.config.temperature_jitter);

        SensorRecord {
            turbidity: round_tenth((record.turbidity + turbidity_delta).max(0.0)),
            water_temperature: round_tenth(record.water_temperature + temperature_delta),
            last_updated: now.max(record.last_updated),
            ..record.clone()
        }
    }

    fn delta(&mut self, jitter: f64) -> f64 {
        if jitter == 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-jitter..=jitter)
    }
}

fn sanitize_jitter(jitter: f64) -> f64 {
    if jitter.is_finite() {
        jitter.abs()
    } else {
        0.0
    }
}

/// Round to one decimal place.
fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Handle to a running feed task.
///
/// The task is aborted when the handle is stopped or dropped.
#[derive(Debug)]
pub struct FeedHandle {
    handle: Option<JoinHandle<()>>,
}

impl FeedHandle {
    /// Stop ticking.
    pub fn stop(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }

    /// Wait for the task to exit on its own (all subscribers gone).
    pub async fn finished(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run `feed` against `store` on the configured interval.
///
/// The task owns the store and exits once every subscriber has been dropped.
/// Must be called from within a tokio runtime.
pub fn spawn<R>(mut store: SensorStore, mut feed: MockFeed<R>) -> FeedHandle
where
    R: Rng + Send + 'static,
{
    let period = feed.config().interval.max(MIN_INTERVAL);

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately; the seed snapshot is already published
        ticker.tick().await;
        info!(sensors = store.len(), ?period, "Mock feed started");

        loop {
            ticker.tick().await;

            if store.is_closed() {
                info!("No subscribers left, stopping mock feed");
                break;
            }

            let next = feed.tick(store.snapshot(), Utc::now());
            match store.replace(next) {
                Ok(()) => debug!(sensors = store.len(), "Published mock snapshot"),
                Err(e) => warn!(error = %e, "Rejected mock snapshot"),
            }
        }
    });

    FeedHandle {
        handle: Some(handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::seed::default_fleet;
    use crate::data::{Coordinate, SensorStatus};
    use chrono::TimeDelta;

    const EPSILON: f64 = 1e-9;

    fn record(id: &str, turbidity: f64, status: SensorStatus) -> SensorRecord {
        SensorRecord::new(
            id,
            id,
            Coordinate::new(52.2, 0.12),
            turbidity,
            17.0,
            status,
            Utc::now() - TimeDelta::minutes(1),
        )
    }

    #[test]
    fn test_tick_keeps_deltas_in_bounds() {
        let mut feed = MockFeed::seeded(42, FeedConfig::default());
        let mut records = default_fleet(Utc::now());

        for _ in 0..500 {
            let next = feed.tick(&records, Utc::now());
            for (before, after) in records.iter().zip(&next) {
                if before.turbidity > 0.5 {
                    assert!((after.turbidity - before.turbidity).abs() <= 0.5 + EPSILON);
                }
                assert!(
                    (after.water_temperature - before.water_temperature).abs() <= 0.2 + EPSILON
                );
            }
            records = next;
        }
    }

    #[test]
    fn test_turbidity_never_negative() {
        let mut feed = MockFeed::seeded(7, FeedConfig::default());
        let mut records = vec![
            record("a", 0.0, SensorStatus::Online),
            record("b", 0.3, SensorStatus::Online),
            record("c", 1.0, SensorStatus::Online),
        ];

        for _ in 0..1_000 {
            records = feed.tick(&records, Utc::now());
            assert!(records.iter().all(|r| r.turbidity >= 0.0));
        }
    }

    #[test]
    fn test_values_are_rounded_to_one_decimal() {
        let mut feed = MockFeed::seeded(3, FeedConfig::default());
        let records = feed.tick(&default_fleet(Utc::now()), Utc::now());

        for r in records.iter().filter(|r| r.is_online()) {
            assert!(((r.turbidity * 10.0).round() - r.turbidity * 10.0).abs() < 1e-6);
            assert!(
                ((r.water_temperature * 10.0).round() - r.water_temperature * 10.0).abs() < 1e-6
            );
        }
    }

    #[test]
    fn test_only_online_records_change() {
        let mut feed = MockFeed::seeded(11, FeedConfig::default());
        let records = default_fleet(Utc::now() - TimeDelta::minutes(5));
        let now = Utc::now();

        let next = feed.tick(&records, now);

        assert_eq!(next.len(), records.len());
        for (before, after) in records.iter().zip(&next) {
            assert_eq!(before.id, after.id);
            if before.is_online() {
                assert_eq!(after.last_updated, now);
            } else {
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn test_timestamp_never_moves_backwards() {
        let mut feed = MockFeed::seeded(5, FeedConfig::default());
        let future = Utc::now() + TimeDelta::hours(1);
        let mut records = vec![record("a", 10.0, SensorStatus::Online)];
        records[0].last_updated = future;

        let next = feed.tick(&records, Utc::now());
        assert_eq!(next[0].last_updated, future);
    }

    #[test]
    fn test_zero_jitter_keeps_values() {
        let config = FeedConfig {
            turbidity_jitter: 0.0,
            temperature_jitter: 0.0,
            ..FeedConfig::default()
        };
        let mut feed = MockFeed::seeded(1, config);
        let records = vec![record("a", 12.3, SensorStatus::Online)];

        let next = feed.tick(&records, Utc::now());
        assert_eq!(next[0].turbidity, 12.3);
        assert_eq!(next[0].water_temperature, 17.0);
    }

    #[test]
    fn test_negative_jitter_is_sanitized() {
        let config = FeedConfig {
            turbidity_jitter: -0.5,
            temperature_jitter: f64::NAN,
            ..FeedConfig::default()
        };
        let feed = MockFeed::seeded(1, config);
        assert_eq!(feed.config().turbidity_jitter, 0.5);
        assert_eq!(feed.config().temperature_jitter, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_feed_publishes_snapshots() {
        let store = SensorStore::seeded();
        let seed: Vec<SensorRecord> = store.snapshot().to_vec();
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        let handle = spawn(store, MockFeed::seeded(9, FeedConfig::default()));

        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();

        assert_eq!(snapshot.len(), seed.len());
        for (before, after) in seed.iter().zip(&snapshot) {
            if !before.is_online() {
                assert_eq!(before, after);
            }
        }

        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_stops_without_subscribers() {
        let store = SensorStore::seeded();
        let rx = store.subscribe();
        let handle = spawn(store, MockFeed::seeded(9, FeedConfig::default()));

        drop(rx);
        handle.finished().await;
    }
}
