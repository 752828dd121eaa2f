//! Posts mock device uplinks to a webhook.
//!
//! ```rust,no_run
//! use turbidity_watch::data::seed::default_fleet;
//! use turbidity_watch::uplink::UplinkSimulator;
//!
//! # async fn run() -> Result<(), turbidity_watch::uplink::UplinkError> {
//! let simulator = UplinkSimulator::builder()
//!     .webhook_url("http://localhost:3001/api/ttn")
//!     .build()?;
//!
//! let report = simulator.send_all(&default_fleet(chrono::Utc::now())).await;
//! println!("{} sent, {} failed", report.sent, report.failed.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::{UplinkError, UplinkPayload, DEFAULT_APPLICATION_ID};
use crate::data::SensorRecord;
use crate::feed::{MockFeed, MIN_INTERVAL};

const DEFAULT_WEBHOOK_URL: &str = "http://localhost:3001/api/ttn";

/// Outcome of posting one uplink per sensor.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SendReport {
    pub sent: usize,
    /// Device id and error message of each failed post.
    pub failed: Vec<(String, String)>,
}

impl SendReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// HTTP client that posts uplinks on behalf of the sensor fleet.
#[derive(Debug, Clone)]
pub struct UplinkSimulator {
    client: Client,
    webhook_url: String,
    application_id: String,
}

impl UplinkSimulator {
    pub fn builder() -> UplinkSimulatorBuilder {
        UplinkSimulatorBuilder::default()
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Post a single uplink.
    pub async fn send(&self, payload: &UplinkPayload) -> Result<(), UplinkError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UplinkError::Status(status.as_u16()));
        }

        debug!(device = payload.device_id(), "Posted uplink");
        Ok(())
    }

    /// Post one uplink per record. Failures are collected, not propagated.
    pub async fn send_all(&self, records: &[SensorRecord]) -> SendReport {
        let mut report = SendReport::default();
        let received_at = Utc::now();

        for record in records {
            let payload = UplinkPayload::from_record(record, &self.application_id, received_at);
            match self.send(&payload).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    warn!(device = %record.id, error = %e, "Uplink post failed");
                    report.failed.push((record.id.clone(), e.to_string()));
                }
            }
        }

        report
    }

    /// Post the fleet every `interval`, advancing readings with `feed` between
    /// rounds. Runs until the task is cancelled.
    ///
    /// Intervals shorter than the feed's minimum tick are raised to it.
    pub async fn run_repeating(
        &self,
        mut records: Vec<SensorRecord>,
        mut feed: MockFeed,
        interval: Duration,
    ) {
        let mut ticker = tokio::time::interval(interval.max(MIN_INTERVAL));
        let mut round: u64 = 0;

        loop {
            ticker.tick().await;
            round += 1;

            let report = self.send_all(&records).await;
            info!(round, sent = report.sent, failed = report.failed.len(), "Uplink round complete");

            records = feed.tick(&records, Utc::now());
        }
    }
}

/// Builder for [`UplinkSimulator`].
#[derive(Debug, Default)]
pub struct UplinkSimulatorBuilder {
    webhook_url: Option<String>,
    application_id: Option<String>,
    timeout: Option<Duration>,
}

impl UplinkSimulatorBuilder {
    /// Set the webhook URL (default: "http://localhost:3001/api/ttn").
    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Set the application id stamped on every uplink.
    pub fn application_id(mut self, id: impl Into<String>) -> Self {
        self.application_id = Some(id.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<UplinkSimulator, UplinkError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));
        let client = Client::builder().timeout(timeout).build()?;

        Ok(UplinkSimulator {
            client,
            webhook_url: self
                .webhook_url
                .unwrap_or_else(|| DEFAULT_WEBHOOK_URL.to_string()),
            application_id: self
                .application_id
                .unwrap_or_else(|| DEFAULT_APPLICATION_ID.to_string()),
        })
    }
}
