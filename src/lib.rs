//! # turbidity-watch
//!
//! A terminal dashboard and library for simulated water-turbidity sensors.
//!
//! A fleet of river sensors is seeded into an owned [`SensorStore`]. A mock
//! feed perturbs the readings of online sensors on a fixed interval and
//! publishes each new snapshot to subscribers. The TUI reads those snapshots
//! through a [`DataSource`] and derives every statistic on read.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐  │
//! │  │  app    │───▶│ metrics  │───▶│   ui    │───▶│ Terminal│  │
//! │  │ (state) │    │ (derive) │    │(render) │    │         │  │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘  │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐       ┌───────────┐       ┌──────────┐         │
//! │  │ source  │◀──────│SensorStore│◀──────│ MockFeed │         │
//! │  │ (input) │ watch │  (owned)  │ tick  │  (task)  │         │
//! │  └─────────┘       └───────────┘       └──────────┘         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`data`]**: Sensor records, the store, the seed fleet, derived metrics
//!   and history
//! - **[`feed`]**: The mock telemetry generator and its tokio task
//! - **[`source`]**: The [`DataSource`] trait with live ([`ChannelSource`]) and
//!   replay ([`FileSource`]) implementations
//! - **[`export`]**: CSV and JSON export
//! - **[`uplink`]**: Standalone webhook receiver and uplink simulator
//! - **[`app`]**, **[`events`]**, **[`ui`]**: TUI state, input and rendering
//! - **[`config`]**, **[`logging`]**: Layered settings and tracing setup
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Live dashboard with the mock feed
//! turbidity-watch
//!
//! # Reproducible run, ticking every second
//! turbidity-watch --seed 7 --interval 1s
//!
//! # Write one export and exit
//! turbidity-watch --export sensors.csv
//!
//! # Replay an exported JSON document
//! turbidity-watch --replay turbidity-sensors-2025-06-01.json
//! ```
//!
//! ### As a library with the live feed
//!
//! ```
//! use turbidity_watch::data::SensorStore;
//! use turbidity_watch::feed::{self, FeedConfig, MockFeed};
//! use turbidity_watch::{App, ChannelSource};
//!
//! # tokio_test::block_on(async {
//! let store = SensorStore::seeded();
//! let source = ChannelSource::new(store.subscribe(), "mock feed");
//! let handle = feed::spawn(store, MockFeed::seeded(42, FeedConfig::default()));
//!
//! let app = App::new(Box::new(source), "exports");
//! handle.stop();
//! # });
//! ```
//!
//! ### Metrics on a snapshot
//!
//! ```
//! use turbidity_watch::data::{average, classify, Field, SensorStore, TurbidityLevel};
//!
//! let store = SensorStore::seeded();
//! let avg = average(store.snapshot(), Field::Turbidity);
//! assert_eq!(classify(avg), TurbidityLevel::VeryPoor);
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod export;
pub mod feed;
pub mod logging;
pub mod source;
pub mod ui;
pub mod uplink;

// Re-export main types for convenience
pub use app::{App, View};
pub use config::Settings;
pub use data::{
    FleetSummary, LegendScale, SensorRecord, SensorStatus, SensorStore, Snapshot, StoreError,
    TurbidityLevel,
};
pub use export::{ExportError, ExportFormat};
pub use feed::{FeedConfig, FeedHandle, MockFeed};
pub use source::{ChannelSource, DataSource, FileSource};
