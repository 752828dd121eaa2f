//! Sensor data model, the owned store, and derived metrics.
//!
//! ## Submodules
//!
//! - [`sensor`]: [`SensorRecord`], [`SensorStatus`] and the [`Snapshot`] alias
//! - [`store`]: [`SensorStore`], the single-writer container with subscriptions
//! - [`seed`]: the fixed fleet every session starts from
//! - [`metrics`]: classification, colors, averages, extrema, legend scale
//! - [`history`]: per-sensor turbidity history for sparklines
//! - [`duration`]: duration parsing and "time ago" formatting
//!
//! ## Data Flow
//!
//! ```text
//! seed::default_fleet()
//!        │
//!        ▼
//! SensorStore ──replace()──▶ watch channel ──▶ DataSource::poll()
//!        ▲                                            │
//!        │                                            ├──▶ metrics::* (on every read)
//!   MockFeed::tick()                                  └──▶ History::record()
//! ```

pub mod duration;
pub mod history;
pub mod metrics;
pub mod seed;
pub mod sensor;
pub mod store;

pub use history::{History, Trend};
pub use metrics::{
    average, classify, color_for, extremum, Direction, Field, FleetSummary, LegendScale, Rgb,
    TemperatureBand, TurbidityLevel,
};
pub use sensor::{Coordinate, SensorRecord, SensorStatus, Snapshot};
pub use store::{SensorStore, StoreError};
