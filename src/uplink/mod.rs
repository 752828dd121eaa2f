//! Device uplink webhook utility.
//!
//! A standalone side-channel: [`UplinkServer`] accepts device uplinks posted
//! by a network server webhook and keeps the latest one, and
//! [`UplinkSimulator`] posts mock uplinks for the default fleet. Neither
//! touches the live [`SensorStore`](crate::data::SensorStore).
//!
//! ## Endpoints
//!
//! | Method | Path              | Response                                   |
//! |--------|-------------------|--------------------------------------------|
//! | POST   | `/api/ttn`        | `200 OK`, stores the body (400 if not JSON)|
//! | GET    | `/api/ttn/latest` | latest payload as JSON, `null` before any  |
//! | GET    | `/`               | banner text                                |

mod payload;
mod server;
mod simulate;

pub use payload::{
    ApplicationIds, DecodedPayload, EndDeviceIds, UplinkMessage, UplinkPayload,
    DEFAULT_APPLICATION_ID,
};
pub use server::{handle_request, LatestUplink, UplinkServer};
pub use simulate::{SendReport, UplinkSimulator, UplinkSimulatorBuilder};

use thiserror::Error;

/// Errors raised by the uplink receiver and simulator.
#[derive(Debug, Error)]
pub enum UplinkError {
    /// The listen address could not be parsed.
    #[error("Invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),

    /// Socket-level failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The webhook answered with a non-success status.
    #[error("Webhook returned status {0}")]
    Status(u16),
}
