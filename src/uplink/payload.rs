//! Device uplink message shape, as delivered by a LoRaWAN network server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::SensorRecord;

/// Application the simulated devices belong to.
pub const DEFAULT_APPLICATION_ID: &str = "river-quality-tracker";

/// A single device uplink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UplinkPayload {
    pub end_device_ids: EndDeviceIds,
    pub uplink_message: UplinkMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndDeviceIds {
    pub device_id: String,
    pub application_ids: ApplicationIds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationIds {
    pub application_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UplinkMessage {
    #[serde(default)]
    pub f_port: u8,
    /// Raw payload, base64.
    #[serde(default)]
    pub frm_payload: String,
    pub decoded_payload: DecodedPayload,
    #[serde(default)]
    pub rx_metadata: Vec<serde_json::Value>,
    #[serde(default)]
    pub settings: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

/// Readings decoded by the network server's payload formatter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodedPayload {
    pub turbidity: f64,
    pub temperature: f64,
}

impl UplinkPayload {
    /// Build the uplink a sensor would send for its current readings.
    pub fn from_record(
        record: &SensorRecord,
        application_id: &str,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            end_device_ids: EndDeviceIds {
                device_id: record.id.clone(),
                application_ids: ApplicationIds {
                    application_id: application_id.to_string(),
                },
            },
            uplink_message: UplinkMessage {
                f_port: 1,
                frm_payload: "AA==".to_string(),
                decoded_payload: DecodedPayload {
                    turbidity: record.turbidity,
                    temperature: record.water_temperature,
                },
                rx_metadata: Vec::new(),
                settings: serde_json::json!({}),
                received_at,
            },
        }
    }

    pub fn device_id(&self) -> &str {
        &self.end_device_ids.device_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::seed::default_fleet;

    #[test]
    fn test_from_record() {
        let fleet = default_fleet(Utc::now());
        let now = Utc::now();
        let payload = UplinkPayload::from_record(&fleet[0], DEFAULT_APPLICATION_ID, now);

        assert_eq!(payload.device_id(), "sensor-010");
        assert_eq!(
            payload.end_device_ids.application_ids.application_id,
            "river-quality-tracker"
        );
        assert_eq!(payload.uplink_message.decoded_payload.turbidity, 52.0);
        assert_eq!(payload.uplink_message.decoded_payload.temperature, 17.6);
        assert_eq!(payload.uplink_message.received_at, now);
    }

    #[test]
    fn test_deserialize_minimal_uplink() {
        let json = r#"{
            "end_device_ids": {
                "device_id": "sensor-001",
                "application_ids": { "application_id": "river-quality-tracker" }
            },
            "uplink_message": {
                "decoded_payload": { "turbidity": 12.5, "temperature": 16.1 },
                "received_at": "2025-06-01T12:00:00.000Z"
            }
        }"#;

        let payload: UplinkPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.device_id(), "sensor-001");
        assert_eq!(payload.uplink_message.f_port, 0);
        assert!(payload.uplink_message.rx_metadata.is_empty());
        assert_eq!(payload.uplink_message.decoded_payload.turbidity, 12.5);
    }
}
