//! Point-in-time device status.

use chrono::{DateTime, Utc};
use prolaser_protocol::{DeviceState, Mode};
use serde::Serialize;

use crate::event_log::EventLog;

/// What the host currently believes about the device, plus recent traffic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStatus {
    pub timestamp: DateTime<Utc>,
    pub laser_mode: Option<Mode>,
    pub laser_active: bool,
    pub last_speed: Option<u8>,
    /// Range in the configured unit.
    pub last_range: Option<f64>,
    /// Whether every register is known and the checksum register agrees.
    pub store_consistent: bool,
    pub known_registers: usize,
    /// Recent events, oldest first, formatted for display.
    pub messages: Vec<String>,
}

impl DeviceStatus {
    /// Capture `device` and `events` as of now.
    pub fn capture(device: &DeviceState, events: &EventLog) -> Self {
        DeviceStatus {
            timestamp: Utc::now(),
            laser_mode: device.mode,
            laser_active: device.laser_active,
            last_speed: device.last_speed,
            last_range: device.last_range(),
            store_consistent: device.store.is_consistent(),
            known_registers: device.store.known_count(),
            messages: events.snapshot().iter().map(ToString::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prolaser_protocol::ConfigStore;

    #[test]
    fn test_capture_fresh_state() {
        let status = DeviceStatus::capture(&DeviceState::default(), &EventLog::default());
        assert!(status.store_consistent);
        assert_eq!(status.known_registers, 0xB8);
        assert!(status.laser_mode.is_none());
        assert!(status.messages.is_empty());
    }

    #[test]
    fn test_status_json_shape() {
        let mut device = DeviceState::new(ConfigStore::unknown());
        device.mode = Some(Mode::Speed);
        device.last_speed = Some(45);
        device.last_range_tenths = Some(1234);
        let status = DeviceStatus::capture(&device, &EventLog::default());
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["laser_mode"], "speed");
        assert_eq!(json["last_speed"], 45);
        assert_eq!(json["last_range"], 123.4);
        assert_eq!(json["store_consistent"], false);
        assert!(json["timestamp"].is_string());
    }
}
