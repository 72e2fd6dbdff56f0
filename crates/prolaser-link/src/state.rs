//! Device state shared between sessions, tap workers and the caller.

use std::sync::Arc;

use parking_lot::Mutex;
use prolaser_protocol::DeviceState;

use crate::event_log::{EventLog, EventRecord};
use crate::status::DeviceStatus;

/// Cloneable handle to one device's state and event log.
///
/// Clones share the same underlying state. Each lock is held only for the
/// duration of one dispatch or one snapshot.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    device: Arc<Mutex<DeviceState>>,
    events: Arc<Mutex<EventLog>>,
}

impl SharedState {
    /// Shared handle around `device`, with an event log of `capacity` entries.
    pub fn new(device: DeviceState, capacity: usize) -> Self {
        SharedState {
            device: Arc::new(Mutex::new(device)),
            events: Arc::new(Mutex::new(EventLog::with_capacity(capacity))),
        }
    }

    /// Run `f` with the device state locked.
    pub fn with_device<R>(&self, f: impl FnOnce(&mut DeviceState) -> R) -> R {
        f(&mut self.device.lock())
    }

    /// Copy of the device state.
    pub fn device(&self) -> DeviceState {
        self.device.lock().clone()
    }

    /// Append to the event log.
    pub fn record(&self, record: EventRecord) {
        self.events.lock().push(record);
    }

    /// Copy of the event log, oldest first.
    pub fn events(&self) -> Vec<EventRecord> {
        self.events.lock().snapshot()
    }

    /// Status snapshot of state and log.
    pub fn status(&self) -> DeviceStatus {
        let device = self.device.lock();
        let events = self.events.lock();
        DeviceStatus::capture(&device, &events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prolaser_protocol::ConfigStore;

    #[test]
    fn test_clones_share_state() {
        let state = SharedState::new(DeviceState::new(ConfigStore::unknown()), 10);
        let other = state.clone();
        other.with_device(|d| d.laser_active = true);
        assert!(state.device().laser_active);
        assert!(state.status().laser_active);
    }
}
