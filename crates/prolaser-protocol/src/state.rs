//! Per-connection device state mutated by the dispatcher.

use crate::commands::Mode;
use crate::registers::ConfigStore;

/// What the host knows about the device on one connection.
///
/// Every change is made by [`crate::Dispatcher`] in response to one
/// validated frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    /// Mirrored configuration registers.
    pub store: ConfigStore,
    /// Whether the laser is believed to be firing.
    pub laser_active: bool,
    /// Last mode requested, acknowledged or inferred from telemetry.
    pub mode: Option<Mode>,
    /// Last valid speed reading, if the reading carried one.
    pub last_speed: Option<u8>,
    /// Last valid range reading in tenths of the configured unit.
    pub last_range_tenths: Option<u16>,
}

impl Default for DeviceState {
    fn default() -> Self {
        DeviceState::new(ConfigStore::factory())
    }
}

impl DeviceState {
    /// Fresh state around `store`; laser idle, nothing measured.
    pub fn new(store: ConfigStore) -> Self {
        DeviceState {
            store,
            laser_active: false,
            mode: None,
            last_speed: None,
            last_range_tenths: None,
        }
    }

    /// Last range as a decimal value.
    pub fn last_range(&self) -> Option<f64> {
        self.last_range_tenths.map(|t| f64::from(t) / 10.0)
    }
}
