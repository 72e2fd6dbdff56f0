//! Documented register addresses.
//!
//! Multi-byte registers are big-endian. Addresses missing from
//! [`REGISTER_MAP`] have no known meaning and are mirrored as opaque bytes.

use std::fmt;

use crate::registers::ConfigStore;

/// One named register or register group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterInfo {
    /// First address.
    pub address: u8,
    /// Number of bytes (1 or 2 for scalar values, more for tables).
    pub width: u8,
    /// Short identifier.
    pub name: &'static str,
    /// Human-readable meaning.
    pub description: &'static str,
}

impl RegisterInfo {
    const fn new(address: u8, width: u8, name: &'static str, description: &'static str) -> Self {
        RegisterInfo {
            address,
            width,
            name,
            description,
        }
    }

    /// Whether `address` falls inside this entry.
    pub fn covers(&self, address: u8) -> bool {
        address >= self.address && (address as u16) < self.address as u16 + self.width as u16
    }

    /// Read a one- or two-byte value from `store`, `None` if any byte is unknown
    /// or the entry is a table.
    pub fn read(&self, store: &ConfigStore) -> Option<u16> {
        match self.width {
            1 => store.value(self.address).map(u16::from),
            2 => {
                let hi = store.value(self.address)?;
                let lo = store.value(self.address + 1)?;
                Some(u16::from_be_bytes([hi, lo]))
            }
            _ => None,
        }
    }
}

/// Named registers, sorted by address.
pub static REGISTER_MAP: &[RegisterInfo] = &[
    RegisterInfo::new(0x01, 1, "identity", "device identity (0x12 for ProLaser III)"),
    RegisterInfo::new(0x02, 8, "tac_calibration", "TAC/cal leading and trailing edge limits"),
    RegisterInfo::new(0x0c, 2, "range_offset", "range offset, feet x 100"),
    RegisterInfo::new(0x0e, 2, "speed_offset", "speed offset, mph x 10"),
    RegisterInfo::new(0x10, 2, "absolute_min_speed", "absolute minimum speed, mph x 10"),
    RegisterInfo::new(0x12, 2, "min_speed", "minimum speed, mph x 10"),
    RegisterInfo::new(0x14, 2, "max_speed", "maximum speed, mph x 10"),
    RegisterInfo::new(0x18, 2, "min_range", "minimum range, feet x 100"),
    RegisterInfo::new(0x1c, 2, "max_range", "maximum range, feet x 100"),
    RegisterInfo::new(0x1e, 2, "delta_speed", "delta speed, kph x 10"),
    RegisterInfo::new(0x20, 2, "baud_rate", "serial baud rate / 256"),
    RegisterInfo::new(0x22, 2, "continuity", "continuity value"),
    RegisterInfo::new(0x24, 2, "min_number", "minimum number"),
    RegisterInfo::new(0x26, 2, "max_number", "maximum number"),
    RegisterInfo::new(0x28, 2, "display_lock_timeout", "display lock timeout, seconds x 20"),
    RegisterInfo::new(0x2a, 2, "sleep_timeout", "sleep timeout, seconds x 20"),
    RegisterInfo::new(0x2c, 2, "power_off_timeout", "power off timeout, seconds x 20"),
    RegisterInfo::new(0x2e, 2, "gun_fire_timeout", "gun fire timeout, seconds x 25"),
    RegisterInfo::new(0x30, 32, "filters", "pulse width filter table"),
    RegisterInfo::new(0x50, 60, "range_variance", "range variance table"),
    RegisterInfo::new(0x90, 16, "hud_reticle", "HUD / reticle brightness pairs"),
    RegisterInfo::new(0xa0, 1, "brightness", "reticle brightness"),
    RegisterInfo::new(0xa1, 1, "hud_brightness", "HUD brightness level"),
    RegisterInfo::new(0xa2, 1, "piezo_volume", "piezo volume level"),
    RegisterInfo::new(0xa3, 1, "units", "unit system selector"),
    RegisterInfo::new(0xa4, 1, "speed_type", "1 approaching, 2 receding, 3 both"),
    RegisterInfo::new(0xa5, 1, "update_rate", "update rate"),
    RegisterInfo::new(0xa6, 1, "operating_mode", "0 speed, 1 RTR, 3 range"),
    RegisterInfo::new(0xa8, 1, "display_lock", "display lock enabled when 1"),
    RegisterInfo::new(0xa9, 1, "telemetry_variant", "speed packet variant selector"),
    RegisterInfo::new(0xaa, 1, "first_speed_delta", "use first speed delta when 1"),
    RegisterInfo::new(0xab, 1, "reset_sample_window", "reset sample window when 1"),
    RegisterInfo::new(0xac, 1, "prefilter_count", "prefilter count"),
    RegisterInfo::new(0xad, 1, "good_data_percent", "good data percentage"),
    RegisterInfo::new(0xae, 1, "speeds_averaged", "number of speeds averaged"),
    RegisterInfo::new(0xaf, 1, "clock_start_compensation", "clock start compensation on when 1"),
    RegisterInfo::new(0xb0, 1, "cfar", "CFAR on when 1"),
    RegisterInfo::new(0xb1, 1, "min_range_set", "minimum range, feet"),
    RegisterInfo::new(0xb3, 1, "range_filter_1", "range filter 1, feet"),
    RegisterInfo::new(0xb4, 1, "range_filter_2", "range filter 2, feet"),
    RegisterInfo::new(0xb5, 1, "options", "option bits"),
    RegisterInfo::new(0xb6, 1, "data_quality_percent", "data quality percentage"),
    RegisterInfo::new(0xb7, 1, "checksum", "sum of 0x00..=0xb6 modulo 256"),
];

/// Entry covering `address`, if documented.
pub fn register_info(address: u8) -> Option<&'static RegisterInfo> {
    REGISTER_MAP.iter().find(|info| info.covers(address))
}

/// Entry by name.
pub fn register_by_name(name: &str) -> Option<&'static RegisterInfo> {
    REGISTER_MAP.iter().find(|info| info.name == name)
}

/// Option bits in register 0xB5.
pub mod options {
    /// Short serial output.
    pub const SHORT_SERIAL: u8 = 0x80;
    /// Italian display text.
    pub const ITALIAN: u8 = 0x10;
    /// Camera mode.
    pub const CAMERA: u8 = 0x08;
    /// French display text.
    pub const FRENCH: u8 = 0x04;
    /// Disable checksum display on the LCD.
    pub const DISABLE_LCD_CHECKSUM: u8 = 0x02;
    /// Calculate TAC calibration window (does not persist).
    pub const TAC_WINDOW: u8 = 0x01;
}

/// Unit system selected by register 0xA3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    /// mph and feet.
    English,
    /// km/h and meters.
    Metric,
    /// Knots and feet.
    KnotsFeet,
    /// Knots and meters.
    KnotsMeters,
    /// Feet per second.
    FeetPerSecond,
    /// Meters per second.
    MetersPerSecond,
}

impl UnitSystem {
    /// Look up by register value.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(UnitSystem::English),
            0x02 => Some(UnitSystem::Metric),
            0x03 => Some(UnitSystem::KnotsFeet),
            0x04 => Some(UnitSystem::KnotsMeters),
            0x05 => Some(UnitSystem::FeetPerSecond),
            0x06 => Some(UnitSystem::MetersPerSecond),
            _ => None,
        }
    }

    /// Register value.
    pub fn code(self) -> u8 {
        match self {
            UnitSystem::English => 0x01,
            UnitSystem::Metric => 0x02,
            UnitSystem::KnotsFeet => 0x03,
            UnitSystem::KnotsMeters => 0x04,
            UnitSystem::FeetPerSecond => 0x05,
            UnitSystem::MetersPerSecond => 0x06,
        }
    }

    /// Unit in which reading ranges are reported.
    pub fn range_unit(self) -> &'static str {
        match self {
            UnitSystem::English | UnitSystem::KnotsFeet | UnitSystem::FeetPerSecond => "ft",
            UnitSystem::Metric | UnitSystem::KnotsMeters | UnitSystem::MetersPerSecond => "m",
        }
    }

    /// Unit in which reading speeds are reported.
    pub fn speed_unit(self) -> &'static str {
        match self {
            UnitSystem::English => "mph",
            UnitSystem::Metric => "km/h",
            UnitSystem::KnotsFeet | UnitSystem::KnotsMeters => "kn",
            UnitSystem::FeetPerSecond => "ft/s",
            UnitSystem::MetersPerSecond => "m/s",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.speed_unit(), self.range_unit())
    }
}

/// Telemetry packet variant selected by register 0xA9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TelemetryVariant {
    Spd2,
    Spd3,
    Spd4,
}

impl TelemetryVariant {
    /// Look up by register value.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(TelemetryVariant::Spd2),
            0x00 => Some(TelemetryVariant::Spd3),
            0x02 => Some(TelemetryVariant::Spd4),
            _ => None,
        }
    }

    /// Register value.
    pub fn code(self) -> u8 {
        match self {
            TelemetryVariant::Spd2 => 0x01,
            TelemetryVariant::Spd3 => 0x00,
            TelemetryVariant::Spd4 => 0x02,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    #[test]
    fn test_map_sorted_and_disjoint() {
        for pair in REGISTER_MAP.windows(2) {
            let end = pair[0].address as u16 + pair[0].width as u16;
            assert!(end <= pair[1].address as u16, "{} overlaps {}", pair[0].name, pair[1].name);
        }
        let last = REGISTER_MAP.last().unwrap();
        assert_eq!(last.address, REG_CHECKSUM);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(register_info(0x0d).unwrap().name, "range_offset");
        assert_eq!(register_info(0x55).unwrap().name, "range_variance");
        assert!(register_info(0x00).is_none());
        assert!(register_info(0xa7).is_none());
        assert_eq!(register_by_name("units").unwrap().address, REG_UNITS);
    }

    #[test]
    fn test_read_factory_values() {
        let store = ConfigStore::factory();
        assert_eq!(register_by_name("max_speed").unwrap().read(&store), Some(2010));
        assert_eq!(register_by_name("max_range").unwrap().read(&store), Some(10000));
        assert_eq!(register_by_name("baud_rate").unwrap().read(&store), Some(0x4b00));
        assert_eq!(register_by_name("filters").unwrap().read(&store), None);

        let units = UnitSystem::from_code(store.get(REG_UNITS)).unwrap();
        assert_eq!(units, UnitSystem::English);
        let variant = TelemetryVariant::from_code(store.get(REG_TELEMETRY_VARIANT)).unwrap();
        assert_eq!(variant, TelemetryVariant::Spd4);
        assert_ne!(store.get(0xb5) & options::SHORT_SERIAL, 0);
    }

    #[test]
    fn test_unknown_registers_read_none() {
        let store = ConfigStore::unknown();
        assert_eq!(register_by_name("min_speed").unwrap().read(&store), None);
    }
}
