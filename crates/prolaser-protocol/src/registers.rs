//! Mirrored configuration store.
//!
//! The device keeps 183 byte-valued registers at 0x00..=0xB6 and a checksum
//! register at 0xB7 holding their sum modulo 256. The host mirrors them here
//! as read/write traffic is observed.

use crate::constants::{REGISTER_COUNT, REG_CHECKSUM};

/// Factory register image, checksum included.
pub const FACTORY_IMAGE: [u8; REGISTER_COUNT] = [
    0x00, 0x12, 0x07, 0x14, 0x08, 0x40, 0x07, 0x22, 0x08, 0x4e, 0x00, 0x00, 0x00, 0xdc, 0x00, 0x00, // 0x00
    0x00, 0x32, 0x00, 0x32, 0x07, 0xda, 0x00, 0x00, 0x03, 0xe8, 0x00, 0x00, 0x27, 0x10, 0x00, 0x1e, // 0x10
    0x4b, 0x00, 0x00, 0x0a, 0x00, 0x2b, 0x00, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 0x20
    0x01, 0x1e, 0x01, 0xa0, 0x00, 0x02, 0x78, 0xd0, 0x01, 0x68, 0x01, 0x4f, 0x00, 0x02, 0x26, 0xc8, // 0x30
    0x02, 0x05, 0x01, 0xab, 0x00, 0x05, 0x09, 0x10, 0x05, 0x78, 0x2c, 0x24, 0x00, 0xf1, 0x64, 0xd9, // 0x40
    0x00, 0x00, 0xe9, 0x4c, 0x66, 0x2a, 0x01, 0xf4, 0xe9, 0x4c, 0x66, 0x2a, 0x03, 0xe8, 0xe9, 0x4c, // 0x50
    0x66, 0x2a, 0x0b, 0xb8, 0xe9, 0x4c, 0x66, 0x2a, 0x1b, 0x58, 0xe9, 0x4c, 0x66, 0x2a, 0x00, 0x00, // 0x60
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 0x70
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x83, 0x3a, 0xf9, 0x28, // 0x80
    0x00, 0x50, 0x00, 0x52, 0x01, 0x54, 0x02, 0x55, 0x03, 0x57, 0x05, 0x58, 0x09, 0x5b, 0x0f, 0x5e, // 0x90
    0x58, 0x05, 0x05, 0x01, 0x03, 0x3c, 0x00, 0x03, 0x00, 0x02, 0x00, 0x01, 0x14, 0x0a, 0x02, 0x01, // 0xa0
    0x00, 0x0a, 0x40, 0x14, 0x3c, 0x82, 0x50, 0xe0, // 0xb0
];

/// A register value change caused by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RegisterUpdate {
    /// Register address.
    pub address: u8,
    /// Value before the update, `None` if it was unknown.
    pub previous: Option<u8>,
    /// Value after the update.
    pub value: u8,
}

/// Fixed-size register array with a per-register presence marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    values: [u8; REGISTER_COUNT],
    known: [bool; REGISTER_COUNT],
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::factory()
    }
}

impl ConfigStore {
    /// Store holding the factory image, every register known.
    pub fn factory() -> Self {
        ConfigStore {
            values: FACTORY_IMAGE,
            known: [true; REGISTER_COUNT],
        }
    }

    /// Store with nothing known, for mirroring a device from scratch.
    pub fn unknown() -> Self {
        ConfigStore {
            values: [0; REGISTER_COUNT],
            known: [false; REGISTER_COUNT],
        }
    }

    /// Build a store from a full image (0xB7 or 0xB8 bytes).
    ///
    /// A 0xB7-byte image has its checksum register computed.
    pub fn from_image(image: &[u8]) -> Option<Self> {
        let mut store = ConfigStore::unknown();
        match image.len() {
            len if len == REGISTER_COUNT => {
                store.values.copy_from_slice(image);
                store.known = [true; REGISTER_COUNT];
            }
            len if len == REGISTER_COUNT - 1 => {
                store.values[..len].copy_from_slice(image);
                store.known = [true; REGISTER_COUNT];
                store.seal();
            }
            _ => return None,
        }
        Some(store)
    }

    /// Whether `address` names a register.
    pub fn contains(address: u8) -> bool {
        (address as usize) < REGISTER_COUNT
    }

    fn index(address: u8) -> usize {
        assert!(
            Self::contains(address),
            "register address 0x{:02x} out of range",
            address
        );
        address as usize
    }

    /// Raw value at `address`. Unknown registers read as 0.
    ///
    /// # Panics
    ///
    /// If `address` is above 0xB7.
    pub fn get(&self, address: u8) -> u8 {
        self.values[Self::index(address)]
    }

    /// Value at `address` if it is in range and known.
    pub fn value(&self, address: u8) -> Option<u8> {
        let i = address as usize;
        (i < REGISTER_COUNT && self.known[i]).then(|| self.values[i])
    }

    /// Whether the register at `address` has been observed or initialized.
    pub fn is_known(&self, address: u8) -> bool {
        self.value(address).is_some()
    }

    /// Number of known registers.
    pub fn known_count(&self) -> usize {
        self.known.iter().filter(|&&k| k).count()
    }

    /// Store `value` at `address`.
    ///
    /// Returns the update if the value changed or was previously unknown.
    ///
    /// # Panics
    ///
    /// If `address` is above 0xB7.
    pub fn set(&mut self, address: u8, value: u8) -> Option<RegisterUpdate> {
        let i = Self::index(address);
        let previous = self.known[i].then(|| self.values[i]);
        if previous == Some(value) {
            return None;
        }
        self.values[i] = value;
        self.known[i] = true;
        Some(RegisterUpdate {
            address,
            previous,
            value,
        })
    }

    /// Sum of registers 0x00..=0xB6 modulo 256.
    pub fn recompute_checksum(&self) -> u8 {
        self.values[..REG_CHECKSUM as usize]
            .iter()
            .fold(0u8, |sum, &b| sum.wrapping_add(b))
    }

    /// Whether every register is known and 0xB7 matches the recomputed sum.
    pub fn is_consistent(&self) -> bool {
        self.known.iter().all(|&k| k) && self.get(REG_CHECKSUM) == self.recompute_checksum()
    }

    /// Write the recomputed checksum into 0xB7.
    pub fn seal(&mut self) -> u8 {
        let checksum = self.recompute_checksum();
        self.set(REG_CHECKSUM, checksum);
        checksum
    }

    /// Copy of all register values.
    pub fn image(&self) -> [u8; REGISTER_COUNT] {
        self.values
    }

    /// Iterate `(address, value)` pairs, `None` for unknown registers.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Option<u8>)> + '_ {
        (0..REGISTER_COUNT).map(move |i| (i as u8, self.known[i].then(|| self.values[i])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    #[test]
    fn test_factory_checksum_consistent() {
        let store = ConfigStore::factory();
        assert_eq!(store.recompute_checksum(), store.get(REG_CHECKSUM));
        assert_eq!(store.get(REG_CHECKSUM), 0xe0);
        assert!(store.is_consistent());
        assert_eq!(store.get(REG_IDENTITY), PROLASER_III_IDENTITY);
    }

    #[test]
    fn test_set_reports_changes_only() {
        let mut store = ConfigStore::factory();
        assert_eq!(store.set(REG_IDENTITY, 0x12), None);
        assert_eq!(
            store.set(REG_UNITS, 0x02),
            Some(RegisterUpdate {
                address: REG_UNITS,
                previous: Some(0x01),
                value: 0x02
            })
        );
        assert!(!store.is_consistent());
        store.seal();
        assert!(store.is_consistent());
    }

    #[test]
    fn test_unknown_store() {
        let mut store = ConfigStore::unknown();
        assert_eq!(store.value(0x10), None);
        assert_eq!(store.known_count(), 0);
        let update = store.set(0x10, 0x00).unwrap();
        assert_eq!(update.previous, None);
        assert_eq!(store.value(0x10), Some(0x00));
        assert!(!store.is_consistent());
    }

    #[test]
    fn test_value_out_of_range_is_none() {
        let store = ConfigStore::factory();
        assert_eq!(store.value(0xB8), None);
        assert!(ConfigStore::contains(0xB7));
        assert!(!ConfigStore::contains(0xB8));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_out_of_range_panics() {
        ConfigStore::factory().get(0xC0);
    }

    #[test]
    fn test_from_image() {
        let store = ConfigStore::from_image(&FACTORY_IMAGE[..0xB7]).unwrap();
        assert_eq!(store, ConfigStore::factory());
        assert!(ConfigStore::from_image(&[0u8; 10]).is_none());
    }
}
