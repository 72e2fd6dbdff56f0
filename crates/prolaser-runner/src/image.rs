//! Register image files written by `dump --json` and read by `program`.

use std::fs;
use std::path::Path;

use prolaser_link::LinkError;
use prolaser_protocol::{ConfigStore, REG_CHECKSUM, REG_IDENTITY};
use serde::{Deserialize, Serialize};

use crate::error::RunnerError;

/// A full register image. Only `hex` is read back; the other fields are
/// for people looking at the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterImage {
    #[serde(default)]
    pub identity: Option<u8>,
    #[serde(default)]
    pub checksum: Option<u8>,
    #[serde(default)]
    pub consistent: Option<bool>,
    /// Registers 0x00..=0xB7 (or 0x00..=0xB6) as one hex string.
    pub hex: String,
}

impl RegisterImage {
    pub fn from_store(store: &ConfigStore) -> Self {
        RegisterImage {
            identity: store.value(REG_IDENTITY),
            checksum: store.value(REG_CHECKSUM),
            consistent: Some(store.is_consistent()),
            hex: hex::encode(store.image()),
        }
    }

    /// Decode the image. A 183-byte image gets its checksum computed.
    pub fn to_store(&self) -> Result<ConfigStore, RunnerError> {
        let bytes = hex::decode(self.hex.trim())?;
        ConfigStore::from_image(&bytes)
            .ok_or_else(|| LinkError::BadImage { actual: bytes.len() }.into())
    }

    pub fn load(path: &Path) -> Result<Self, RunnerError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), RunnerError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, RunnerError> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prolaser_protocol::REG_UNITS;

    #[test]
    fn test_factory_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.json");
        let image = RegisterImage::from_store(&ConfigStore::factory());
        assert_eq!(image.identity, Some(0x12));
        assert_eq!(image.consistent, Some(true));
        assert_eq!(image.hex.len(), 0xB8 * 2);

        image.save(&path).unwrap();
        let loaded = RegisterImage::load(&path).unwrap();
        assert_eq!(loaded.to_store().unwrap(), ConfigStore::factory());
    }

    #[test]
    fn test_short_image_gets_checksum() {
        let mut bytes = ConfigStore::factory().image().to_vec();
        bytes.pop();
        bytes[REG_UNITS as usize] = 0x02;
        let image = RegisterImage {
            identity: None,
            checksum: None,
            consistent: None,
            hex: hex::encode(&bytes),
        };
        let store = image.to_store().unwrap();
        assert!(store.is_consistent());
        assert_eq!(store.get(REG_UNITS), 0x02);
    }

    #[test]
    fn test_wrong_size_rejected() {
        let image = RegisterImage {
            identity: None,
            checksum: None,
            consistent: None,
            hex: "0012".to_string(),
        };
        assert!(matches!(
            image.to_store(),
            Err(RunnerError::Link(LinkError::BadImage { actual: 2 }))
        ));
    }

    #[test]
    fn test_only_hex_required() {
        let hex = hex::encode(ConfigStore::factory().image());
        let image: RegisterImage = serde_json::from_str(&format!(r#"{{"hex": "{}"}}"#, hex)).unwrap();
        assert!(image.to_store().is_ok());
    }
}
