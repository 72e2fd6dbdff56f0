//! Message dispatcher.
//!
//! Turns a de-escaped, checksum-valid payload into a [`Dispatched`] result
//! and applies its effect to a [`DeviceState`]. Every length check happens
//! before any mutation, so a rejected frame never leaves a partial update.

use std::fmt;

use log::Level;

use crate::commands::{CommandCode, Mode};
use crate::constants::*;
use crate::error::ProtocolError;
use crate::frame::Frame;
use crate::hexdump::{hexdump, to_hex_string};
use crate::registers::{ConfigStore, RegisterUpdate};
use crate::state::DeviceState;

/// Which way a frame travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Host to device.
    Outbound,
    /// Device to host.
    Inbound,
}

impl Direction {
    /// Short label: `tx` or `rx`.
    pub fn label(self) -> &'static str {
        match self {
            Direction::Outbound => "tx",
            Direction::Inbound => "rx",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A valid distance/speed reading.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Reading {
    /// Speed in the configured unit, `None` when the device measured none.
    pub speed: Option<u8>,
    /// Range in tenths of the configured unit.
    pub range_tenths: u16,
    /// Reading payload after the command byte.
    pub raw: Vec<u8>,
}

impl Reading {
    /// Range as a decimal value.
    pub fn range(&self) -> f64 {
        f64::from(self.range_tenths) / 10.0
    }
}

/// Result of writing the checksum register, compared to the mirrored store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ChecksumCheck {
    /// Sum of mirrored registers 0x00..=0xB6.
    pub calculated: u8,
    /// Value being written to 0xB7.
    pub written: u8,
}

impl ChecksumCheck {
    /// Whether the written checksum agrees with the mirror.
    pub fn matches(&self) -> bool {
        self.calculated == self.written
    }
}

/// Command-specific result of dispatching one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Outbound request with no fields.
    Request,
    /// Inbound acknowledgement with no fields.
    Ack,
    /// Outbound RAM read request.
    RamRequest {
        /// Start address, when the request carries one.
        address: Option<u16>,
    },
    /// Inbound RAM contents.
    RamData(Vec<u8>),
    /// Set-mode request or acknowledgement.
    Mode {
        /// Sub-code on the wire.
        code: u8,
        /// Decoded mode, `None` for an unrecognized sub-code.
        mode: Option<Mode>,
    },
    /// Outbound register read request.
    RegisterRead {
        /// Register address.
        address: u8,
    },
    /// Inbound register read acknowledgement.
    RegisterValue {
        /// Register address.
        address: u8,
        /// Register value.
        data: u8,
        /// Store change, if any.
        update: Option<RegisterUpdate>,
    },
    /// Outbound register write request.
    RegisterWrite {
        /// Register address.
        address: u8,
        /// New value.
        data: u8,
        /// Store change, if any.
        update: Option<RegisterUpdate>,
        /// Present when the checksum register is written.
        checksum: Option<ChecksumCheck>,
    },
    /// Inbound register write acknowledgement.
    RegisterWritten {
        /// Register address.
        address: u8,
    },
    /// Valid telemetry.
    Reading(Reading),
    /// Telemetry whose validity flag is not set.
    InvalidReading(Vec<u8>),
    /// Init text message.
    Text(String),
    /// Init message in raw form.
    InitMessage(Vec<u8>),
    /// Known command with an unhandled sub-code or direction.
    Unhandled {
        /// Sub-code, when present.
        sub_code: Option<u8>,
    },
    /// Command code outside the known set.
    Unknown {
        /// Full payload including the command byte.
        payload: Vec<u8>,
    },
}

impl Outcome {
    /// Register change carried by this outcome.
    pub fn register_update(&self) -> Option<&RegisterUpdate> {
        match self {
            Outcome::RegisterValue { update, .. } | Outcome::RegisterWrite { update, .. } => {
                update.as_ref()
            }
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Request => f.write_str("request"),
            Outcome::Ack => f.write_str("ack"),
            Outcome::RamRequest { address: Some(a) } => write!(f, "read ram 0x{:04x}", a),
            Outcome::RamRequest { address: None } => f.write_str("read ram"),
            Outcome::RamData(data) => write!(f, "ram {}", to_hex_string(data)),
            Outcome::Mode { mode: Some(m), .. } => write!(f, "mode {}", m),
            Outcome::Mode { code, mode: None } => write!(f, "mode unknown 0x{:02x}", code),
            Outcome::RegisterRead { address } => write!(f, "read 0x{:02x}", address),
            Outcome::RegisterValue { address, data, .. } => {
                write!(f, "register 0x{:02x} = 0x{:02x}", address, data)
            }
            Outcome::RegisterWrite { address, data, .. } => {
                write!(f, "write 0x{:02x} = 0x{:02x}", address, data)
            }
            Outcome::RegisterWritten { address } => write!(f, "written 0x{:02x}", address),
            Outcome::Reading(r) => match r.speed {
                Some(speed) => write!(f, "{:.1} range, {} speed", r.range(), speed),
                None => write!(f, "{:.1} range", r.range()),
            },
            Outcome::InvalidReading(raw) => write!(f, "invalid reading {}", to_hex_string(raw)),
            Outcome::Text(text) => f.write_str(text),
            Outcome::InitMessage(raw) => write!(f, "init {}", to_hex_string(raw)),
            Outcome::Unhandled { sub_code: Some(s) } => write!(f, "unhandled sub-code 0x{:02x}", s),
            Outcome::Unhandled { sub_code: None } => f.write_str("unhandled"),
            Outcome::Unknown { payload } => write!(f, "unknown {}", to_hex_string(payload)),
        }
    }
}

/// One dispatched frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    /// Direction the frame travelled.
    pub direction: Direction,
    /// Command code, `Unknown` for codes outside the known set.
    pub command: CommandCode,
    /// Command-specific result.
    pub outcome: Outcome,
}

/// Routes frames to per-command handlers.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    verbosity: u8,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Dispatcher::new(4)
    }
}

fn require(payload: &[u8], expected: usize) -> Result<(), ProtocolError> {
    if payload.len() < expected {
        return Err(ProtocolError::PayloadTooShort {
            command: payload.first().copied().unwrap_or(0),
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

impl Dispatcher {
    /// Create a dispatcher. Higher verbosity promotes routine traffic to `info`.
    pub fn new(verbosity: u8) -> Self {
        Dispatcher { verbosity }
    }

    /// Current verbosity.
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    fn routine_level(&self) -> Level {
        if self.verbosity > 4 {
            Level::Info
        } else {
            Level::Debug
        }
    }

    fn telemetry_level(&self) -> Level {
        if self.verbosity > 2 {
            Level::Info
        } else {
            Level::Debug
        }
    }

    /// Decode raw wire bytes, then dispatch.
    ///
    /// A frame that fails to decode is logged with a hex dump and leaves
    /// `state` untouched.
    pub fn process_raw(
        &self,
        state: &mut DeviceState,
        raw: &[u8],
        direction: Direction,
    ) -> Result<Dispatched, ProtocolError> {
        let frame = Frame::decode(raw).map_err(|e| {
            log::warn!("{} rejected frame: {}\n{}", direction, e, hexdump(raw));
            e
        })?;
        self.dispatch(state, frame.payload(), direction)
    }

    /// Dispatch a de-escaped command-and-payload sequence.
    pub fn dispatch(
        &self,
        state: &mut DeviceState,
        payload: &[u8],
        direction: Direction,
    ) -> Result<Dispatched, ProtocolError> {
        if payload.is_empty() {
            return Err(ProtocolError::EmptyPayload);
        }
        let command = CommandCode::from(payload[0]);
        let outcome = match direction {
            Direction::Outbound => self.outbound(state, command, payload)?,
            Direction::Inbound => self.inbound(state, command, payload)?,
        };
        Ok(Dispatched {
            direction,
            command,
            outcome,
        })
    }

    fn outbound(
        &self,
        state: &mut DeviceState,
        command: CommandCode,
        payload: &[u8],
    ) -> Result<Outcome, ProtocolError> {
        let level = self.routine_level();
        let outcome = match command {
            CommandCode::ExitRemote
            | CommandCode::EnableRemote
            | CommandCode::WhoAreYou
            | CommandCode::Reset => {
                log::log!(level, "tx {}", command);
                Outcome::Request
            }
            CommandCode::ToggleLaser => {
                state.laser_active = !state.laser_active;
                log::log!(level, "tx toggle_laser (now {})", on_off(state.laser_active));
                Outcome::Request
            }
            CommandCode::ReadRam => {
                let address = (payload.len() >= 3).then(|| u16::from_be_bytes([payload[1], payload[2]]));
                log::log!(level, "tx read_ram {}", to_hex_string(&payload[1..]));
                Outcome::RamRequest { address }
            }
            CommandCode::SetMode => {
                require(payload, 2)?;
                self.mode(Direction::Outbound, payload[1])
            }
            CommandCode::ReadRegister => {
                require(payload, 2)?;
                log::log!(level, "tx read_register 0x{:02x}", payload[1]);
                Outcome::RegisterRead {
                    address: payload[1],
                }
            }
            CommandCode::WriteRegister => {
                require(payload, 2)?;
                if payload[1] != WRITE_REQUEST {
                    return Ok(self.unhandled(Direction::Outbound, command, payload));
                }
                require(payload, 4)?;
                let (address, data) = (payload[2], payload[3]);
                log::log!(level, "tx write_register 0x{:02x} = 0x{:02x}", address, data);
                let checksum = (address == REG_CHECKSUM).then(|| {
                    let check = ChecksumCheck {
                        calculated: state.store.recompute_checksum(),
                        written: data,
                    };
                    if check.matches() {
                        log::log!(level, "checksum write 0x{:02x} matches mirror", data);
                    } else {
                        log::warn!(
                            "checksum write 0x{:02x} disagrees with mirror 0x{:02x}",
                            check.written,
                            check.calculated
                        );
                    }
                    check
                });
                let update = mirror(&mut state.store, address, data, Direction::Outbound);
                Outcome::RegisterWrite {
                    address,
                    data,
                    update,
                    checksum,
                }
            }
            CommandCode::InitText | CommandCode::Reading | CommandCode::InitMessage => {
                self.unhandled(Direction::Outbound, command, payload)
            }
            CommandCode::Unknown(_) => self.unknown(Direction::Outbound, payload),
        };
        Ok(outcome)
    }

    fn inbound(
        &self,
        state: &mut DeviceState,
        command: CommandCode,
        payload: &[u8],
    ) -> Result<Outcome, ProtocolError> {
        let level = self.routine_level();
        let outcome = match command {
            CommandCode::ExitRemote | CommandCode::EnableRemote => {
                log::log!(level, "rx ack {}", command);
                Outcome::Ack
            }
            CommandCode::ToggleLaser => {
                // The device only acknowledges turning the laser off.
                state.laser_active = false;
                log::log!(level, "rx ack toggle_laser (off)");
                Outcome::Ack
            }
            CommandCode::ReadRam => {
                log::info!("rx read_ram {}", to_hex_string(&payload[1..]));
                Outcome::RamData(payload[1..].to_vec())
            }
            CommandCode::SetMode => {
                require(payload, 2)?;
                let outcome = self.mode(Direction::Inbound, payload[1]);
                if let Outcome::Mode { mode: Some(m), .. } = outcome {
                    state.mode = Some(m);
                }
                outcome
            }
            CommandCode::ReadRegister => {
                require(payload, 4)?;
                let (address, data) = (payload[2], payload[3]);
                log::log!(level, "rx register 0x{:02x} = 0x{:02x}", address, data);
                let update = mirror(&mut state.store, address, data, Direction::Inbound);
                Outcome::RegisterValue {
                    address,
                    data,
                    update,
                }
            }
            CommandCode::WriteRegister => {
                require(payload, 2)?;
                if payload[1] != WRITE_ACK {
                    return Ok(self.unhandled(Direction::Inbound, command, payload));
                }
                require(payload, 3)?;
                log::log!(level, "rx ack write_register 0x{:02x}", payload[2]);
                Outcome::RegisterWritten {
                    address: payload[2],
                }
            }
            CommandCode::Reading => {
                require(payload, 7)?;
                self.reading(state, payload)
            }
            CommandCode::InitText => {
                let text: Vec<u8> = payload[1..].iter().copied().skip_while(|&b| b < 0x20).collect();
                let text = String::from_utf8_lossy(&text).into_owned();
                let level = if self.verbosity > 3 { Level::Info } else { Level::Debug };
                log::log!(level, "rx init text: {}", text);
                Outcome::Text(text)
            }
            CommandCode::InitMessage => {
                let level = if self.verbosity > 3 { Level::Info } else { Level::Debug };
                log::log!(level, "rx init message:\n{}", hexdump(&payload[1..]));
                Outcome::InitMessage(payload[1..].to_vec())
            }
            CommandCode::WhoAreYou | CommandCode::Reset => {
                self.unhandled(Direction::Inbound, command, payload)
            }
            CommandCode::Unknown(_) => self.unknown(Direction::Inbound, payload),
        };
        Ok(outcome)
    }

    fn mode(&self, direction: Direction, code: u8) -> Outcome {
        let mode = Mode::from_code(code);
        match mode {
            Some(m) => log::log!(self.routine_level(), "{} set_mode {}", direction, m),
            None => log::warn!("{} set_mode unknown mode 0x{:02x}", direction, code),
        }
        Outcome::Mode { code, mode }
    }

    fn reading(&self, state: &mut DeviceState, payload: &[u8]) -> Outcome {
        let raw = payload[1..].to_vec();
        if payload[6] != READING_VALID {
            log::warn!("rx reading not valid: {}", to_hex_string(&raw));
            return Outcome::InvalidReading(raw);
        }
        let speed = (payload[2] != READING_NO_SPEED).then_some(payload[2]);
        let range_tenths = u16::from_le_bytes([payload[4], payload[5]]);

        state.laser_active = true;
        state.mode = Some(match speed {
            Some(s) if s != 0 => Mode::Speed,
            _ => Mode::Range,
        });
        state.last_speed = speed;
        state.last_range_tenths = Some(range_tenths);

        let reading = Reading {
            speed,
            range_tenths,
            raw,
        };
        log::log!(
            self.telemetry_level(),
            "rx reading {}: {:5.1} range, {} speed",
            to_hex_string(&reading.raw),
            reading.range(),
            speed.unwrap_or(0)
        );
        Outcome::Reading(reading)
    }

    fn unhandled(&self, direction: Direction, command: CommandCode, payload: &[u8]) -> Outcome {
        log::warn!(
            "{} unhandled {} in {}",
            direction,
            command,
            to_hex_string(payload)
        );
        Outcome::Unhandled {
            sub_code: payload.get(1).copied(),
        }
    }

    fn unknown(&self, direction: Direction, payload: &[u8]) -> Outcome {
        log::warn!(
            "{} unknown command 0x{:02x} in {}",
            direction,
            payload[0],
            to_hex_string(payload)
        );
        Outcome::Unknown {
            payload: payload.to_vec(),
        }
    }
}

fn on_off(active: bool) -> &'static str {
    if active {
        "on"
    } else {
        "off"
    }
}

/// Apply a register value seen on the wire. Out-of-range addresses are ignored.
fn mirror(
    store: &mut ConfigStore,
    address: u8,
    data: u8,
    direction: Direction,
) -> Option<RegisterUpdate> {
    if !ConfigStore::contains(address) {
        log::warn!(
            "{} register 0x{:02x} is outside the register map, not mirrored",
            direction,
            address
        );
        return None;
    }
    store.set(address, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode;
    use approx::assert_relative_eq;

    fn inbound(state: &mut DeviceState, payload: &[u8]) -> Dispatched {
        Dispatcher::default()
            .dispatch(state, payload, Direction::Inbound)
            .unwrap()
    }

    fn outbound(state: &mut DeviceState, payload: &[u8]) -> Dispatched {
        Dispatcher::default()
            .dispatch(state, payload, Direction::Outbound)
            .unwrap()
    }

    #[test]
    fn test_register_read_ack_updates_store() {
        let mut state = DeviceState::new(ConfigStore::unknown());
        let d = inbound(&mut state, &[0x0B, 0x00, 0x01, 0x12]);
        assert_eq!(d.command, CommandCode::ReadRegister);
        assert_eq!(state.store.value(0x01), Some(0x12));
        assert_eq!(
            d.outcome.register_update(),
            Some(&RegisterUpdate {
                address: 0x01,
                previous: None,
                value: 0x12
            })
        );
    }

    #[test]
    fn test_write_request_updates_store_optimistically() {
        let mut state = DeviceState::default();
        let d = outbound(&mut state, &[0x0C, 0x80, 0xA3, 0x02]);
        assert_eq!(state.store.get(0xA3), 0x02);
        match d.outcome {
            Outcome::RegisterWrite {
                address, checksum, ..
            } => {
                assert_eq!(address, 0xA3);
                assert!(checksum.is_none());
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        // Write ack carries no data and changes nothing.
        let before = state.clone();
        let d = inbound(&mut state, &[0x0C, 0x00, 0xA3, 0x00]);
        assert_eq!(d.outcome, Outcome::RegisterWritten { address: 0xA3 });
        assert_eq!(state, before);
    }

    #[test]
    fn test_checksum_write_is_compared() {
        let mut state = DeviceState::default();
        state.store.set(0xA3, 0x02);
        let expected = state.store.recompute_checksum();
        let d = outbound(&mut state, &[0x0C, 0x80, REG_CHECKSUM, expected]);
        match d.outcome {
            Outcome::RegisterWrite {
                checksum: Some(check),
                ..
            } => assert!(check.matches()),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(state.store.is_consistent());

        let d = outbound(&mut state, &[0x0C, 0x80, REG_CHECKSUM, expected.wrapping_add(1)]);
        match d.outcome {
            Outcome::RegisterWrite {
                checksum: Some(check),
                ..
            } => assert!(!check.matches()),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_register_ignored() {
        let mut state = DeviceState::default();
        let before = state.clone();
        let d = inbound(&mut state, &[0x0B, 0x00, 0xC0, 0x55]);
        assert_eq!(d.outcome.register_update(), None);
        assert_eq!(state, before);
    }

    #[test]
    fn test_laser_flag() {
        let mut state = DeviceState::default();
        outbound(&mut state, &[CMD_TOGGLE_LASER]);
        assert!(state.laser_active);
        outbound(&mut state, &[CMD_TOGGLE_LASER]);
        assert!(!state.laser_active);
        outbound(&mut state, &[CMD_TOGGLE_LASER]);
        let d = inbound(&mut state, &[CMD_TOGGLE_LASER]);
        assert_eq!(d.outcome, Outcome::Ack);
        assert!(!state.laser_active);
    }

    #[test]
    fn test_valid_reading() {
        let mut state = DeviceState::default();
        // speed 45, range 0x2710 = 1000.0
        let d = inbound(&mut state, &[0x18, 0x00, 45, 0x00, 0x10, 0x27, 0x01]);
        match &d.outcome {
            Outcome::Reading(r) => {
                assert_eq!(r.speed, Some(45));
                assert_relative_eq!(r.range(), 1000.0);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(state.laser_active);
        assert_eq!(state.mode, Some(Mode::Speed));
        assert_eq!(state.last_speed, Some(45));
        assert_relative_eq!(state.last_range().unwrap(), 1000.0);
    }

    #[test]
    fn test_reading_without_speed_infers_range_mode() {
        let mut state = DeviceState::default();
        let d = inbound(&mut state, &[0x18, 0x00, 0xFF, 0x00, 0x7B, 0x00, 0x01]);
        match &d.outcome {
            Outcome::Reading(r) => {
                assert_eq!(r.speed, None);
                assert_relative_eq!(r.range(), 12.3);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(state.mode, Some(Mode::Range));
    }

    #[test]
    fn test_invalid_reading_changes_nothing() {
        let mut state = DeviceState::default();
        let before = state.clone();
        let d = inbound(&mut state, &[0x18, 0x00, 45, 0x00, 0x10, 0x27, 0x00]);
        assert!(matches!(d.outcome, Outcome::InvalidReading(_)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_short_payload_rejected_without_mutation() {
        let mut state = DeviceState::new(ConfigStore::unknown());
        let before = state.clone();
        let err = Dispatcher::default()
            .dispatch(&mut state, &[0x0B, 0x00, 0x01], Direction::Inbound)
            .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::PayloadTooShort {
                command: 0x0B,
                expected: 4,
                actual: 3
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_set_mode_ack_records_mode() {
        let mut state = DeviceState::default();
        let d = outbound(&mut state, &[0x0A, 0x03]);
        assert_eq!(
            d.outcome,
            Outcome::Mode {
                code: 0x03,
                mode: Some(Mode::Range)
            }
        );
        assert_eq!(state.mode, None);
        inbound(&mut state, &[0x0A, 0x01]);
        assert_eq!(state.mode, Some(Mode::Rtr));
        let d = inbound(&mut state, &[0x0A, 0x07]);
        assert_eq!(d.outcome, Outcome::Mode { code: 0x07, mode: None });
        assert_eq!(state.mode, Some(Mode::Rtr));
    }

    #[test]
    fn test_init_text_skips_control_bytes() {
        let mut state = DeviceState::default();
        let mut payload = vec![0x12, 0x00, 0x01, 0x0D];
        payload.extend_from_slice(b"PROLASER III");
        let d = inbound(&mut state, &payload);
        assert_eq!(d.outcome, Outcome::Text("PROLASER III".to_string()));
    }

    #[test]
    fn test_unknown_command_is_not_an_error() {
        let mut state = DeviceState::default();
        let before = state.clone();
        let d = inbound(&mut state, &[0x42, 0x01, 0x02]);
        assert_eq!(d.command, CommandCode::Unknown(0x42));
        assert_eq!(
            d.outcome,
            Outcome::Unknown {
                payload: vec![0x42, 0x01, 0x02]
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_unhandled_sub_code() {
        let mut state = DeviceState::default();
        let d = inbound(&mut state, &[0x0C, 0x80, 0x01, 0x12]);
        assert_eq!(d.outcome, Outcome::Unhandled { sub_code: Some(0x80) });
        let d = outbound(&mut state, &[CMD_READING]);
        assert_eq!(d.outcome, Outcome::Unhandled { sub_code: None });
    }

    #[test]
    fn test_process_raw_rejects_bad_checksum() {
        let mut state = DeviceState::new(ConfigStore::unknown());
        let mut raw = encode(&[0x0B, 0x00, 0x01, 0x12]).unwrap();
        let chk = raw.len() - 2;
        raw[chk] = raw[chk].wrapping_add(1);
        let err = Dispatcher::default()
            .process_raw(&mut state, &raw, Direction::Inbound)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::ChecksumMismatch { .. }));
        assert_eq!(state.store.value(0x01), None);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(
            Outcome::RegisterValue {
                address: 0x01,
                data: 0x12,
                update: None
            }
            .to_string(),
            "register 0x01 = 0x12"
        );
        assert_eq!(Outcome::Ack.to_string(), "ack");
    }
}
