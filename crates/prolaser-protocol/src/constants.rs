//! Protocol constants
//!
//! Framing bytes, command codes and sub-codes observed on the ProLaser III
//! serial link, plus the register addresses the protocol layer itself cares
//! about.

// ============================================================================
// Framing
// ============================================================================

/// Marks the start of every frame.
pub const START_OF_MESSAGE: u8 = 0x02;
/// Marks the end of every frame. Must be escaped inside payload/checksum.
pub const END_OF_MESSAGE: u8 = 0x03;
/// Escape prefix. The byte after it is taken literally.
pub const MESSAGE_ESCAPE: u8 = 0x10;

/// Smallest frame: start + length + command + checksum + end.
pub const MIN_FRAME_LEN: usize = 5;
/// Framing overhead around the payload (start, length, checksum, end).
pub const FRAME_OVERHEAD: usize = 4;
/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD_LEN: usize = 255;

// ============================================================================
// Command Codes
// ============================================================================

/// Exit remote control mode. Echoed back as the acknowledgement.
pub const CMD_EXIT_REMOTE: u8 = 0x01;
/// Read a range of device RAM. Request carries a 16-bit address.
pub const CMD_READ_RAM: u8 = 0x02;
/// Ask the device to identify itself; it answers with an init message.
pub const CMD_WHO_ARE_YOU: u8 = 0x05;
/// Enter remote control mode. Echoed back as the acknowledgement.
pub const CMD_ENABLE_REMOTE: u8 = 0x06;
/// Toggle automatic laser firing. Acknowledged only when turning off.
pub const CMD_TOGGLE_LASER: u8 = 0x07;
/// Select the operating mode (sub-code is one of the `MODE_*` values).
pub const CMD_SET_MODE: u8 = 0x0A;
/// Read one configuration register.
pub const CMD_READ_REGISTER: u8 = 0x0B;
/// Write one configuration register.
pub const CMD_WRITE_REGISTER: u8 = 0x0C;
/// Init text message sent by the device (SPD2/SPD3 telemetry variants).
pub const CMD_INIT_TEXT: u8 = 0x12;
/// Reset / self test.
pub const CMD_RESET: u8 = 0x13;
/// Distance/speed telemetry.
pub const CMD_READING: u8 = 0x18;
/// Init message sent by the device (SPD4 telemetry variant), raw payload.
pub const CMD_INIT_MESSAGE: u8 = 0x19;

// ============================================================================
// Sub-codes
// ============================================================================

/// Speed measurement mode.
pub const MODE_SPEED: u8 = 0x00;
/// Real-time range mode.
pub const MODE_RTR: u8 = 0x01;
/// Range measurement mode.
pub const MODE_RANGE: u8 = 0x03;

/// Write-register sub-code on the request.
pub const WRITE_REQUEST: u8 = 0x80;
/// Write-register sub-code on the acknowledgement.
pub const WRITE_ACK: u8 = 0x00;

/// Validity flag value in a reading frame.
pub const READING_VALID: u8 = 0x01;
/// Speed byte value meaning "no speed measured".
pub const READING_NO_SPEED: u8 = 0xFF;

// ============================================================================
// Registers
// ============================================================================

/// Number of addressable slots, including the checksum register.
pub const REGISTER_COUNT: usize = 0xB8;
/// Device identity register.
pub const REG_IDENTITY: u8 = 0x01;
/// Identity value reported by a ProLaser III.
pub const PROLASER_III_IDENTITY: u8 = 0x12;
/// Unit system selector.
pub const REG_UNITS: u8 = 0xA3;
/// Telemetry packet variant selector.
pub const REG_TELEMETRY_VARIANT: u8 = 0xA9;
/// Checksum of registers 0x00..=0xB6.
pub const REG_CHECKSUM: u8 = 0xB7;

// ============================================================================
// Expected reply sizes (on the wire, unescaped)
// ============================================================================

/// Single-byte acknowledgement (exit/enable remote, toggle laser).
pub const REPLY_LEN_ACK: usize = 5;
/// Set-mode acknowledgement.
pub const REPLY_LEN_MODE: usize = 6;
/// Register read/write acknowledgement.
pub const REPLY_LEN_REGISTER: usize = 8;
/// Telemetry frame.
pub const REPLY_LEN_READING: usize = 11;
/// Init message after reset or who-are-you.
pub const REPLY_LEN_INIT: usize = 160;
