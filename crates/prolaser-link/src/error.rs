//! Link-layer errors.

use prolaser_protocol::{CommandCode, ProtocolError};
use thiserror::Error;

/// Errors from driving or monitoring a device.
#[derive(Error, Debug)]
pub enum LinkError {
    /// Framing, decoding or dispatch failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Transport I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port could not be opened or configured.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// The device did not answer within the read budget.
    #[error("no response to {command}")]
    NoResponse {
        /// Command that went unanswered.
        command: CommandCode,
    },

    /// The device answered with something other than what was asked for.
    #[error("expected {expected}, got {got}")]
    UnexpectedResponse {
        /// What the request called for.
        expected: String,
        /// What arrived.
        got: String,
    },

    /// The identity register does not name a ProLaser III.
    #[error("wrong device: identity 0x{actual:02x}, expected 0x{expected:02x}")]
    WrongDevice {
        /// Identity the driver requires.
        expected: u8,
        /// Identity the device reported.
        actual: u8,
    },

    /// Register image has the wrong size.
    #[error("register image has {actual} bytes, expected 183 or 184")]
    BadImage {
        /// Bytes supplied.
        actual: usize,
    },

    /// Register image does not cover every register.
    #[error("register image has {known} known registers, expected 183")]
    IncompleteImage {
        /// Registers with a value, checksum excluded.
        known: usize,
    },

    /// A tap worker went away.
    #[error("event channel closed")]
    ChannelClosed,
}

/// Result alias for link operations.
pub type LinkResult<T> = Result<T, LinkError>;
