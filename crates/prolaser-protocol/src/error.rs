//! Protocol error types.

use thiserror::Error;

/// Errors that can occur when framing, reading or dispatching messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame is too short to be valid.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Frame checksum does not match its contents.
    #[error("checksum mismatch: calculated 0x{calculated:02X}, frame carries 0x{received:02X}")]
    ChecksumMismatch {
        /// Checksum computed over the de-escaped length and payload.
        calculated: u8,
        /// Checksum byte carried by the frame.
        received: u8,
    },

    /// Frame does not begin with the start marker.
    #[error("frame does not begin with the start marker")]
    MissingStartMarker,

    /// Frame does not end with an unescaped end marker.
    #[error("frame does not end with an unescaped end marker")]
    MissingEndMarker,

    /// Declared length byte disagrees with the payload carried.
    #[error("length byte declares {declared} payload bytes, frame carries {actual}")]
    LengthMismatch {
        /// Value of the length byte.
        declared: u8,
        /// De-escaped payload size.
        actual: usize,
    },

    /// Payload cannot be described by the one-byte length field.
    #[error("payload too long: maximum {max} bytes, got {actual}")]
    PayloadTooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length.
        actual: usize,
    },

    /// A frame needs at least a command byte.
    #[error("payload is empty; a command byte is required")]
    EmptyPayload,

    /// A checksum-valid frame is too short for its command's fields.
    #[error("command 0x{command:02X} needs {expected} payload bytes, got {actual}")]
    PayloadTooShort {
        /// Command byte.
        command: u8,
        /// Payload bytes the command needs.
        expected: usize,
        /// Payload bytes present.
        actual: usize,
    },

    /// Read attempts ran out before a complete frame arrived.
    #[error("no complete frame after {attempts} empty reads ({} bytes pending)", .partial.len())]
    TimeoutExhausted {
        /// Read attempt budget that was spent.
        attempts: u32,
        /// Bytes accumulated before giving up.
        partial: Vec<u8>,
    },

    /// Encoder produced a frame that does not decode back. Codec defect.
    #[error("encoded frame failed its own validation: {}", crate::hexdump::to_hex_string(.frame))]
    EncodeSelfCheckFailed {
        /// The rejected wire bytes.
        frame: Vec<u8>,
    },

    /// Name or code does not identify a known command.
    #[error("unknown command code: 0x{0:02X}")]
    UnknownCommand(u8),

    /// Name does not identify a known mode.
    #[error("unknown mode: {0}")]
    UnknownMode(String),
}

impl ProtocolError {
    /// Short label for metrics and log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            ProtocolError::FrameTooShort { .. } => "too_short",
            ProtocolError::ChecksumMismatch { .. } => "checksum",
            ProtocolError::MissingStartMarker => "no_start",
            ProtocolError::MissingEndMarker => "no_end",
            ProtocolError::LengthMismatch { .. } => "length",
            ProtocolError::PayloadTooLong { .. } => "too_long",
            ProtocolError::EmptyPayload => "empty",
            ProtocolError::PayloadTooShort { .. } => "short_payload",
            ProtocolError::TimeoutExhausted { .. } => "timeout",
            ProtocolError::EncodeSelfCheckFailed { .. } => "self_check",
            ProtocolError::UnknownCommand(_) => "unknown_command",
            ProtocolError::UnknownMode(_) => "unknown_mode",
        }
    }

    /// Whether the offending bytes should be dropped and reading resumed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ProtocolError::EncodeSelfCheckFailed { .. })
    }
}
