//! Frame encoding/decoding utilities.
//!
//! Every message on the wire is wrapped as:
//!
//! ```text
//! +------+-----+---------------------+-----+------+
//! | 0x02 | LEN | payload[0..LEN]     | CHK | 0x03 |
//! +------+-----+---------------------+-----+------+
//! ```
//!
//! - `LEN` counts unescaped payload bytes and is itself sent verbatim.
//! - `CHK = (LEN + sum(payload)) mod 256`, computed before escaping.
//! - Inside payload and `CHK`, a literal `0x03` or `0x10` is sent as
//!   `0x10 <byte>`. The escape byte never contributes to the checksum.
//!
//! [`EscapeScanner`] is the one place that knows these rules; the decoder,
//! [`FrameAccumulator`] and the blocking [`crate::FrameReader`] all drive it.

use bytes::BytesMut;

use crate::constants::*;
use crate::error::ProtocolError;
use crate::hexdump::{hexdump, to_hex_string};

/// Largest possible raw frame: every payload byte and the checksum escaped.
pub const MAX_RAW_FRAME_LEN: usize = 1 + 1 + 2 * MAX_PAYLOAD_LEN + 2 + 1;

/// Classification of one wire byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scanned {
    /// Byte seen outside a frame that is not a marker.
    Noise(u8),
    /// Start marker opening a frame.
    Start,
    /// The length byte following the start marker (never escaped).
    Length(u8),
    /// An escape prefix. Dropped from the de-escaped stream.
    Escape,
    /// A payload or checksum byte, already de-escaped.
    Data(u8),
    /// An unescaped end marker.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ScanState {
    #[default]
    Idle,
    Length,
    Body {
        escape_pending: bool,
    },
}

/// Incremental escape-aware scanner over a wire byte stream.
#[derive(Debug, Clone, Default)]
pub struct EscapeScanner {
    state: ScanState,
}

impl EscapeScanner {
    /// Create a scanner positioned outside any frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the next byte and advance.
    pub fn feed(&mut self, byte: u8) -> Scanned {
        match self.state {
            ScanState::Idle => match byte {
                START_OF_MESSAGE => {
                    self.state = ScanState::Length;
                    Scanned::Start
                }
                END_OF_MESSAGE => Scanned::End,
                other => Scanned::Noise(other),
            },
            ScanState::Length => {
                self.state = ScanState::Body {
                    escape_pending: false,
                };
                Scanned::Length(byte)
            }
            ScanState::Body { escape_pending: true } => {
                self.state = ScanState::Body {
                    escape_pending: false,
                };
                Scanned::Data(byte)
            }
            ScanState::Body {
                escape_pending: false,
            } => match byte {
                MESSAGE_ESCAPE => {
                    self.state = ScanState::Body {
                        escape_pending: true,
                    };
                    Scanned::Escape
                }
                END_OF_MESSAGE => {
                    self.state = ScanState::Idle;
                    Scanned::End
                }
                other => Scanned::Data(other),
            },
        }
    }

    /// Whether the previous byte was an escape prefix.
    pub fn escape_pending(&self) -> bool {
        matches!(self.state, ScanState::Body { escape_pending: true })
    }

    /// Whether a start marker has been seen and the frame is still open.
    pub fn in_frame(&self) -> bool {
        !matches!(self.state, ScanState::Idle)
    }

    /// Return to the idle state.
    pub fn reset(&mut self) {
        self.state = ScanState::Idle;
    }
}

/// Checksum over the length byte and unescaped payload.
pub fn checksum(length: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(length, |sum, &b| sum.wrapping_add(b))
}

fn push_escaped(out: &mut Vec<u8>, byte: u8) {
    if byte == END_OF_MESSAGE || byte == MESSAGE_ESCAPE {
        out.push(MESSAGE_ESCAPE);
    }
    out.push(byte);
}

/// De-escape a raw frame, keeping start, length, checksum and end bytes.
///
/// Returns the de-escaped bytes and whether the input ended exactly on an
/// unescaped end marker.
pub fn unescape(raw: &[u8]) -> (Vec<u8>, bool) {
    let mut scanner = EscapeScanner::new();
    let mut out = Vec::with_capacity(raw.len());
    let mut terminated_at = None;
    for (i, &b) in raw.iter().enumerate() {
        match scanner.feed(b) {
            Scanned::Escape => {}
            Scanned::Start => out.push(START_OF_MESSAGE),
            Scanned::End => {
                out.push(END_OF_MESSAGE);
                terminated_at.get_or_insert(i);
            }
            Scanned::Length(v) | Scanned::Data(v) | Scanned::Noise(v) => out.push(v),
        }
    }
    let clean_end = terminated_at == Some(raw.len().saturating_sub(1)) && !raw.is_empty();
    (out, clean_end)
}

/// A validated protocol frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Vec<u8>,
}

impl Frame {
    /// Wrap a command-and-payload sequence (1 to 255 bytes).
    pub fn new(payload: impl Into<Vec<u8>>) -> Result<Self, ProtocolError> {
        let payload = payload.into();
        if payload.is_empty() {
            return Err(ProtocolError::EmptyPayload);
        }
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(ProtocolError::PayloadTooLong {
                max: MAX_PAYLOAD_LEN,
                actual: payload.len(),
            });
        }
        Ok(Frame { payload })
    }

    /// Command code (`payload[0]`).
    pub fn command(&self) -> u8 {
        self.payload[0]
    }

    /// Sub-code (`payload[1]`), when present.
    pub fn sub_code(&self) -> Option<u8> {
        self.payload.get(1).copied()
    }

    /// Command byte followed by command data.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Command data after the command byte.
    pub fn data(&self) -> &[u8] {
        &self.payload[1..]
    }

    /// Value of the length byte.
    pub fn length(&self) -> u8 {
        self.payload.len() as u8
    }

    /// Checksum byte for this frame.
    pub fn checksum(&self) -> u8 {
        checksum(self.length(), &self.payload)
    }

    /// Serialize without the self-check. Used by [`Frame::encode`].
    fn to_wire_unchecked(&self) -> Vec<u8> {
        let mut wire = Vec::with_capacity(self.payload.len() * 2 + FRAME_OVERHEAD + 1);
        wire.push(START_OF_MESSAGE);
        wire.push(self.length());
        for &b in &self.payload {
            push_escaped(&mut wire, b);
        }
        push_escaped(&mut wire, self.checksum());
        wire.push(END_OF_MESSAGE);
        wire
    }

    /// Serialize to wire bytes, then verify they decode back to this frame.
    ///
    /// A failed self-check is a codec defect: it is logged at error level and
    /// the bytes are withheld.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let wire = self.to_wire_unchecked();
        match Frame::decode(&wire) {
            Ok(ref back) if back == self => Ok(wire),
            _ => {
                log::error!(
                    "encoder self-check failed for payload {}:\n{}",
                    to_hex_string(&self.payload),
                    hexdump(&wire)
                );
                Err(ProtocolError::EncodeSelfCheckFailed { frame: wire })
            }
        }
    }

    /// Validate and de-escape raw wire bytes.
    pub fn decode(raw: &[u8]) -> Result<Self, ProtocolError> {
        let (bytes, clean_end) = unescape(raw);
        if bytes.len() < MIN_FRAME_LEN {
            return Err(ProtocolError::FrameTooShort {
                expected: MIN_FRAME_LEN,
                actual: bytes.len(),
            });
        }
        if bytes[0] != START_OF_MESSAGE {
            return Err(ProtocolError::MissingStartMarker);
        }
        if !clean_end {
            return Err(ProtocolError::MissingEndMarker);
        }

        let body = &bytes[1..bytes.len() - 2];
        let received = bytes[bytes.len() - 2];
        let calculated = body.iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
        if calculated != received {
            return Err(ProtocolError::ChecksumMismatch {
                calculated,
                received,
            });
        }

        let declared = body[0];
        let payload = &body[1..];
        if declared as usize != payload.len() {
            return Err(ProtocolError::LengthMismatch {
                declared,
                actual: payload.len(),
            });
        }

        Frame::new(payload.to_vec())
    }
}

/// Encode a command-and-payload sequence into wire bytes.
pub fn encode(payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    Frame::new(payload.to_vec())?.encode()
}

/// Decode wire bytes into the command-and-payload sequence.
pub fn decode(raw: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    Frame::decode(raw).map(|frame| frame.payload)
}

/// Accumulates a byte stream into raw frames.
///
/// Bytes are kept in their escaped form. A start marker arriving while only
/// noise is buffered discards the noise and starts over; an unescaped end
/// marker completes the candidate.
#[derive(Debug, Default)]
pub struct FrameAccumulator {
    buffer: BytesMut,
    scanner: EscapeScanner,
}

impl FrameAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        FrameAccumulator {
            buffer: BytesMut::with_capacity(64),
            scanner: EscapeScanner::new(),
        }
    }

    /// Feed one byte. Returns the raw candidate frame once it completes.
    pub fn push_byte(&mut self, byte: u8) -> Option<Vec<u8>> {
        let scanned = self.scanner.feed(byte);
        if scanned == Scanned::Start && !self.buffer.is_empty() {
            log::debug!(
                "resync: discarding {} bytes before start marker: {}",
                self.buffer.len(),
                to_hex_string(&self.buffer)
            );
            self.buffer.clear();
        }
        self.buffer.extend_from_slice(&[byte]);

        if scanned == Scanned::End {
            return Some(self.buffer.split().to_vec());
        }
        if self.buffer.len() > MAX_RAW_FRAME_LEN {
            log::warn!(
                "dropping {} bytes without an end marker",
                self.buffer.len()
            );
            self.clear();
        }
        None
    }

    /// Feed a chunk, returning every frame it completes.
    pub fn push(&mut self, data: &[u8]) -> Vec<Vec<u8>> {
        data.iter().filter_map(|&b| self.push_byte(b)).collect()
    }

    /// Bytes accumulated toward the next frame.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Whether an escape prefix is waiting for its byte.
    pub fn escape_pending(&self) -> bool {
        self.scanner.escape_pending()
    }

    /// Take the pending bytes, leaving the accumulator empty.
    pub fn take_pending(&mut self) -> Vec<u8> {
        self.scanner.reset();
        self.buffer.split().to_vec()
    }

    /// Discard pending bytes.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.scanner.reset();
    }
}
