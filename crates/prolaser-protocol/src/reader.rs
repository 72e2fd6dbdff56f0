//! Blocking frame reader.
//!
//! Pulls bytes from a [`Transport`] until one raw frame is assembled or the
//! empty-read budget runs out. Every byte goes through the same
//! [`FrameAccumulator`] the passive tap uses, so escape handling and
//! resynchronization behave identically on both paths.

use std::collections::VecDeque;
use std::io;

use crate::constants::FRAME_OVERHEAD;
use crate::error::ProtocolError;
use crate::frame::{unescape, FrameAccumulator};
use crate::hexdump::to_hex_string;
use crate::transport::Transport;

/// Default number of bytes requested per read call.
pub const DEFAULT_MAX_READ_CHUNK: usize = 32;

/// Tunables for a [`FrameReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Expected size of the next frame, unescaped. Diagnostic only.
    pub expected_length_hint: usize,
    /// Empty reads tolerated before giving up.
    pub max_timeout_attempts: u32,
    /// Upper bound on a single read request.
    pub max_read_chunk: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            expected_length_hint: 16,
            max_timeout_attempts: 5,
            max_read_chunk: DEFAULT_MAX_READ_CHUNK,
        }
    }
}

/// Result of one [`FrameReader::read_frame`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A raw frame, still in escaped wire form, ending on an end marker.
    Frame(Vec<u8>),
    /// The empty-read budget ran out. `partial` is commonly empty.
    TimedOut {
        /// Bytes accumulated before giving up.
        partial: Vec<u8>,
    },
}

impl ReadOutcome {
    /// The raw frame, if one completed.
    pub fn frame(&self) -> Option<&[u8]> {
        match self {
            ReadOutcome::Frame(raw) => Some(raw),
            ReadOutcome::TimedOut { .. } => None,
        }
    }

    /// Whether the read produced nothing at all.
    pub fn is_empty(&self) -> bool {
        matches!(self, ReadOutcome::TimedOut { partial } if partial.is_empty())
    }

    /// Convert a timeout into [`ProtocolError::TimeoutExhausted`].
    pub fn into_result(self, attempts: u32) -> Result<Vec<u8>, ProtocolError> {
        match self {
            ReadOutcome::Frame(raw) => Ok(raw),
            ReadOutcome::TimedOut { partial } => {
                Err(ProtocolError::TimeoutExhausted { attempts, partial })
            }
        }
    }
}

/// Assembles one frame at a time from a transport.
///
/// Bytes that arrive after a completed frame in the same read are kept and
/// consumed first by the next call.
#[derive(Debug)]
pub struct FrameReader {
    accumulator: FrameAccumulator,
    carry: VecDeque<u8>,
    max_read_chunk: usize,
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader {
    /// Create a reader with the default read chunk size.
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_MAX_READ_CHUNK)
    }

    /// Create a reader that requests at most `max_read_chunk` bytes per read.
    pub fn with_chunk_size(max_read_chunk: usize) -> Self {
        FrameReader {
            accumulator: FrameAccumulator::new(),
            carry: VecDeque::new(),
            max_read_chunk: max_read_chunk.max(1),
        }
    }

    /// Read using all settings from `config`.
    pub fn read_with<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        config: &ReaderConfig,
    ) -> io::Result<ReadOutcome> {
        self.max_read_chunk = config.max_read_chunk.max(1);
        self.read_frame(
            transport,
            config.expected_length_hint,
            config.max_timeout_attempts,
        )
    }

    /// Read until one frame completes or `max_timeout_attempts` reads come
    /// back empty.
    ///
    /// Empty reads never refill the budget. A timeout returns whatever was
    /// pending and leaves the reader empty.
    pub fn read_frame<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        expected_length_hint: usize,
        max_timeout_attempts: u32,
    ) -> io::Result<ReadOutcome> {
        if let Some(raw) = self.drain_carry() {
            self.check_hint(&raw, expected_length_hint);
            return Ok(ReadOutcome::Frame(raw));
        }

        let mut timeouts_left = max_timeout_attempts;
        while timeouts_left > 0 {
            let want = expected_length_hint
                .saturating_sub(self.accumulator.pending().len())
                .clamp(1, self.max_read_chunk);
            let chunk = match transport.read(want) {
                Ok(chunk) => chunk,
                Err(e) => {
                    self.reset();
                    return Err(e);
                }
            };
            if chunk.is_empty() {
                timeouts_left -= 1;
                continue;
            }

            let mut bytes = chunk.into_iter();
            while let Some(b) = bytes.next() {
                if let Some(raw) = self.accumulator.push_byte(b) {
                    self.carry.extend(bytes);
                    self.check_hint(&raw, expected_length_hint);
                    return Ok(ReadOutcome::Frame(raw));
                }
            }
        }

        let partial = self.accumulator.take_pending();
        log::debug!(
            "timed out after {} empty reads with {} bytes pending{}{}",
            max_timeout_attempts,
            partial.len(),
            if partial.is_empty() { "" } else { ": " },
            to_hex_string(&partial)
        );
        Ok(ReadOutcome::TimedOut { partial })
    }

    /// Bytes accumulated toward the next frame.
    pub fn pending(&self) -> &[u8] {
        self.accumulator.pending()
    }

    /// Drop pending and carried-over bytes.
    pub fn reset(&mut self) {
        self.accumulator.clear();
        self.carry.clear();
    }

    fn drain_carry(&mut self) -> Option<Vec<u8>> {
        while let Some(b) = self.carry.pop_front() {
            if let Some(raw) = self.accumulator.push_byte(b) {
                return Some(raw);
            }
        }
        None
    }

    fn check_hint(&self, raw: &[u8], expected_length_hint: usize) {
        let received = unescape(raw).0.len();
        if expected_length_hint != 0 && received != expected_length_hint {
            let claims = raw.get(1).map_or(0, |&len| len as usize + FRAME_OVERHEAD);
            log::debug!(
                "received {} bytes but expected {}, frame claims {}: {}",
                received,
                expected_length_hint,
                claims,
                to_hex_string(raw)
            );
        }
    }
}
