//! Host-side request/response session over one transport.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use prolaser_protocol::{
    Command, Direction, Dispatched, FrameReader, ReadOutcome, Transport, REPLY_LEN_READING,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{LinkError, LinkResult};
use crate::monitor::Monitor;
use crate::state::SharedState;

/// Empty reads tolerated while waiting for a reply.
pub const DEFAULT_RESPONSE_TIMEOUTS: u32 = 25;

/// Empty reads per listen cycle before the deadline is checked again.
pub const DEFAULT_LISTEN_TIMEOUTS: u32 = 5;

/// Unrelated or malformed frames skipped while waiting for one reply.
pub const MAX_UNRELATED_FRAMES: usize = 32;

/// Hint used when a command has no known reply size.
const DEFAULT_RESPONSE_HINT: usize = 16;

/// Counters from one [`Session::listen_until`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListenStats {
    /// Frames decoded and dispatched.
    pub frames: usize,
    /// Frames discarded as malformed.
    pub rejected: usize,
    /// Read cycles that produced nothing.
    pub timeouts: usize,
}

/// Drives one device: writes commands, reads and dispatches replies.
///
/// Every frame in either direction goes through the session's [`Monitor`],
/// so the shared state mirrors both what was asked and what was answered.
pub struct Session<T: Transport> {
    transport: T,
    reader: FrameReader,
    monitor: Monitor,
    response_timeouts: u32,
    listen_timeouts: u32,
}

impl<T: Transport> Session<T> {
    /// Session over `transport`, dispatching through `monitor`.
    pub fn new(transport: T, monitor: Monitor) -> Self {
        Session {
            transport,
            reader: FrameReader::new(),
            monitor,
            response_timeouts: DEFAULT_RESPONSE_TIMEOUTS,
            listen_timeouts: DEFAULT_LISTEN_TIMEOUTS,
        }
    }

    /// Set the empty-read budget for replies.
    pub fn with_response_timeouts(mut self, attempts: u32) -> Self {
        self.response_timeouts = attempts;
        self
    }

    /// Set the empty-read budget per listen cycle.
    pub fn with_listen_timeouts(mut self, attempts: u32) -> Self {
        self.listen_timeouts = attempts.max(1);
        self
    }

    pub fn state(&self) -> &SharedState {
        self.monitor.state()
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Encode and write `command` without waiting for a reply.
    ///
    /// The outbound frame is dispatched after a successful write. A frame
    /// that fails its encode self-check is never written.
    pub fn send_only(&mut self, command: &Command) -> LinkResult<Dispatched> {
        let wire = command.encode()?;
        self.transport.write(&wire)?;
        Ok(self.monitor.observe(&wire, Direction::Outbound)?)
    }

    /// Send `command` and wait for the frame that answers it.
    ///
    /// Frames that do not answer it are dispatched and skipped, malformed
    /// ones dropped; either kind counts toward [`MAX_UNRELATED_FRAMES`]. Returns `Ok(None)` when the read budget
    /// runs out first.
    pub fn exchange(&mut self, command: &Command) -> LinkResult<Option<Dispatched>> {
        self.send_only(command)?;
        let expected = command.code();
        let hint = command
            .expected_response_len()
            .unwrap_or(DEFAULT_RESPONSE_HINT);

        let mut skipped = 0;
        loop {
            let raw = match self
                .reader
                .read_frame(&mut self.transport, hint, self.response_timeouts)?
            {
                ReadOutcome::Frame(raw) => raw,
                ReadOutcome::TimedOut { partial } => {
                    self.monitor.record_timeout(partial.len());
                    debug!(port = self.monitor.port(), command = %expected, "no reply");
                    return Ok(None);
                }
            };

            let got = match self.monitor.observe(&raw, Direction::Inbound) {
                Ok(d) if command.is_answered_by(d.command) => return Ok(Some(d)),
                Ok(d) => d.command.to_string(),
                Err(e) => format!("malformed frame ({})", e),
            };

            skipped += 1;
            debug!(
                port = self.monitor.port(),
                expected = %expected,
                got = %got,
                "skipping frame"
            );
            if skipped >= MAX_UNRELATED_FRAMES {
                warn!(port = self.monitor.port(), expected = %expected, "gave up waiting for reply");
                return Err(LinkError::UnexpectedResponse {
                    expected: expected.to_string(),
                    got,
                });
            }
        }
    }

    /// Like [`Session::exchange`], but a missing reply is an error.
    pub fn send(&mut self, command: &Command) -> LinkResult<Dispatched> {
        self.exchange(command)?.ok_or(LinkError::NoResponse {
            command: command.code(),
        })
    }

    /// Read and dispatch frames until `deadline` passes or `cancel` is set.
    ///
    /// Both are checked only between read cycles, so a frame in progress
    /// always completes.
    pub fn listen_until(
        &mut self,
        deadline: Instant,
        cancel: &AtomicBool,
        mut on_event: impl FnMut(&Dispatched),
    ) -> LinkResult<ListenStats> {
        let mut stats = ListenStats::default();
        while Instant::now() < deadline && !cancel.load(Ordering::Relaxed) {
            match self
                .reader
                .read_frame(&mut self.transport, REPLY_LEN_READING, self.listen_timeouts)?
            {
                ReadOutcome::Frame(raw) => match self.monitor.observe(&raw, Direction::Inbound) {
                    Ok(dispatched) => {
                        stats.frames += 1;
                        on_event(&dispatched);
                    }
                    Err(_) => stats.rejected += 1,
                },
                ReadOutcome::TimedOut { partial } => {
                    stats.timeouts += 1;
                    if !partial.is_empty() {
                        self.monitor.record_timeout(partial.len());
                    }
                }
            }
        }
        info!(
            port = self.monitor.port(),
            frames = stats.frames,
            rejected = stats.rejected,
            "listen finished"
        );
        Ok(stats)
    }
}
