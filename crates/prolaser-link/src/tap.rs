//! Passive tap on a host/device serial pair.
//!
//! One worker thread per line: the host line carries outbound frames, the
//! device line inbound ones. Each worker owns its accumulator, so the two
//! directions never share partial-frame state; they meet only in the
//! [`SharedState`] and on the event channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use prolaser_protocol::{
    Direction, Dispatched, Dispatcher, FrameAccumulator, ProtocolError, Transport,
    DEFAULT_MAX_READ_CHUNK,
};
use tracing::{debug, info, warn};

use crate::error::{LinkError, LinkResult};
use crate::monitor::Monitor;
use crate::state::SharedState;

/// Tap settings.
#[derive(Debug, Clone)]
pub struct TapConfig {
    /// Label for the host line.
    pub host_port: String,
    /// Label for the device line.
    pub device_port: String,
    /// Bytes requested per read.
    pub read_chunk: usize,
    pub dispatcher: Dispatcher,
}

impl Default for TapConfig {
    fn default() -> Self {
        TapConfig {
            host_port: "host".to_string(),
            device_port: "device".to_string(),
            read_chunk: DEFAULT_MAX_READ_CHUNK,
            dispatcher: Dispatcher::default(),
        }
    }
}

/// Something a tap worker observed.
#[derive(Debug, Clone, PartialEq)]
pub enum TapEvent {
    /// A frame decoded and dispatched.
    Frame(Dispatched),
    /// A frame that was dropped as malformed.
    Rejected {
        direction: Direction,
        error: ProtocolError,
    },
    /// A worker stopped because its transport failed.
    Closed {
        direction: Direction,
        error: String,
    },
}

/// Handle to a running tap.
pub struct Tap {
    state: SharedState,
    stop: Arc<AtomicBool>,
    events: Receiver<TapEvent>,
    workers: Vec<JoinHandle<()>>,
}

impl Tap {
    /// Start watching `host` (outbound) and `device` (inbound).
    pub fn start<H, D>(host: H, device: D, state: SharedState, config: &TapConfig) -> LinkResult<Self>
    where
        H: Transport + Send + 'static,
        D: Transport + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, events) = crossbeam_channel::unbounded();

        let host_worker = Worker {
            monitor: Monitor::new(config.host_port.clone(), config.dispatcher, state.clone()),
            direction: Direction::Outbound,
            read_chunk: config.read_chunk.max(1),
            stop: Arc::clone(&stop),
            events: tx.clone(),
        };
        let device_worker = Worker {
            monitor: Monitor::new(config.device_port.clone(), config.dispatcher, state.clone()),
            direction: Direction::Inbound,
            read_chunk: config.read_chunk.max(1),
            stop: Arc::clone(&stop),
            events: tx,
        };

        let mut workers = Vec::with_capacity(2);
        workers.push(host_worker.spawn(host)?);
        match device_worker.spawn(device) {
            Ok(handle) => workers.push(handle),
            Err(e) => {
                stop.store(true, Ordering::Relaxed);
                return Err(e);
            }
        }
        info!(host = %config.host_port, device = %config.device_port, "tap started");

        Ok(Tap {
            state,
            stop,
            events,
            workers,
        })
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Flag that stops both workers when set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Channel of observed events.
    pub fn events(&self) -> &Receiver<TapEvent> {
        &self.events
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> LinkResult<Option<TapEvent>> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(LinkError::ChannelClosed),
        }
    }

    /// Whether both workers have exited.
    pub fn is_finished(&self) -> bool {
        self.workers.iter().all(JoinHandle::is_finished)
    }

    /// Stop the workers and wait for them to finish.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("tap worker panicked");
            }
        }
        info!("tap stopped");
    }
}

impl Drop for Tap {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

struct Worker {
    monitor: Monitor,
    direction: Direction,
    read_chunk: usize,
    stop: Arc<AtomicBool>,
    events: Sender<TapEvent>,
}

impl Worker {
    fn spawn<T: Transport + Send + 'static>(self, transport: T) -> LinkResult<JoinHandle<()>> {
        let name = format!("tap-{}", self.direction.label());
        Ok(thread::Builder::new()
            .name(name)
            .spawn(move || self.run(transport))?)
    }

    fn run<T: Transport>(self, mut transport: T) {
        let mut accumulator = FrameAccumulator::new();
        while !self.stop.load(Ordering::Relaxed) {
            let chunk = match transport.read(self.read_chunk) {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!(port = self.monitor.port(), direction = %self.direction, "read failed: {}", e);
                    let _ = self.events.send(TapEvent::Closed {
                        direction: self.direction,
                        error: e.to_string(),
                    });
                    return;
                }
            };
            for raw in accumulator.push(&chunk) {
                let event = match self.monitor.observe(&raw, self.direction) {
                    Ok(dispatched) => TapEvent::Frame(dispatched),
                    Err(error) => TapEvent::Rejected {
                        direction: self.direction,
                        error,
                    },
                };
                if self.events.send(event).is_err() {
                    debug!(port = self.monitor.port(), "tap receiver gone");
                    return;
                }
            }
        }
        debug!(
            port = self.monitor.port(),
            pending = accumulator.pending().len(),
            "tap worker stopping"
        );
    }
}
