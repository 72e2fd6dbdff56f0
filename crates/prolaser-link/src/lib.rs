//! # prolaser-link
//!
//! Host-side runtime for talking to, or listening in on, a ProLaser III.
//!
//! ## Features
//!
//! - **Transports**: serial ports via `serialport`, plus a scripted in-memory
//!   transport for tests and offline runs
//! - **Session**: request/response exchanges and deadline-bounded listening
//! - **Tap**: passive monitoring of a host/device line pair on two threads
//! - **Driver**: identify, dump, program, mode and fire workflows
//! - **Status**: shared device state, a bounded event log and JSON snapshots

mod driver;
mod error;
mod event_log;
mod monitor;
mod session;
mod state;
mod status;
mod tap;
mod transport;

pub use driver::{Driver, ProgramReport};
pub use error::{LinkError, LinkResult};
pub use event_log::{EventLog, EventRecord, DEFAULT_EVENT_LOG_CAPACITY};
pub use monitor::Monitor;
pub use session::{
    ListenStats, Session, DEFAULT_LISTEN_TIMEOUTS, DEFAULT_RESPONSE_TIMEOUTS, MAX_UNRELATED_FRAMES,
};
pub use state::SharedState;
pub use status::DeviceStatus;
pub use tap::{Tap, TapConfig, TapEvent};
pub use transport::{
    list_ports, ScriptedTransport, SerialConfig, SerialTransport, DEFAULT_BAUD_RATE,
    DEFAULT_READ_TIMEOUT,
};
