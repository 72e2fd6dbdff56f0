//! ProLaser III serial protocol
//!
//! This crate frames, validates and dispatches the messages a ProLaser III
//! laser speed gun exchanges with a host over its serial link, and mirrors
//! the device's configuration registers as that traffic is observed.
//!
//! # Protocol Overview
//!
//! Every message is wrapped as `0x02 LEN PAYLOAD CHK 0x03`. The first payload
//! byte is the command code. Literal `0x03`/`0x10` bytes inside the payload
//! and checksum are escaped with a `0x10` prefix.
//!
//! - **Outbound** (host → device): requests such as enable remote, set mode,
//!   read or write a register.
//! - **Inbound** (device → host): acknowledgements echoing the request,
//!   telemetry readings and init text.
//!
//! # Example
//!
//! ```rust,ignore
//! use prolaser_protocol::{Command, Direction, DeviceState, Dispatcher, FrameReader};
//!
//! let wire = Command::ReadRegister { address: 0x01 }.encode()?;
//! transport.write(&wire)?;
//!
//! let mut reader = FrameReader::new();
//! let mut state = DeviceState::default();
//! if let Some(raw) = reader.read_frame(&mut transport, 8, 5)?.frame() {
//!     let result = Dispatcher::default().process_raw(&mut state, raw, Direction::Inbound)?;
//! }
//! ```

mod commands;
mod constants;
mod dispatch;
mod error;
mod frame;
pub mod hexdump;
mod reader;
mod register_map;
mod registers;
mod state;
mod transport;

pub use commands::*;
pub use constants::*;
pub use dispatch::*;
pub use error::*;
pub use frame::*;
pub use reader::*;
pub use register_map::*;
pub use registers::*;
pub use state::*;
pub use transport::*;
