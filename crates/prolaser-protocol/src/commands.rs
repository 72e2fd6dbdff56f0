//! Commands that can be sent to the laser.

use std::fmt;
use std::str::FromStr;

use crate::constants::*;
use crate::error::ProtocolError;
use crate::frame::Frame;

/// Laser operating mode selected with [`Command::SetMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Speed measurement.
    Speed,
    /// Real-time range.
    Rtr,
    /// Range measurement.
    Range,
}

impl Mode {
    /// Sub-code carried in `payload[1]`.
    pub fn code(self) -> u8 {
        match self {
            Mode::Speed => MODE_SPEED,
            Mode::Rtr => MODE_RTR,
            Mode::Range => MODE_RANGE,
        }
    }

    /// Look up a mode by sub-code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            MODE_SPEED => Some(Mode::Speed),
            MODE_RTR => Some(Mode::Rtr),
            MODE_RANGE => Some(Mode::Range),
            _ => None,
        }
    }

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Speed => "speed",
            Mode::Rtr => "rtr",
            Mode::Range => "range",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "speed" => Ok(Mode::Speed),
            "rtr" | "real-time-range" => Ok(Mode::Rtr),
            "range" => Ok(Mode::Range),
            _ => Err(ProtocolError::UnknownMode(s.to_string())),
        }
    }
}

/// Command code byte, known or opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCode {
    ExitRemote,
    ReadRam,
    WhoAreYou,
    EnableRemote,
    ToggleLaser,
    SetMode,
    ReadRegister,
    WriteRegister,
    InitText,
    Reset,
    Reading,
    InitMessage,
    /// A code with no known meaning. Still a valid frame.
    Unknown(u8),
}

impl CommandCode {
    /// All known codes.
    pub const KNOWN: &'static [CommandCode] = &[
        CommandCode::ExitRemote,
        CommandCode::ReadRam,
        CommandCode::WhoAreYou,
        CommandCode::EnableRemote,
        CommandCode::ToggleLaser,
        CommandCode::SetMode,
        CommandCode::ReadRegister,
        CommandCode::WriteRegister,
        CommandCode::InitText,
        CommandCode::Reset,
        CommandCode::Reading,
        CommandCode::InitMessage,
    ];

    /// Wire value.
    pub fn code(self) -> u8 {
        match self {
            CommandCode::ExitRemote => CMD_EXIT_REMOTE,
            CommandCode::ReadRam => CMD_READ_RAM,
            CommandCode::WhoAreYou => CMD_WHO_ARE_YOU,
            CommandCode::EnableRemote => CMD_ENABLE_REMOTE,
            CommandCode::ToggleLaser => CMD_TOGGLE_LASER,
            CommandCode::SetMode => CMD_SET_MODE,
            CommandCode::ReadRegister => CMD_READ_REGISTER,
            CommandCode::WriteRegister => CMD_WRITE_REGISTER,
            CommandCode::InitText => CMD_INIT_TEXT,
            CommandCode::Reset => CMD_RESET,
            CommandCode::Reading => CMD_READING,
            CommandCode::InitMessage => CMD_INIT_MESSAGE,
            CommandCode::Unknown(code) => code,
        }
    }

    /// Name used in logs, metric labels and the event log.
    pub fn name(self) -> &'static str {
        match self {
            CommandCode::ExitRemote => "exit_remote",
            CommandCode::ReadRam => "read_ram",
            CommandCode::WhoAreYou => "who_are_you",
            CommandCode::EnableRemote => "enable_remote",
            CommandCode::ToggleLaser => "toggle_laser",
            CommandCode::SetMode => "set_mode",
            CommandCode::ReadRegister => "read_register",
            CommandCode::WriteRegister => "write_register",
            CommandCode::InitText => "init_text",
            CommandCode::Reset => "reset",
            CommandCode::Reading => "reading",
            CommandCode::InitMessage => "init_message",
            CommandCode::Unknown(_) => "unknown",
        }
    }

    /// Whether this code is in the known set.
    pub fn is_known(self) -> bool {
        !matches!(self, CommandCode::Unknown(_))
    }
}

impl From<u8> for CommandCode {
    fn from(code: u8) -> Self {
        match code {
            CMD_EXIT_REMOTE => CommandCode::ExitRemote,
            CMD_READ_RAM => CommandCode::ReadRam,
            CMD_WHO_ARE_YOU => CommandCode::WhoAreYou,
            CMD_ENABLE_REMOTE => CommandCode::EnableRemote,
            CMD_TOGGLE_LASER => CommandCode::ToggleLaser,
            CMD_SET_MODE => CommandCode::SetMode,
            CMD_READ_REGISTER => CommandCode::ReadRegister,
            CMD_WRITE_REGISTER => CommandCode::WriteRegister,
            CMD_INIT_TEXT => CommandCode::InitText,
            CMD_RESET => CommandCode::Reset,
            CMD_READING => CommandCode::Reading,
            CMD_INIT_MESSAGE => CommandCode::InitMessage,
            other => CommandCode::Unknown(other),
        }
    }
}

impl From<CommandCode> for u8 {
    fn from(code: CommandCode) -> Self {
        code.code()
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandCode::Unknown(code) => write!(f, "unknown(0x{:02x})", code),
            known => f.write_str(known.name()),
        }
    }
}

impl FromStr for CommandCode {
    type Err = ProtocolError;

    /// Parse a command name (`"set_mode"`, `"set-mode"`) or a hex code (`"0x0a"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        if let Some(hex) = normalized.strip_prefix("0x") {
            let code = u8::from_str_radix(hex, 16)
                .map_err(|_| ProtocolError::UnknownCommand(0))?;
            return match CommandCode::from(code) {
                CommandCode::Unknown(c) => Err(ProtocolError::UnknownCommand(c)),
                known => Ok(known),
            };
        }
        CommandCode::KNOWN
            .iter()
            .copied()
            .find(|c| c.name() == normalized)
            .ok_or(ProtocolError::UnknownCommand(0))
    }
}

/// Commands a host sends to the laser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Leave remote control mode.
    ExitRemote,

    /// Read device RAM starting at a 16-bit address.
    ReadRam {
        /// Start address, sent big-endian.
        address: u16,
    },

    /// Ask the device to identify itself.
    WhoAreYou,

    /// Enter remote control mode.
    EnableRemote,

    /// Toggle automatic laser firing.
    ToggleLaser,

    /// Select the operating mode.
    SetMode(Mode),

    /// Read one configuration register.
    ReadRegister {
        /// Register address.
        address: u8,
    },

    /// Write one configuration register.
    WriteRegister {
        /// Register address.
        address: u8,
        /// New value.
        data: u8,
    },

    /// Reset the device.
    Reset,

    /// Arbitrary command-and-payload bytes.
    Raw(Vec<u8>),
}

impl Command {
    /// Command-and-payload bytes, before framing.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Command::ExitRemote => vec![CMD_EXIT_REMOTE],
            Command::ReadRam { address } => {
                let [hi, lo] = address.to_be_bytes();
                vec![CMD_READ_RAM, hi, lo]
            }
            Command::WhoAreYou => vec![CMD_WHO_ARE_YOU],
            Command::EnableRemote => vec![CMD_ENABLE_REMOTE],
            Command::ToggleLaser => vec![CMD_TOGGLE_LASER],
            Command::SetMode(mode) => vec![CMD_SET_MODE, mode.code()],
            Command::ReadRegister { address } => vec![CMD_READ_REGISTER, *address],
            Command::WriteRegister { address, data } => {
                vec![CMD_WRITE_REGISTER, WRITE_REQUEST, *address, *data]
            }
            Command::Reset => vec![CMD_RESET],
            Command::Raw(bytes) => bytes.clone(),
        }
    }

    /// Command code of this command.
    pub fn code(&self) -> CommandCode {
        match self {
            Command::Raw(bytes) => bytes
                .first()
                .map_or(CommandCode::Unknown(0), |&b| CommandCode::from(b)),
            other => CommandCode::from(other.payload()[0]),
        }
    }

    /// Size of the device's reply on the wire (unescaped), as observed.
    ///
    /// Used as the reader's length hint. `None` when the device is not known
    /// to answer.
    pub fn expected_response_len(&self) -> Option<usize> {
        match self {
            Command::ExitRemote | Command::EnableRemote | Command::ToggleLaser => {
                Some(REPLY_LEN_ACK)
            }
            Command::SetMode(_) => Some(REPLY_LEN_MODE),
            Command::ReadRegister { .. } | Command::WriteRegister { .. } => {
                Some(REPLY_LEN_REGISTER)
            }
            Command::Reset | Command::WhoAreYou => Some(REPLY_LEN_INIT),
            Command::ReadRam { .. } | Command::Raw(_) => None,
        }
    }

    /// Whether an inbound frame with `reply` code answers this command.
    ///
    /// Reset and who-are-you are answered with init messages; everything
    /// else echoes its own code.
    pub fn is_answered_by(&self, reply: CommandCode) -> bool {
        match self {
            Command::Reset | Command::WhoAreYou => {
                matches!(reply, CommandCode::InitText | CommandCode::InitMessage)
            }
            other => other.code() == reply,
        }
    }

    /// Build the frame for this command.
    pub fn frame(&self) -> Result<Frame, ProtocolError> {
        Frame::new(self.payload())
    }

    /// Encode straight to wire bytes.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        self.frame()?.encode()
    }
}
