//! Device workflows built on a [`Session`].

use prolaser_protocol::{
    Command, ConfigStore, Dispatched, Mode, Outcome, Transport, PROLASER_III_IDENTITY,
    REGISTER_COUNT, REG_IDENTITY,
};
use tracing::{debug, info, warn};

use crate::error::{LinkError, LinkResult};
use crate::session::Session;

/// What [`Driver::program`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ProgramReport {
    /// Registers written.
    pub written: usize,
    /// Checksum value written to the last register.
    pub checksum: u8,
    /// Whether the device answered the final reset.
    pub reset_acknowledged: bool,
}

/// High-level operations on a ProLaser III.
pub struct Driver<T: Transport> {
    session: Session<T>,
}

fn unexpected(expected: impl Into<String>, got: &Dispatched) -> LinkError {
    LinkError::UnexpectedResponse {
        expected: expected.into(),
        got: got.outcome.to_string(),
    }
}

impl<T: Transport> Driver<T> {
    pub fn new(session: Session<T>) -> Self {
        Driver { session }
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<T> {
        &mut self.session
    }

    pub fn into_session(self) -> Session<T> {
        self.session
    }

    /// Enter remote control mode.
    pub fn enable_remote(&mut self) -> LinkResult<()> {
        self.session.send(&Command::EnableRemote)?;
        Ok(())
    }

    /// Leave remote control mode.
    pub fn exit_remote(&mut self) -> LinkResult<()> {
        self.session.send(&Command::ExitRemote)?;
        Ok(())
    }

    /// Check the identity register names a ProLaser III.
    pub fn identify(&mut self) -> LinkResult<u8> {
        let identity = self.read_register(REG_IDENTITY)?;
        if identity != PROLASER_III_IDENTITY {
            return Err(LinkError::WrongDevice {
                expected: PROLASER_III_IDENTITY,
                actual: identity,
            });
        }
        debug!(identity, "device identified");
        Ok(identity)
    }

    /// Read one register.
    pub fn read_register(&mut self, address: u8) -> LinkResult<u8> {
        let reply = self.session.send(&Command::ReadRegister { address })?;
        match reply.outcome {
            Outcome::RegisterValue {
                address: got, data, ..
            } if got == address => Ok(data),
            _ => Err(unexpected(format!("register 0x{:02x}", address), &reply)),
        }
    }

    /// Write one register and wait for the acknowledgement.
    pub fn write_register(&mut self, address: u8, data: u8) -> LinkResult<()> {
        let reply = self
            .session
            .send(&Command::WriteRegister { address, data })?;
        match reply.outcome {
            Outcome::RegisterWritten { address: got } if got == address => Ok(()),
            _ => Err(unexpected(format!("written 0x{:02x}", address), &reply)),
        }
    }

    /// Read every register into a fresh store.
    pub fn dump_registers(&mut self) -> LinkResult<ConfigStore> {
        let mut store = ConfigStore::unknown();
        for address in 0..REGISTER_COUNT as u8 {
            let value = self.read_register(address)?;
            store.set(address, value);
        }
        info!(
            consistent = store.is_consistent(),
            "read {} registers",
            REGISTER_COUNT
        );
        Ok(store)
    }

    /// Write a full register image, then reset the device.
    ///
    /// The checksum register is recomputed from the image before writing.
    /// Nothing is written to a device that fails [`Driver::identify`].
    pub fn program(&mut self, image: &ConfigStore) -> LinkResult<ProgramReport> {
        let mut image = image.clone();
        let checksum = image.seal();
        if image.known_count() != REGISTER_COUNT {
            return Err(LinkError::IncompleteImage {
                known: image.known_count() - 1,
            });
        }

        self.enable_remote()?;
        if let Err(e) = self.identify() {
            if let Err(exit) = self.exit_remote() {
                warn!(error = %exit, "could not leave remote mode");
            }
            return Err(e);
        }
        for (address, value) in (0u8..).zip(image.image()) {
            self.write_register(address, value)?;
        }
        self.exit_remote()?;
        let reset_acknowledged = self.session.exchange(&Command::Reset)?.is_some();

        let report = ProgramReport {
            written: REGISTER_COUNT,
            checksum,
            reset_acknowledged,
        };
        info!(checksum, reset_acknowledged, "programmed {} registers", report.written);
        Ok(report)
    }

    /// Select the operating mode.
    pub fn set_mode(&mut self, mode: Mode) -> LinkResult<Mode> {
        let reply = self.session.send(&Command::SetMode(mode))?;
        match reply.outcome {
            Outcome::Mode { mode: Some(m), .. } if m == mode => Ok(m),
            _ => Err(unexpected(format!("mode {}", mode), &reply)),
        }
    }

    /// Toggle automatic firing. Returns the laser state afterwards.
    ///
    /// The device only acknowledges turning the laser off, so a missing
    /// reply is not an error.
    pub fn toggle_laser(&mut self) -> LinkResult<bool> {
        self.session.exchange(&Command::ToggleLaser)?;
        Ok(self.session.state().device().laser_active)
    }
}
