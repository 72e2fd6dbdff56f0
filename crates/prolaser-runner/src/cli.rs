//! Command line interface.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use prolaser_protocol::Mode;

use crate::config::{AppConfig, DEFAULT_CONFIG_PATH};
use crate::error::RunnerError;

/// Drive and monitor a ProLaser III over its serial link.
#[derive(Parser, Debug)]
#[command(name = "prolaser")]
#[command(version)]
pub struct Cli {
    /// Config file (JSON). Missing file means defaults.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Serial port of the device
    #[arg(short, long, global = true)]
    pub port: Option<String>,

    /// Line speed
    #[arg(long, global = true)]
    pub baud: Option<u32>,

    /// Empty reads tolerated while waiting for a reply
    #[arg(long, global = true)]
    pub timeouts: Option<u32>,

    /// Protocol trace verbosity (0-5); above 4 logs every acknowledgement
    #[arg(long, global = true)]
    pub verbosity: Option<u8>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less log output (-q warn, -qq error)
    #[arg(short, long, action = ArgAction::Count, global = true, conflicts_with = "verbose")]
    pub quiet: u8,

    /// Serve Prometheus metrics on this address
    #[cfg(feature = "prometheus")]
    #[arg(long, global = true)]
    pub metrics_addr: Option<std::net::SocketAddr>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Print readings and messages from the device
    Listen {
        /// How long to listen
        #[arg(long, default_value_t = 10)]
        seconds: u64,
        /// Select this mode first
        #[arg(long)]
        mode: Option<Mode>,
    },

    /// Watch traffic between a host and the device on two serial lines
    Tap {
        /// Line carrying host-to-device traffic
        #[arg(long)]
        host: Option<String>,
        /// Line carrying device-to-host traffic
        #[arg(long)]
        device: Option<String>,
        /// Stop after this long (default: until Ctrl-C)
        #[arg(long)]
        seconds: Option<u64>,
    },

    /// Read every configuration register
    Dump {
        /// Print a JSON register image instead of a table
        #[arg(long)]
        json: bool,
        /// Write the JSON image to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a register image produced by `dump --json`, then reset
    Program {
        /// Register image file
        image: PathBuf,
    },

    /// Select speed, range or rtr mode
    Mode {
        mode: Mode,
    },

    /// Toggle automatic laser firing
    Fire,

    /// Frame payload bytes for the wire
    Encode {
        /// Payload bytes in hex, command byte first
        #[arg(required = true)]
        bytes: Vec<String>,
    },

    /// Validate and dispatch one wire frame
    Decode {
        /// Frame bytes in hex
        #[arg(required = true)]
        bytes: Vec<String>,
        /// Treat the frame as host-to-device
        #[arg(long)]
        outbound: bool,
    },

    /// List serial ports
    Ports,

    /// Show or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Override `config` with anything given on the command line.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(port) = &self.port {
            config.port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            config.baud_rate = baud;
        }
        if let Some(timeouts) = self.timeouts {
            config.response_timeouts = timeouts;
        }
        if let Some(verbosity) = self.verbosity {
            config.verbosity = verbosity;
        }
        if let Commands::Tap { host, device, .. } = &self.command {
            if let Some(host) = host {
                config.tap_host_port = Some(host.clone());
            }
            if let Some(device) = device {
                config.tap_device_port = Some(device.clone());
            }
        }
    }

    /// Defaults, then the config file, then the command line.
    pub fn effective_config(&self) -> Result<AppConfig, RunnerError> {
        let mut config = AppConfig::load(&self.config)?;
        self.apply_to(&mut config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_listen_with_mode() {
        let cli = Cli::try_parse_from(["prolaser", "-p", "COM3", "listen", "--mode", "range"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Listen {
                seconds: 10,
                mode: Some(Mode::Range)
            }
        );
        assert_eq!(cli.port.as_deref(), Some("COM3"));
    }

    #[test]
    fn test_bad_mode_rejected() {
        assert!(Cli::try_parse_from(["prolaser", "mode", "warp"]).is_err());
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["prolaser", "-v", "-q", "ports"]).is_err());
        let cli = Cli::try_parse_from(["prolaser", "-vv", "ports"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_command_line_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prolaser.json");
        let file = AppConfig {
            port: Some("/dev/ttyUSB0".to_string()),
            baud_rate: 9600,
            verbosity: 2,
            ..AppConfig::default()
        };
        file.save(&path).unwrap();

        let cli = Cli::try_parse_from([
            "prolaser",
            "--config",
            path.to_str().unwrap(),
            "--baud",
            "19200",
            "tap",
            "--host",
            "/dev/ttyUSB1",
        ])
        .unwrap();
        let config = cli.effective_config().unwrap();
        assert_eq!(config.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(config.baud_rate, 19_200);
        assert_eq!(config.verbosity, 2);
        assert_eq!(config.tap_host_port.as_deref(), Some("/dev/ttyUSB1"));
        assert_eq!(config.tap_device_port, None);
    }
}
