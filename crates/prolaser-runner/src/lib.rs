//! # prolaser-runner
//!
//! The `prolaser` command: configuration, logging setup and the
//! subcommands that drive a device or tap its serial lines.

pub mod cli;
pub mod config;
mod error;
pub mod image;
pub mod logging;
pub mod run;

pub use cli::{Cli, Commands, ConfigAction};
pub use config::{AppConfig, DEFAULT_CONFIG_PATH};
pub use error::RunnerError;
pub use image::RegisterImage;
pub use run::run;
