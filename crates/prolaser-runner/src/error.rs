//! Runner errors.

use std::path::PathBuf;

use prolaser_link::LinkError;
use prolaser_protocol::ProtocolError;
use thiserror::Error;

/// Errors surfaced by the `prolaser` command.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read config {path}: {source}")]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid register image hex: {0}")]
    ImageHex(#[from] hex::FromHexError),

    #[error("invalid hex bytes {input:?}: {source}")]
    InvalidHex {
        input: String,
        source: hex::FromHexError,
    },

    /// A command needs a serial port and none was configured.
    #[error("no {0} configured; pass it on the command line or set it in the config file")]
    MissingPort(&'static str),

    #[error("{0} already exists; pass --force to overwrite")]
    AlreadyExists(PathBuf),

    #[error("could not install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("metrics exporter: {0}")]
    Metrics(String),
}
