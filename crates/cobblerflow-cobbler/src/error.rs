//! Cobbler transport error types

use cobblerflow_reconcile::RemoteError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CobblerError {
    #[error("cobbler not found at {0}. Install cobbler or set COBBLER_BIN")]
    CobblerNotFound(PathBuf),

    #[error("`cobbler {command}` failed: {output}")]
    CommandFailed { command: String, output: String },

    #[error("Cobbler call timed out after {0:?}")]
    Timeout(Duration),

    #[error("XML-RPC fault {code}: {message}")]
    Fault { code: i64, message: String },

    #[error("Malformed XML-RPC response: {0}")]
    MalformedResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CobblerError>;

impl From<CobblerError> for RemoteError {
    fn from(err: CobblerError) -> Self {
        match err {
            CobblerError::CommandFailed { command, output } => {
                RemoteError::CommandFailed { command, output }
            }
            CobblerError::Timeout(after) => RemoteError::Timeout(after),
            other => RemoteError::Unavailable(other.to_string()),
        }
    }
}
