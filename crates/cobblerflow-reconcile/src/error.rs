//! Reconciliation error types

use crate::flusher::FlushAction;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single call against the Cobbler server
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Cobbler is unreachable: {0}")]
    Unavailable(String),

    #[error("Cobbler call timed out after {0:?}")]
    Timeout(Duration),

    #[error("`cobbler {command}` failed: {output}")]
    CommandFailed { command: String, output: String },
}

impl RemoteError {
    /// Raw output returned by the server (or the transport message)
    pub fn output(&self) -> String {
        match self {
            RemoteError::Unavailable(msg) => msg.clone(),
            RemoteError::Timeout(after) => format!("timed out after {:?}", after),
            RemoteError::CommandFailed { output, .. } => output.clone(),
        }
    }
}

/// Reconciliation errors
///
/// Every variant except `RemoteUnavailable` aborts only the resource being
/// reconciled; the rest of the batch continues.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Cobbler is unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Interface sync failed for system {system}: {cause}")]
    InterfaceSyncFailed {
        system: String,
        #[source]
        cause: RemoteError,
    },

    #[error("Call to cobbler system {action} failed for {system} with output: {output}")]
    AttributeFlushFailed {
        system: String,
        action: FlushAction,
        output: String,
    },

    #[error("Call to cobbler sync failed with output: {output}")]
    SyncFailed { output: String },

    #[error("Call to cobbler system remove failed for {system} with output: {output}")]
    RemoveFailed { system: String, output: String },

    #[error("Invalid declaration: {0}")]
    InvalidResource(#[from] cobblerflow_core::FlowError),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
