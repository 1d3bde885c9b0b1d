//! Dispatch and connection errors.

use std::time::Duration;

use thiserror::Error;
use tonic::{Code, Status};

/// Shown when the agent's endpoint cannot be reached.
pub const UNAVAILABLE_MESSAGE: &str =
    "Couldn't connect to JP4Agent. Please ensure JP4Agent is up and running.";

/// Why a single dispatch did not produce a reply.
///
/// The `Display` form is the exact text the shell shows the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("{}", UNAVAILABLE_MESSAGE)]
    Unavailable,
    /// The agent answered with a non-OK status; carries its details verbatim.
    #[error("{0}")]
    Remote(String),
    #[error("JP4Agent did not respond within {} ms.", .0.as_millis())]
    Timeout(Duration),
    #[error("Command cancelled.")]
    Cancelled,
}

impl DispatchError {
    /// Short machine-readable label, used in the audit log.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Unavailable => "unavailable",
            DispatchError::Remote(_) => "remote_error",
            DispatchError::Timeout(_) => "timeout",
            DispatchError::Cancelled => "cancelled",
        }
    }
}

impl From<Status> for DispatchError {
    fn from(status: Status) -> Self {
        match status.code() {
            Code::Unavailable => DispatchError::Unavailable,
            _ => DispatchError::Remote(status.message().to_string()),
        }
    }
}

/// Failure to set up the channel to the agent.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid agent address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },
    #[error("couldn't connect to JP4Agent at {address}: {source}")]
    Unreachable {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },
}
