//! Failure taxonomy for backend calls
//!
//! These errors never cross the public API: `analyze`, `detect` and
//! `health_check` absorb them into safe defaults. They exist to label
//! the log events and failure counters emitted on the way down.

use std::time::Duration;

use thiserror::Error;

/// What went wrong talking to the SDI backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// DNS, connect, reset or any other transport-level failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The configured deadline elapsed before a response arrived.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The backend answered with a non-2xx status.
    #[error("backend returned {0}")]
    Status(reqwest::StatusCode),

    /// The response body was not the JSON we expected.
    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ClientError {
    /// Stable label for the failure counter.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Transport(_) => "transport",
            ClientError::Timeout(_) => "timeout",
            ClientError::Status(_) => "status",
            ClientError::Decode(_) => "decode",
        }
    }

    pub(crate) fn from_send(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(timeout)
        } else {
            ClientError::Transport(err)
        }
    }
}
