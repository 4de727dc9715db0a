//! Error types for the fuzzer

use std::time::Duration;

use cardfuzz_apdu_core::{ResponseError, TransportError};

/// Errors that end a fuzzing session before it starts
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FuzzError {
    /// No card was presented within the connection window
    #[error("No card presented within {0:?}")]
    ConnectionTimeout(Duration),

    /// Connecting to the card failed for another reason
    #[error("Failed to connect to card: {0}")]
    Connection(#[source] TransportError),
}

/// Errors raised by a single probe
///
/// A probe error never aborts enumeration; the probe counts as a failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The transport failed to exchange the command
    #[error("Protocol error: {0}")]
    Protocol(#[from] TransportError),

    /// The exchange completed but produced something unusable
    #[error("Unexpected response: {0}")]
    Unexpected(#[from] ResponseError),
}

/// Result type for fuzzer setup
pub type Result<T> = std::result::Result<T, FuzzError>;
