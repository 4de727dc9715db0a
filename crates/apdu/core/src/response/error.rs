//! Error types specific to APDU responses

use thiserror::Error;

/// Response parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    /// Response too short to hold a status word
    #[error("Incomplete response: {0} bytes, expected at least 2")]
    Incomplete(usize),
}
