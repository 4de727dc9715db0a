//! Error types for PC/SC transport

use cardfuzz_apdu_core::TransportError;

/// PC/SC-specific errors
#[derive(Debug, thiserror::Error)]
pub enum PcscError {
    /// PC/SC error
    #[error("PC/SC error: {0}")]
    Pcsc(#[from] pcsc::Error),

    /// No readers available
    #[error("No readers available")]
    NoReadersAvailable,

    /// Reader not found
    #[error("Reader not found: {0}")]
    ReaderNotFound(String),

    /// No card present in reader
    #[error("No card present in reader: {0}")]
    NoCard(String),

    /// Card was removed
    #[error("Card was removed")]
    CardRemoved,

    /// No matching card was presented in time
    #[error("Timed out waiting for a card")]
    Timeout,
}

impl From<PcscError> for TransportError {
    fn from(error: PcscError) -> Self {
        match error {
            PcscError::Timeout | PcscError::Pcsc(pcsc::Error::Timeout) => Self::Timeout,
            PcscError::NoReadersAvailable
            | PcscError::ReaderNotFound(_)
            | PcscError::NoCard(_)
            | PcscError::Pcsc(pcsc::Error::NoSmartcard) => Self::Connection,
            PcscError::CardRemoved | PcscError::Pcsc(pcsc::Error::RemovedCard) => Self::Device,
            PcscError::Pcsc(e) => Self::other(format!("PC/SC error: {e}")),
        }
    }
}
