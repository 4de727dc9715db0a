//! PC/SC transport implementation

use std::{ffi::CString, fmt};

use bytes::Bytes;
use cardfuzz_apdu_core::prelude::*;
use pcsc::{Card, Context, Disposition, MAX_BUFFER_SIZE};
use tracing::debug;

use crate::{config::PcscConfig, error::PcscError};

/// Transport implementation using PC/SC
pub struct PcscTransport {
    /// PC/SC context
    context: Context,
    /// Card connection, if established
    card: Option<Card>,
    /// Reader name
    reader_name: String,
    /// Configuration
    config: PcscConfig,
}

impl fmt::Debug for PcscTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcscTransport")
            .field("reader_name", &self.reader_name)
            .field("has_card", &self.card.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl PcscTransport {
    /// Create a new PC/SC transport for the specified reader
    pub(crate) fn new(
        context: Context,
        reader_name: &str,
        config: PcscConfig,
    ) -> Result<Self, PcscError> {
        let mut transport = Self {
            context,
            card: None,
            reader_name: reader_name.to_string(),
            config,
        };

        // A missing card is reported through `has_card`, not as an error here
        if let Err(e) = transport.connect_card() {
            debug!(reader = reader_name, error = %e, "Opened reader without a card");
        }

        Ok(transport)
    }

    /// Try to connect to the card
    fn connect_card(&mut self) -> Result<(), PcscError> {
        if self.card.is_some() {
            return Ok(());
        }

        let reader_cstr = CString::new(self.reader_name.clone())
            .map_err(|_| PcscError::ReaderNotFound(self.reader_name.clone()))?;

        match self.context.connect(
            &reader_cstr,
            self.config.share_mode.into(),
            self.config.protocols,
        ) {
            Ok(card) => {
                self.card = Some(card);
                Ok(())
            }
            Err(pcsc::Error::NoSmartcard) => Err(PcscError::NoCard(self.reader_name.clone())),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the ATR of the current card
    pub fn atr(&self) -> Result<Vec<u8>, PcscError> {
        self.card.as_ref().map_or_else(
            || Err(PcscError::NoCard(self.reader_name.clone())),
            |card| {
                card.get_attribute_owned(pcsc::Attribute::AtrString)
                    .map_err(Into::into)
            },
        )
    }

    /// Get the reader name
    pub fn reader_name(&self) -> &str {
        &self.reader_name
    }

    /// Check if the transport is connected to a card
    pub const fn has_card(&self) -> bool {
        self.card.is_some()
    }

    /// Transmit a command to the card
    ///
    /// A card reset is answered with at most one reconnect and resend per call.
    fn transmit_command(&mut self, command: &[u8]) -> Result<Bytes, PcscError> {
        let mut reconnected = false;

        loop {
            self.connect_card()?;

            let card = self
                .card
                .as_mut()
                .ok_or_else(|| PcscError::NoCard(self.reader_name.clone()))?;

            let mut response_buffer = [0u8; MAX_BUFFER_SIZE];

            let e = match card.transmit(command, &mut response_buffer) {
                Ok(response) => return Ok(Bytes::copy_from_slice(response)),
                Err(e) => e,
            };

            // If card was reset or removed, clear our reference
            if matches!(e, pcsc::Error::ResetCard | pcsc::Error::RemovedCard) {
                self.card = None;
            }

            if should_reconnect(&e, self.config.auto_reconnect, reconnected) {
                reconnected = true;
                debug!(reader = %self.reader_name, "Card reset, reconnecting");
                continue;
            }

            return Err(match e {
                pcsc::Error::RemovedCard => PcscError::CardRemoved,
                e => e.into(),
            });
        }
    }
}

/// Whether a failed transmit is worth one reconnect and resend
const fn should_reconnect(error: &pcsc::Error, auto_reconnect: bool, reconnected: bool) -> bool {
    auto_reconnect && !reconnected && matches!(error, pcsc::Error::ResetCard)
}

impl CardTransport for PcscTransport {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.transmit_command(command).map_err(TransportError::from)
    }

    fn is_connected(&self) -> bool {
        self.card.is_some()
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        if let Some(card) = self.card.take() {
            if let Err((_, e)) = card.disconnect(Disposition::ResetCard) {
                debug!(error = %e, "Failed to reset card on disconnect");
            }
        }

        self.connect_card().map_err(Into::into)
    }
}

impl Drop for PcscTransport {
    fn drop(&mut self) {
        if let Some(card) = self.card.take() {
            let _ = card.disconnect(Disposition::LeaveCard);
        }
    }
}
