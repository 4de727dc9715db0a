//! Scripted card doubles shared by the integration tests

#![allow(dead_code, unreachable_pub)]

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use cardfuzz_apdu_core::{CardConnector, CardTransport, Command, TransportError};

/// What a scripted card answers to one command
pub type Reply = Result<Vec<u8>, TransportError>;

/// Status-word-only reply
pub fn sw(sw1: u8, sw2: u8) -> Reply {
    Ok(vec![sw1, sw2])
}

/// Transport whose answers are computed from the command sent
pub struct ScriptedCard {
    script: Box<dyn FnMut(Command) -> Reply + Send>,
    sent: Vec<Command>,
}

impl fmt::Debug for ScriptedCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedCard")
            .field("sent", &self.sent.len())
            .finish_non_exhaustive()
    }
}

impl ScriptedCard {
    pub fn new(script: impl FnMut(Command) -> Reply + Send + 'static) -> Self {
        Self {
            script: Box::new(script),
            sent: Vec::new(),
        }
    }

    /// Every command the card received, in order
    pub fn sent(&self) -> &[Command] {
        &self.sent
    }
}

impl CardTransport for ScriptedCard {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        let header: [u8; 4] = command
            .try_into()
            .expect("fuzzer only sends header-only commands");
        let command = Command::from(header);
        self.sent.push(command);
        (self.script)(command).map(Bytes::from)
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Connector that hands out a prepared card, or fails
#[derive(Debug)]
pub struct MockConnector {
    card: Option<ScriptedCard>,
    error: TransportError,
    pub requested_timeout: Option<Duration>,
}

impl MockConnector {
    /// Connects to `card` immediately
    pub fn with_card(card: ScriptedCard) -> Self {
        Self {
            card: Some(card),
            error: TransportError::Connection,
            requested_timeout: None,
        }
    }

    /// Never sees a card
    pub fn failing(error: TransportError) -> Self {
        Self {
            card: None,
            error,
            requested_timeout: None,
        }
    }
}

impl CardConnector for MockConnector {
    type Transport = ScriptedCard;

    fn connect(&mut self, timeout: Duration) -> Result<ScriptedCard, TransportError> {
        self.requested_timeout = Some(timeout);
        self.card.take().ok_or_else(|| self.error.clone())
    }
}
