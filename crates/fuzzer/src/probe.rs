//! The single transmit-and-classify step every enumerator builds on

use std::fmt;

use cardfuzz_apdu_core::prelude::*;
use tracing::{info, warn};

use crate::classifier::{Outcome, StatusTables};
use crate::error::ProbeError;

/// Counters collected while probing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeStats {
    /// Commands handed to the transport
    pub commands_sent: u64,
    /// Probes that ended in a transport or response error
    pub errors: u64,
    /// Class bytes the card recognized
    pub classes_recognized: u64,
    /// Commands classified as success
    pub successes: u64,
    /// Instructions escalated into a parameter sweep
    pub escalations: u64,
}

impl fmt::Display for ProbeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} commands sent, {} classes recognized, {} successes, {} parameter sweeps, {} errors",
            self.commands_sent, self.classes_recognized, self.successes, self.escalations, self.errors
        )
    }
}

/// Owns the card session and runs one probe at a time
#[derive(Debug)]
pub struct Prober<T> {
    transport: T,
    tables: StatusTables,
    stats: ProbeStats,
}

impl<T: CardTransport> Prober<T> {
    /// Create a prober over a connected transport
    pub fn new(transport: T, tables: StatusTables) -> Self {
        Self {
            transport,
            tables,
            stats: ProbeStats::default(),
        }
    }

    /// Send `command` and parse the card's answer
    pub fn transmit(&mut self, command: &Command) -> Result<Response, ProbeError> {
        info!(
            cla = command.class(),
            ins = command.instruction(),
            p1 = command.p1(),
            p2 = command.p2(),
            "Send: {command}"
        );
        self.stats.commands_sent += 1;

        let raw = self.transport.transmit_raw(&command.to_bytes())?;
        let response = Response::from_bytes(&raw)?;

        info!(
            sw1 = response.sw1(),
            sw2 = response.sw2(),
            data = %hex::encode_upper(response.payload()),
            "Returned: {} ({})",
            response.status(),
            response.status().description()
        );
        Ok(response)
    }

    /// Send `command` and classify the answer
    ///
    /// Probe errors are logged and count as [`Outcome::Failure`].
    pub fn probe(&mut self, command: &Command) -> Outcome {
        let outcome = match self.transmit(command) {
            Ok(response) => self.tables.classify(response.status()),
            Err(e) => {
                self.record_error(command, &e);
                Outcome::Failure
            }
        };

        match outcome {
            Outcome::Success => {
                self.stats.successes += 1;
                info!(%command, "Apdu command success");
            }
            Outcome::ParamFailure => info!(%command, "Parameters rejected"),
            Outcome::Failure => info!(%command, "Apdu command failed"),
        }
        outcome
    }

    /// Whether the card recognizes `class` at all
    ///
    /// A probe error leaves the class at its unsupported default.
    pub fn probe_class(&mut self, class: u8) -> bool {
        let command = Command::new(class, 0x00, 0x00, 0x00);

        let status = match self.transmit(&command) {
            Ok(response) => response.status(),
            Err(e) => {
                self.record_error(&command, &e);
                self.tables.unsupported_class()
            }
        };

        let recognized = !self.tables.is_unsupported_class(status);
        if recognized {
            self.stats.classes_recognized += 1;
            info!(cla = class, %status, "Class recognized");
        }
        recognized
    }

    pub(crate) fn record_escalation(&mut self, command: &Command) {
        self.stats.escalations += 1;
        info!(%command, "Got partial success, bruteforce all the params");
    }

    fn record_error(&mut self, command: &Command, error: &ProbeError) {
        self.stats.errors += 1;
        match error {
            ProbeError::Protocol(e) => info!(%command, error = %e, "Got protocol error"),
            ProbeError::Unexpected(e) => {
                warn!(%command, error = %e, "Something went wrong while probing")
            }
        }
    }

    /// Tables this prober classifies with
    pub const fn tables(&self) -> &StatusTables {
        &self.tables
    }

    /// Counters so far
    pub const fn stats(&self) -> ProbeStats {
        self.stats
    }

    /// Borrow the underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Give back the underlying transport
    pub fn into_transport(self) -> T {
        self.transport
    }
}
