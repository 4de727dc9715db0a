//! Composition of the three tiers into one stream of discovered commands

use std::fmt;
use std::iter::FusedIterator;
use std::time::Duration;

use cardfuzz_apdu_core::{CardConnector, CardTransport, Command, TransportError};
use tracing::{info, instrument};

use crate::classifier::StatusTables;
use crate::enumerate::{ClassEnumerator, Enumerator, InstructionEnumerator};
use crate::error::{FuzzError, Result};
use crate::probe::{ProbeStats, Prober};

/// Default time to wait for a card before giving up
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings fixed for the lifetime of a fuzzer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzConfig {
    /// How long to wait for a card to be presented
    pub connect_timeout: Duration,
    /// Classification and blacklist tables
    pub tables: StatusTables,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            tables: StatusTables::default(),
        }
    }
}

impl FuzzConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection timeout
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the status tables
    pub fn with_tables(mut self, tables: StatusTables) -> Self {
        self.tables = tables;
        self
    }
}

/// Where a fuzzing run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuzzState {
    /// Card connected, nothing probed yet
    Connected,
    /// Probing class bytes
    ScanningClass(u8),
    /// Sweeping instructions of a recognized class
    ScanningInstruction(u8, u8),
    /// Sweeping P1/P2 of an instruction that rejected its parameters
    ScanningParams(u8, u8),
    /// Every class has been swept
    Done,
}

/// Smart card command-space fuzzer
#[derive(Debug)]
pub struct Fuzzer<T> {
    prober: Prober<T>,
}

impl<T: CardTransport> Fuzzer<T> {
    /// Create a fuzzer over an already connected transport
    pub fn new(transport: T, tables: StatusTables) -> Self {
        Self {
            prober: Prober::new(transport, tables),
        }
    }

    /// Wait for a card through `connector` and build a fuzzer around it
    ///
    /// Fails with [`FuzzError::ConnectionTimeout`] if no card shows up within
    /// the configured window. Nothing is sent to any card in that case.
    #[instrument(level = "debug", skip_all, fields(timeout = ?config.connect_timeout))]
    pub fn connect<C>(connector: &mut C, config: FuzzConfig) -> Result<Self>
    where
        C: CardConnector<Transport = T>,
    {
        info!("Waiting for a card");
        let transport = connector
            .connect(config.connect_timeout)
            .map_err(|e| match e {
                TransportError::Timeout => FuzzError::ConnectionTimeout(config.connect_timeout),
                other => FuzzError::Connection(other),
            })?;
        info!("Card connected");

        Ok(Self::new(transport, config.tables))
    }

    /// Lazily enumerate every command the card accepts
    ///
    /// Commands come out in ascending (CLA, INS, P1, P2) order. Each call
    /// starts a fresh pass from class 0x00.
    pub fn fuzz(&mut self) -> Fuzz<'_, T> {
        Fuzz {
            prober: &mut self.prober,
            classes: ClassEnumerator::new(),
            instructions: None,
            done: false,
        }
    }

    /// The prober driving this fuzzer
    pub const fn prober(&self) -> &Prober<T> {
        &self.prober
    }

    /// Counters so far
    pub const fn stats(&self) -> ProbeStats {
        self.prober.stats()
    }

    /// Give back the underlying transport
    pub fn into_transport(self) -> T {
        self.prober.into_transport()
    }
}

/// Iterator returned by [`Fuzzer::fuzz`]
pub struct Fuzz<'a, T> {
    prober: &'a mut Prober<T>,
    classes: ClassEnumerator,
    instructions: Option<InstructionEnumerator>,
    done: bool,
}

impl<T> fmt::Debug for Fuzz<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fuzz")
            .field("classes", &self.classes)
            .field("instructions", &self.instructions)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<T> Fuzz<'_, T> {
    /// Current position in the command space
    pub fn state(&self) -> FuzzState {
        if self.done {
            return FuzzState::Done;
        }

        match &self.instructions {
            Some(instructions) => match instructions.parameter_sweep() {
                Some(params) => FuzzState::ScanningParams(params.class(), params.instruction()),
                None => FuzzState::ScanningInstruction(
                    instructions.class(),
                    instructions.current().unwrap_or_default(),
                ),
            },
            None => self
                .classes
                .current()
                .map_or(FuzzState::Connected, FuzzState::ScanningClass),
        }
    }
}

impl<T: CardTransport> Iterator for Fuzz<'_, T> {
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        if self.done {
            return None;
        }

        loop {
            if let Some(instructions) = &mut self.instructions {
                if let Some(command) = instructions.next_with(self.prober) {
                    return Some(command);
                }
                info!(cla = instructions.class(), "Instruction sweep finished");
                self.instructions = None;
            }

            match self.classes.next_with(self.prober) {
                Some(class) => self.instructions = Some(InstructionEnumerator::new(class)),
                None => {
                    self.done = true;
                    info!(stats = %self.prober.stats(), "Class space exhausted");
                    return None;
                }
            }
        }
    }
}

impl<T: CardTransport> FusedIterator for Fuzz<'_, T> {}
