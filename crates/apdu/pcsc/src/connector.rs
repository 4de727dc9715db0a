//! Card connector waiting on PC/SC readers

use std::fmt;
use std::time::Duration;

use cardfuzz_apdu_core::{CardConnector, TransportError};
use tracing::info;

use crate::config::{ConnectStrategy, PcscConfig};
use crate::error::PcscError;
use crate::manager::PcscDeviceManager;
use crate::transport::PcscTransport;

/// Connects to the first card presented that matches a [`ConnectStrategy`]
pub struct PcscConnector {
    manager: PcscDeviceManager,
    strategy: ConnectStrategy,
    config: PcscConfig,
}

impl fmt::Debug for PcscConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcscConnector")
            .field("strategy", &self.strategy)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PcscConnector {
    /// Create a new connector
    pub const fn new(
        manager: PcscDeviceManager,
        strategy: ConnectStrategy,
        config: PcscConfig,
    ) -> Self {
        Self {
            manager,
            strategy,
            config,
        }
    }

    /// The strategy used to pick a card
    pub const fn strategy(&self) -> &ConnectStrategy {
        &self.strategy
    }

    /// Wait for a card and open a transport to it
    pub fn connect_pcsc(&mut self, timeout: Duration) -> Result<PcscTransport, PcscError> {
        let reader = self.manager.wait_for_card(&self.strategy, timeout)?;
        info!("Using reader: {}", reader);

        let transport = self
            .manager
            .open_reader_with_config(reader.name(), self.config.clone())?;
        if !transport.has_card() {
            return Err(PcscError::NoCard(reader.name().to_string()));
        }

        Ok(transport)
    }
}

impl CardConnector for PcscConnector {
    type Transport = PcscTransport;

    fn connect(&mut self, timeout: Duration) -> Result<Self::Transport, TransportError> {
        self.connect_pcsc(timeout).map_err(Into::into)
    }
}
