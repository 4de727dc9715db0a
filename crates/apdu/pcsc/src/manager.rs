//! Device manager for PC/SC operations

use std::ffi::CString;
use std::time::{Duration, Instant};

use pcsc::{Context, ReaderState, Scope, State};
use tracing::{debug, trace};

use crate::config::{ConnectStrategy, PcscConfig};
use crate::error::PcscError;
use crate::reader::PcscReader;
use crate::transport::PcscTransport;

/// Manager for PC/SC device operations
#[allow(missing_debug_implementations)]
pub struct PcscDeviceManager {
    /// PC/SC context
    context: Context,
}

impl PcscDeviceManager {
    /// Create a new PC/SC device manager
    pub fn new() -> Result<Self, PcscError> {
        let context = Context::establish(Scope::User)?;
        Ok(Self { context })
    }

    /// List all available card readers
    pub fn list_readers(&self) -> Result<Vec<PcscReader>, PcscError> {
        let readers = self.reader_names()?;
        if readers.is_empty() {
            return Err(PcscError::NoReadersAvailable);
        }

        let mut result = Vec::with_capacity(readers.len());

        for reader_name in readers {
            let mut reader_states = [ReaderState::new(reader_name.as_c_str(), State::UNAWARE)];

            match self.context.get_status_change(None, &mut reader_states) {
                Ok(()) => result.push(PcscReader::from_reader_state(&reader_states[0])),
                Err(_) => {
                    // If we can't get status, assume no card
                    result.push(PcscReader::new(
                        reader_name.to_string_lossy().into_owned(),
                        false,
                        None,
                    ));
                }
            }
        }

        Ok(result)
    }

    /// Open a connection to a specific reader
    pub fn open_reader(&self, reader_name: &str) -> Result<PcscTransport, PcscError> {
        self.open_reader_with_config(reader_name, PcscConfig::default())
    }

    /// Open a connection to a specific reader with custom configuration
    pub fn open_reader_with_config(
        &self,
        reader_name: &str,
        config: PcscConfig,
    ) -> Result<PcscTransport, PcscError> {
        // Clone the context to provide ownership to the transport
        let context = self.context.clone();
        PcscTransport::new(context, reader_name, config)
    }

    /// Block until a reader holds a card matching `strategy`
    ///
    /// Readers plugged in while waiting are picked up as well. Fails with
    /// [`PcscError::Timeout`] once `timeout` has elapsed.
    pub fn wait_for_card(
        &self,
        strategy: &ConnectStrategy,
        timeout: Duration,
    ) -> Result<PcscReader, PcscError> {
        let deadline = Instant::now() + timeout;
        let pnp = pcsc::PNP_NOTIFICATION();
        let mut reader_states = vec![ReaderState::new(pnp, State::UNAWARE)];

        loop {
            // Track readers that appeared or vanished since the last round
            let names = self.reader_names()?;
            reader_states
                .retain(|rs| rs.name() == pnp || names.iter().any(|n| n.as_c_str() == rs.name()));
            for name in names {
                if !reader_states.iter().any(|rs| rs.name() == name.as_c_str()) {
                    reader_states.push(ReaderState::new(name, State::UNAWARE));
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            trace!(readers = reader_states.len() - 1, ?remaining, "Waiting for card");

            match self
                .context
                .get_status_change(Some(remaining), &mut reader_states)
            {
                Ok(()) => {}
                Err(pcsc::Error::Timeout) => return Err(PcscError::Timeout),
                Err(e) => return Err(e.into()),
            }

            for rs in reader_states.iter().filter(|rs| rs.name() != pnp) {
                let reader = PcscReader::from_reader_state(rs);
                if strategy.matches(&reader) {
                    debug!(reader = reader.name(), "Card presented");
                    return Ok(reader);
                }
            }

            if remaining.is_zero() {
                return Err(PcscError::Timeout);
            }

            for rs in &mut reader_states {
                rs.sync_current_state();
            }
        }
    }

    fn reader_names(&self) -> Result<Vec<CString>, PcscError> {
        match self.context.list_readers_owned() {
            Ok(names) => Ok(names),
            Err(pcsc::Error::NoReadersAvailable) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}
