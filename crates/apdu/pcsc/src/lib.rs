//! PC/SC transport implementation for APDU probing
//!
//! This crate provides an implementation of the `CardConnector` and
//! `CardTransport` traits from `cardfuzz-apdu-core` using the PC/SC API for
//! communication with smart cards.
//!
//! # Examples
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::time::Duration;
//!
//! use cardfuzz_apdu_core::prelude::*;
//! use cardfuzz_apdu_transport_pcsc::{ConnectStrategy, PcscConfig, PcscConnector, PcscDeviceManager};
//!
//! let manager = PcscDeviceManager::new()?;
//! let mut connector = PcscConnector::new(manager, ConnectStrategy::AnyCard, PcscConfig::default());
//!
//! // Wait up to 30 seconds for a card
//! let mut transport = connector.connect(Duration::from_secs(30))?;
//!
//! let response = transport.transmit_raw(&Command::new(0x00, 0xCA, 0x00, 0x00).to_bytes())?;
//! println!("Response: {}", hex::encode_upper(&response));
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(missing_docs)]

// Core modules
mod config;
mod connector;
mod error;
mod manager;
mod reader;
mod transport;
mod util;

// Public exports
pub use config::{ConnectStrategy, PcscConfig, ShareMode};
pub use connector::PcscConnector;
pub use error::PcscError;
pub use manager::PcscDeviceManager;
pub use reader::PcscReader;
pub use transport::PcscTransport;

// Re-export some pcsc types for convenience
pub use pcsc::{Protocol, Protocols};
