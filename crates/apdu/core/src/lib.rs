//! Core traits and types for APDU (Application Protocol Data Unit) operations
//!
//! This crate provides the foundational types and traits needed to probe a smart card
//! with APDU commands according to ISO/IEC 7816-4.
//!
//! ## Overview
//!
//! APDU (Application Protocol Data Unit) is the communication format used by smart cards.
//! This crate provides abstractions for:
//!
//! - Creating header-only APDU commands and parsing the responses to them
//! - Connecting to a card and exchanging raw bytes through a transport layer
//! - Status word interpretation and transport error handling
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

// Main modules
pub mod command;
pub mod response;
pub mod transport;

// Re-exports for common types
pub use command::Command;
pub use response::error::ResponseError;
pub use response::status::StatusWord;
pub use response::{Response, utils};
pub use transport::{CardConnector, CardTransport, TransportError};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        Bytes, BytesMut, Command, Response,
        response::error::ResponseError,
        response::status::StatusWord,
        transport::{CardConnector, CardTransport, TransportError},
    };
}
