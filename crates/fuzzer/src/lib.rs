//! Smart card APDU command-space fuzzer
//!
//! Discovers which APDU commands a card accepts by walking the ISO/IEC 7816-4
//! header space in three tiers:
//!
//! 1. every class byte is probed once to learn which classes the card knows,
//! 2. every instruction of a known class is probed with zero parameters,
//! 3. instructions that reject their parameters get a full P1/P2 sweep.
//!
//! Each answer is classified by its status word against [`StatusTables`].
//! Only commands classified as [`Outcome::Success`] come out of
//! [`Fuzzer::fuzz`].
//!
//! # Examples
//!
//! ```no_run
//! use cardfuzz::{FuzzConfig, Fuzzer};
//! # fn run<C: cardfuzz_apdu_core::CardConnector>(mut connector: C) -> cardfuzz::Result<()> {
//! let mut fuzzer = Fuzzer::connect(&mut connector, FuzzConfig::default())?;
//! for command in fuzzer.fuzz() {
//!     println!("Found valid apdu command {command}");
//! }
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

pub mod classifier;
pub mod enumerate;
mod error;
mod fuzzer;
mod probe;

pub use classifier::{Outcome, StatusTables, classify, is_unsupported_class};
pub use enumerate::{ClassEnumerator, Enumerator, InstructionEnumerator, ParameterEnumerator};
pub use error::{FuzzError, ProbeError, Result};
pub use fuzzer::{DEFAULT_CONNECT_TIMEOUT, Fuzz, FuzzConfig, FuzzState, Fuzzer};
pub use probe::{ProbeStats, Prober};
