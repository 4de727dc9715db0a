//! Command implementations for the cardfuzz CLI

mod fuzz;
mod list;

pub(crate) use fuzz::{FuzzOptions, fuzz_command};
pub(crate) use list::list_command;
