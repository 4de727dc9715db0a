//! APDU command definitions
//!
//! This module provides the header-only command type used when probing a card
//! according to ISO/IEC 7816-4.

use bytes::{BufMut, Bytes, BytesMut};
use derive_more::Display;

/// Length of an APDU command header (CLA, INS, P1, P2)
pub const HEADER_LEN: usize = 4;

/// Header-only APDU command (ISO/IEC 7816-4 case 1)
///
/// Every field is a single byte, so a command can never be built with an
/// out-of-range value. Commands are immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{cla:02X} {ins:02X} {p1:02X} {p2:02X}")]
pub struct Command {
    /// Command class byte
    cla: u8,
    /// Instruction byte
    ins: u8,
    /// Parameter 1
    p1: u8,
    /// Parameter 2
    p2: u8,
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self { cla, ins, p1, p2 }
    }

    /// Command class (CLA)
    pub const fn class(&self) -> u8 {
        self.cla
    }

    /// Instruction code (INS)
    pub const fn instruction(&self) -> u8 {
        self.ins
    }

    /// First parameter (P1)
    pub const fn p1(&self) -> u8 {
        self.p1
    }

    /// Second parameter (P2)
    pub const fn p2(&self) -> u8 {
        self.p2
    }

    /// Header bytes as an array
    pub const fn header(&self) -> [u8; HEADER_LEN] {
        [self.cla, self.ins, self.p1, self.p2]
    }

    /// Convert to raw APDU bytes
    pub fn to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(HEADER_LEN);
        buffer.put_slice(&self.header());
        buffer.freeze()
    }
}

impl From<[u8; HEADER_LEN]> for Command {
    fn from(header: [u8; HEADER_LEN]) -> Self {
        Self::new(header[0], header[1], header[2], header[3])
    }
}

impl From<Command> for [u8; HEADER_LEN] {
    fn from(command: Command) -> Self {
        command.header()
    }
}
