//! Status word classification
//!
//! Every probe ends with the card's status word. The tables below decide
//! whether that status word means the command exists ([`Outcome::Success`]),
//! exists but wants other parameters ([`Outcome::ParamFailure`]) or is not
//! worth pursuing ([`Outcome::Failure`]). Class recognition uses its own
//! predicate, [`StatusTables::is_unsupported_class`].

use std::collections::BTreeSet;
use std::sync::LazyLock;

use cardfuzz_apdu_core::StatusWord;
use cardfuzz_apdu_core::response::status::common;
use derive_more::Display;

/// Instructions that are never sent: VERIFY (0x20) and CHANGE REFERENCE DATA (0x24).
///
/// Probing them burns PIN retry counters and can lock the card for good.
pub const BLACKLISTED_INSTRUCTIONS: [u8; 2] = [0x20, 0x24];

/// SW1 values that show the card understood the command
pub const SUCCESS_STATUS_BYTES: [u8; 5] = [
    common::SUCCESS.sw1,
    common::MORE_DATA.sw1,
    common::WRONG_LENGTH.sw1,
    common::WRONG_LE.sw1,
    0x6A, // wrong parameters family, minus the excluded pairs
];

/// Status words meaning the instruction exists but P1/P2 are wrong
pub const PARAM_FAILURE_PAIRS: [StatusWord; 1] = [common::INCORRECT_P1P2];

/// Status words that never count as success, whatever SW1 says
pub const HARD_FAILURE_PAIRS: [StatusWord; 1] = [common::FUNCTION_NOT_SUPPORTED];

/// Status word a card answers with when it does not know the class byte
pub const UNSUPPORTED_CLASS_MARKER: StatusWord = common::CLASS_NOT_SUPPORTED;

static DEFAULT_TABLES: LazyLock<StatusTables> = LazyLock::new(StatusTables::default);

/// Result of classifying one status word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Outcome {
    /// The card accepted the command
    #[display("success")]
    Success,
    /// The instruction is known but the parameters were rejected
    #[display("parameter failure")]
    ParamFailure,
    /// Anything else
    #[display("failure")]
    Failure,
}

impl Outcome {
    /// Whether this outcome is a confirmed discovery
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// The lookup tables driving classification
///
/// Tables are assembled before probing starts and handed to the prober by
/// value; there is no way to change them afterwards. Instructions can be
/// added to the blacklist while building, never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTables {
    blacklisted_instructions: BTreeSet<u8>,
    success_status_bytes: BTreeSet<u8>,
    param_failure_pairs: BTreeSet<StatusWord>,
    hard_failure_pairs: BTreeSet<StatusWord>,
    unsupported_class: StatusWord,
}

impl Default for StatusTables {
    fn default() -> Self {
        Self {
            blacklisted_instructions: BLACKLISTED_INSTRUCTIONS.into_iter().collect(),
            success_status_bytes: SUCCESS_STATUS_BYTES.into_iter().collect(),
            param_failure_pairs: PARAM_FAILURE_PAIRS.into_iter().collect(),
            hard_failure_pairs: HARD_FAILURE_PAIRS.into_iter().collect(),
            unsupported_class: UNSUPPORTED_CLASS_MARKER,
        }
    }
}

impl StatusTables {
    /// The ISO/IEC 7816-4 tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Never send `instruction` in addition to the built-in blacklist
    pub fn with_blacklisted_instruction(mut self, instruction: u8) -> Self {
        self.blacklisted_instructions.insert(instruction);
        self
    }

    /// Blacklist every instruction in `instructions`
    pub fn with_blacklisted_instructions(self, instructions: impl IntoIterator<Item = u8>) -> Self {
        instructions
            .into_iter()
            .fold(self, Self::with_blacklisted_instruction)
    }

    /// Classify a status word
    ///
    /// Rules are checked in order, first match wins:
    /// 1. SW1 is a success byte and the pair is neither a parameter nor a hard failure
    /// 2. the pair is a parameter failure
    /// 3. everything else fails
    pub fn classify(&self, status: StatusWord) -> Outcome {
        let param_failure = self.param_failure_pairs.contains(&status);

        if self.success_status_bytes.contains(&status.sw1)
            && !param_failure
            && !self.hard_failure_pairs.contains(&status)
        {
            Outcome::Success
        } else if param_failure {
            Outcome::ParamFailure
        } else {
            Outcome::Failure
        }
    }

    /// Whether the card rejected the class byte itself
    pub fn is_unsupported_class(&self, status: StatusWord) -> bool {
        status == self.unsupported_class
    }

    /// The status word used as the class-tier default when a probe fails
    pub const fn unsupported_class(&self) -> StatusWord {
        self.unsupported_class
    }

    /// Whether `instruction` must never be sent
    pub fn is_blacklisted(&self, instruction: u8) -> bool {
        self.blacklisted_instructions.contains(&instruction)
    }

    /// Blacklisted instructions in ascending order
    pub fn blacklisted_instructions(&self) -> impl Iterator<Item = u8> + '_ {
        self.blacklisted_instructions.iter().copied()
    }
}

/// Classify `(sw1, sw2)` against the default tables
pub fn classify(sw1: u8, sw2: u8) -> Outcome {
    DEFAULT_TABLES.classify(StatusWord::new(sw1, sw2))
}

/// Whether `(sw1, sw2)` is the default "class not supported" marker
pub fn is_unsupported_class(sw1: u8, sw2: u8) -> bool {
    DEFAULT_TABLES.is_unsupported_class(StatusWord::new(sw1, sw2))
}
