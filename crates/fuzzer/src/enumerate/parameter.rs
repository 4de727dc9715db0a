use cardfuzz_apdu_core::{CardTransport, Command};
use tracing::info;

use super::Enumerator;
use crate::probe::Prober;

const PAIRS: u32 = 0x1_0000;

/// Sweeps all 65,536 (P1, P2) pairs for one class and instruction
///
/// P1 is the outer loop and P2 the inner one, both ascending. A parameter
/// failure here is a plain failure: there is no deeper tier to escalate to.
#[derive(Debug, Clone)]
pub struct ParameterEnumerator {
    class: u8,
    instruction: u8,
    next: u32,
}

impl ParameterEnumerator {
    /// Start a sweep at P1 = P2 = 0x00
    pub const fn new(class: u8, instruction: u8) -> Self {
        Self {
            class,
            instruction,
            next: 0,
        }
    }

    /// The class byte under test
    pub const fn class(&self) -> u8 {
        self.class
    }

    /// The instruction byte under test
    pub const fn instruction(&self) -> u8 {
        self.instruction
    }

    /// The (P1, P2) pair probed most recently
    pub const fn current(&self) -> Option<(u8, u8)> {
        match self.next {
            0 => None,
            n => Some((((n - 1) >> 8) as u8, (n - 1) as u8)),
        }
    }

    /// Whether every pair has been probed
    pub const fn is_exhausted(&self) -> bool {
        self.next >= PAIRS
    }
}

impl Enumerator for ParameterEnumerator {
    type Item = Command;

    fn next_with<T: CardTransport>(&mut self, prober: &mut Prober<T>) -> Option<Command> {
        if self.next == 0 {
            info!(
                cla = self.class,
                ins = self.instruction,
                "Sweeping all P1/P2 combinations"
            );
        }

        while !self.is_exhausted() {
            let (p1, p2) = ((self.next >> 8) as u8, self.next as u8);
            self.next += 1;

            let command = Command::new(self.class, self.instruction, p1, p2);
            // No deeper tier: a parameter failure here is a plain failure
            if prober.probe(&command).is_success() {
                return Some(command);
            }
        }
        None
    }
}
