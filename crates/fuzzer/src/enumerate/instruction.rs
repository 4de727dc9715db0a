use cardfuzz_apdu_core::{CardTransport, Command};
use tracing::debug;

use super::{Enumerator, ParameterEnumerator};
use crate::classifier::Outcome;
use crate::probe::Prober;

/// Walks instruction bytes 0x00..=0xFF for one class
///
/// Each instruction is probed with `CLA INS 00 00`; blacklisted instructions
/// are skipped without being sent. A success yields the zero-parameter
/// command. A parameter failure hands over to a [`ParameterEnumerator`] whose
/// discoveries are yielded in place of the zero-parameter form.
#[derive(Debug, Clone)]
pub struct InstructionEnumerator {
    class: u8,
    next: u16,
    params: Option<ParameterEnumerator>,
}

impl InstructionEnumerator {
    /// Start a sweep of `class` at instruction 0x00
    pub const fn new(class: u8) -> Self {
        Self {
            class,
            next: 0,
            params: None,
        }
    }

    /// The class byte under test
    pub const fn class(&self) -> u8 {
        self.class
    }

    /// The instruction byte probed most recently
    pub const fn current(&self) -> Option<u8> {
        match self.next {
            0 => None,
            n => Some((n - 1) as u8),
        }
    }

    /// The parameter sweep in progress, if any
    pub const fn parameter_sweep(&self) -> Option<&ParameterEnumerator> {
        self.params.as_ref()
    }

    /// Whether every instruction (and any pending sweep) is done
    pub const fn is_exhausted(&self) -> bool {
        self.next > 0xFF && self.params.is_none()
    }
}

impl Enumerator for InstructionEnumerator {
    type Item = Command;

    fn next_with<T: CardTransport>(&mut self, prober: &mut Prober<T>) -> Option<Command> {
        loop {
            if let Some(params) = &mut self.params {
                if let Some(command) = params.next_with(prober) {
                    return Some(command);
                }
                self.params = None;
            }

            if self.next > 0xFF {
                return None;
            }
            let instruction = self.next as u8;
            self.next += 1;

            if prober.tables().is_blacklisted(instruction) {
                debug!(cla = self.class, ins = instruction, "Skipping blacklisted instruction");
                continue;
            }

            let command = Command::new(self.class, instruction, 0x00, 0x00);
            match prober.probe(&command) {
                Outcome::Success => return Some(command),
                Outcome::ParamFailure => {
                    prober.record_escalation(&command);
                    self.params = Some(ParameterEnumerator::new(self.class, instruction));
                }
                Outcome::Failure => {}
            }
        }
    }
}
