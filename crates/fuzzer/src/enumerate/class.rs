use cardfuzz_apdu_core::CardTransport;

use super::Enumerator;
use crate::probe::Prober;

/// Walks class bytes 0x00..=0xFF and yields the ones the card recognizes
///
/// Each class is probed with `CLA 00 00 00`. Only the "class not supported"
/// marker rejects a class; any other answer means the card knows it.
#[derive(Debug, Clone, Default)]
pub struct ClassEnumerator {
    next: u16,
}

impl ClassEnumerator {
    /// Start a fresh pass at class 0x00
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// The class byte probed most recently
    pub const fn current(&self) -> Option<u8> {
        match self.next {
            0 => None,
            n => Some((n - 1) as u8),
        }
    }

    /// Whether every class byte has been probed
    pub const fn is_exhausted(&self) -> bool {
        self.next > 0xFF
    }
}

impl Enumerator for ClassEnumerator {
    type Item = u8;

    fn next_with<T: CardTransport>(&mut self, prober: &mut Prober<T>) -> Option<u8> {
        while !self.is_exhausted() {
            let class = self.next as u8;
            self.next += 1;

            if prober.probe_class(class) {
                return Some(class);
            }
        }
        None
    }
}
