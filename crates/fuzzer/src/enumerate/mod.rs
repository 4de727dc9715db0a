//! The three enumeration tiers: class, instruction and parameter
//!
//! Each tier is a cursor over its slice of the command space. Cursors do not
//! own the card session; they borrow the [`Prober`] for the duration of one
//! [`Enumerator::next_with`] call, so the coordinator can stack all three on
//! one session while only a single probe is ever in flight.

mod class;
mod instruction;
mod parameter;

pub use class::ClassEnumerator;
pub use instruction::InstructionEnumerator;
pub use parameter::ParameterEnumerator;

use std::fmt;
use std::iter::FusedIterator;

use cardfuzz_apdu_core::CardTransport;

use crate::probe::Prober;

/// A resumable, strictly ascending walk over part of the command space
pub trait Enumerator {
    /// What the walk yields
    type Item;

    /// Probe forward until the next item is found, or the walk is over
    fn next_with<T: CardTransport>(&mut self, prober: &mut Prober<T>) -> Option<Self::Item>;

    /// Pair the cursor with a prober to get an [`Iterator`]
    fn iter<T: CardTransport>(self, prober: &mut Prober<T>) -> Iter<'_, Self, T>
    where
        Self: Sized,
    {
        Iter {
            enumerator: self,
            prober,
        }
    }
}

/// Iterator adapter returned by [`Enumerator::iter`]
pub struct Iter<'a, E, T> {
    enumerator: E,
    prober: &'a mut Prober<T>,
}

impl<E: fmt::Debug, T: fmt::Debug> fmt::Debug for Iter<'_, E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("enumerator", &self.enumerator)
            .finish_non_exhaustive()
    }
}

impl<E: Enumerator, T: CardTransport> Iterator for Iter<'_, E, T> {
    type Item = E::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.enumerator.next_with(self.prober)
    }
}

// Every cursor stays exhausted once it has returned `None`
impl<E: Enumerator, T: CardTransport> FusedIterator for Iter<'_, E, T> {}
