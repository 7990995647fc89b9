//! Session generation tokens
//!
//! Every asynchronous unit of work carries the generation it was started
//! under; the controller advances the gate when a new session supersedes
//! the old one, which makes every stale continuation a no-op by
//! construction. This replaces explicit cancellation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one negotiation-and-retry session. Strictly increasing per
/// client; generation 0 means "no session started yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// Raw counter value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared source of truth for the current generation
#[derive(Debug, Default)]
pub(crate) struct GenerationGate {
    current: AtomicU64,
}

impl GenerationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, invalidating every outstanding one
    pub fn advance(&self) -> Generation {
        Generation(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn current(&self) -> Generation {
        Generation(self.current.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.current() == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_is_strictly_increasing() {
        let gate = GenerationGate::new();
        assert_eq!(gate.current().value(), 0);

        let first = gate.advance();
        let second = gate.advance();
        let third = gate.advance();
        assert!(first < second && second < third);
        assert_eq!(third.value(), 3);
    }

    #[test]
    fn only_latest_generation_is_current() {
        let gate = GenerationGate::new();
        let first = gate.advance();
        assert!(gate.is_current(first));

        let second = gate.advance();
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
    }
}
