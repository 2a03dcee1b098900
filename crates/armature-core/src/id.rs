//! Node identifier generation.
//!
//! Nodes are identified by opaque strings rather than labels, so two nodes
//! with the same label stay distinct vertices. The default source draws 128
//! bits of randomness per id, which keeps the collision probability
//! negligible for any realistic diagram. Deterministic output for tests is
//! achieved by injecting a different source, not by removing randomness.

use rand::RngExt;

/// Source of unique node identifiers.
pub trait IdSource: std::fmt::Debug {
    /// Produces the next identifier.
    fn next_id(&mut self) -> String;
}

/// 128-bit random identifiers, rendered as 32 hex digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn next_id(&mut self) -> String {
        format!("{:032x}", rand::rng().random::<u128>())
    }
}

/// Counter-based identifiers (`n0`, `n1`, ...) for reproducible output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialIdSource {
    next: u64,
}

impl SequentialIdSource {
    /// Creates a source starting at `n0`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIdSource {
    fn next_id(&mut self) -> String {
        let id = format!("n{}", self.next);
        self.next += 1;
        id
    }
}
