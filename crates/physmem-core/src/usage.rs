//! Arena utilization snapshot.

use std::fmt;

const MIB: usize = 1 << 20;

/// Point-in-time view of how much of an arena has been handed out.
///
/// `used` includes alignment padding, which is never reclaimed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaUsage {
    /// Bytes consumed so far (the bump cursor).
    pub used: usize,
    /// Total capacity in bytes.
    pub capacity: usize,
}

impl ArenaUsage {
    /// Bytes still available; 0 if `used` exceeds `capacity`.
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.used)
    }

    /// Fraction of capacity consumed, in `[0.0, 1.0]` for any snapshot
    /// taken from an arena.
    ///
    /// An empty arena (capacity 0) reports 0.0.
    pub fn fraction(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.used as f64 / self.capacity as f64
    }
}

impl fmt::Display for ArenaUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "used {} MiB / {} MiB ({:.1}%)",
            self.used / MIB,
            self.capacity / MIB,
            self.fraction() * 100.0
        )
    }
}
