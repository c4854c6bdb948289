//! Logical Clock
//!
//! Accusation deadlines are measured in discrete progress units of the
//! host ledger (block count in the reference deployment). The core only
//! needs a monotonic counter; the substrate supplies the real one.

use serde::{Serialize, Deserialize};

/// A point on the host's monotonic logical clock.
pub type Height = u64;

/// Monotonic logical clock.
///
/// `now` must never decrease between calls. The ordering substrate
/// serializes all match operations, so no finer guarantee is needed.
pub trait LogicalClock {
    /// Current logical height.
    fn now(&self) -> Height;
}

/// Manually advanced clock for deterministic tests and simulations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StepClock {
    height: Height,
}

impl StepClock {
    /// Create a clock starting at the given height.
    pub fn at(height: Height) -> Self {
        Self { height }
    }

    /// Advance the clock by `steps` units.
    pub fn advance(&mut self, steps: Height) {
        self.height = self.height.saturating_add(steps);
    }
}

impl LogicalClock for StepClock {
    fn now(&self) -> Height {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_clock_advances() {
        let mut clock = StepClock::at(10);
        assert_eq!(clock.now(), 10);

        clock.advance(5);
        assert_eq!(clock.now(), 15);

        clock.advance(0);
        assert_eq!(clock.now(), 15);
    }

    #[test]
    fn test_step_clock_saturates() {
        let mut clock = StepClock::at(Height::MAX - 1);
        clock.advance(10);
        assert_eq!(clock.now(), Height::MAX);
    }
}
