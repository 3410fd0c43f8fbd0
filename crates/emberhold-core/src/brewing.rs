//! Brewing: the tonic instantiation of the task queue.
//!
//! Enqueue deducts the tonic's resource costs immediately. The captured
//! duration is the base duration scaled by the brew-time multiplier, which
//! the aggregator floors at 50% of base. There is no concurrent-brew cap.
//! Resolution moves the tonic into the count-based inventory; drinking is a
//! separate action handled by the engine.

use crate::id::TonicId;
use crate::ledger::Ticks;
use serde::{Deserialize, Serialize};

/// Payload of a live brew entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrewTask {
    pub tonic: TonicId,
}

/// Duration captured at enqueue time. `brew_time_mult` is already floored
/// at 0.5 by the aggregator; rounding never drops below one tick.
pub fn brew_duration(base: Ticks, brew_time_mult: f64) -> Ticks {
    ((base as f64 * brew_time_mult).round() as Ticks).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmodified_duration_is_base() {
        assert_eq!(brew_duration(120, 1.0), 120);
    }

    #[test]
    fn floored_multiplier_halves_at_most() {
        assert_eq!(brew_duration(120, 0.5), 60);
    }

    #[test]
    fn duration_never_rounds_to_zero() {
        assert_eq!(brew_duration(1, 0.5), 1);
    }
}
