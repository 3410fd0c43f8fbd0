//! The progression ladder: major tiers and minor sub-tiers.
//!
//! State is the `(major, minor)` pair with minor in `0..=8`. A minor
//! transition is a breakthrough; completing minor 8 enables an ascension to
//! the next major tier. `(max_major_tier, 8)` is terminal and rejects every
//! further transition without mutating anything.

use crate::error::ActionError;
use crate::ledger::{ResourceKind, ResourceLedger};
use crate::registry::ProgressionConfig;
use serde::{Deserialize, Serialize};

/// Highest minor sub-tier; reaching it makes the next transition major.
pub const MAX_MINOR: u32 = 8;

/// Base cost of each secondary resource at an ascension, before the
/// `2^major` scaling. Waived entirely at major 0.
pub const SECONDARY_ASCENSION_BASE: f64 = 50.0;

/// The unmodified cost of the next transition out of `(major, minor)`:
/// `100 * 2^minor * 10^major`.
pub fn unmodified_cost(major: u32, minor: u32) -> f64 {
    100.0 * 2f64.powi(minor as i32) * 10f64.powi(major as i32)
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Progression ladder state. Created at new-game, lives for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub major: u32,
    /// Bounded `0..=8`; rolls to a major advancement at 9.
    pub minor: u32,
    /// Cumulative multiplier accrued from past advancements. Consumed by
    /// the aggregator, never recomputed from history.
    pub cumulative_mult: f64,
    /// Lifetime advancement counter (breakthroughs + ascensions).
    pub advancements: u64,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            major: 0,
            minor: 0,
            cumulative_mult: 1.0,
            advancements: 0,
        }
    }
}

impl ProgressionState {
    /// Whether the ladder is at its terminal state.
    pub fn at_peak(&self, config: &ProgressionConfig) -> bool {
        self.major >= config.max_major_tier && self.minor >= MAX_MINOR
    }
}

// ---------------------------------------------------------------------------
// Transition outcome
// ---------------------------------------------------------------------------

/// What an accepted transition did.
#[derive(Debug, Clone, PartialEq)]
pub enum Advancement {
    /// A minor sub-tier step.
    Breakthrough { major: u32, minor: u32 },
    /// A major tier step, with the essence reward and sigils granted and
    /// any feature unlocks crossed.
    Ascension {
        major: u32,
        reward: f64,
        sigils: u64,
        unlocked: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Attempt the next transition on the ladder.
///
/// `tier_discount` scales the primary cost (already floored at 0.2 by the
/// aggregator); `reward_mult` scales the ascension reward. Every
/// precondition is checked before any mutation: a rejection leaves the
/// ledger and the progression state untouched.
pub fn advance(
    state: &mut ProgressionState,
    ledger: &mut ResourceLedger,
    config: &ProgressionConfig,
    tier_discount: f64,
    reward_mult: f64,
) -> Result<Advancement, ActionError> {
    if state.at_peak(config) {
        return Err(ActionError::InvalidState("peak reached"));
    }

    let cost = unmodified_cost(state.major, state.minor) * tier_discount;

    if state.minor < MAX_MINOR {
        // Breakthrough.
        if !ledger.debit_all(&[(ResourceKind::Ember, cost)]) {
            return Err(ActionError::InsufficientFunds);
        }
        state.minor += 1;
        state.cumulative_mult *= 1.02;
        state.advancements += 1;
        return Ok(Advancement::Breakthrough {
            major: state.major,
            minor: state.minor,
        });
    }

    // Ascension. Secondary costs are waived entirely at major 0.
    let mut costs = vec![(ResourceKind::Ember, cost)];
    if state.major > 0 {
        let scale = 2f64.powi(state.major as i32);
        for kind in ResourceKind::SECONDARY {
            costs.push((kind, SECONDARY_ASCENSION_BASE * scale));
        }
    }
    if !ledger.debit_all(&costs) {
        return Err(ActionError::InsufficientFunds);
    }

    // Reward formula: floor(cost^0.65 / 1000), scaled by the independent
    // percentage bonuses folded into `reward_mult`. Floors to zero at low
    // tier costs; preserved as observed.
    let reward = ((cost.powf(0.65) / 1000.0).floor() * reward_mult).floor();
    let sigils = ((reward / 10.0).floor() as u64).max(1);

    ledger.credit(ResourceKind::Essence, reward);
    ledger.sigils += sigils;
    ledger.reset_ember();

    state.major += 1;
    state.minor = 0;
    state.cumulative_mult *= 1.10;
    state.advancements += 1;

    let unlocked = config
        .unlock_thresholds
        .iter()
        .filter(|&&(threshold, _)| threshold == state.major)
        .map(|(_, feature)| feature.clone())
        .collect();

    Ok(Advancement::Ascension {
        major: state.major,
        reward,
        sigils,
        unlocked,
    })
}
