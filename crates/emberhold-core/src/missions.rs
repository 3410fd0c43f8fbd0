//! Expeditions: the probabilistic instantiation of the task queue.
//!
//! At most one expedition of a given type may be in flight. Resolution
//! rolls a Bernoulli trial against the type's failure probability (reduced
//! by forged risk-reduction artifacts); failure yields nothing. The pity
//! counter advances on every resolution, success or not, and guarantees the
//! rare reward within `threshold` consecutive resolutions.

use crate::id::MissionId;
use crate::ledger::{ResourceKind, Ticks};
use crate::registry::MissionDef;
use crate::rng::SimRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payload of a live expedition entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionTask {
    pub mission: MissionId,
}

// ---------------------------------------------------------------------------
// Pity counters
// ---------------------------------------------------------------------------

/// Per mission-type consecutive-resolution counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PityCounters {
    counters: BTreeMap<MissionId, u32>,
}

impl PityCounters {
    /// Current counter value for a mission type.
    pub fn get(&self, mission: MissionId) -> u32 {
        self.counters.get(&mission).copied().unwrap_or(0)
    }

    /// Advance the counter; if it reaches `threshold`, reset to zero and
    /// report that the rare reward is owed.
    pub fn advance(&mut self, mission: MissionId, threshold: u32) -> bool {
        let counter = self.counters.entry(mission).or_insert(0);
        *counter += 1;
        if *counter >= threshold {
            *counter = 0;
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// What an expedition resolution produced.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionOutcome {
    pub success: bool,
    /// The scaled reward, present only on success.
    pub reward: Option<(ResourceKind, f64)>,
    /// The rare reward, present when the pity guarantee fired.
    pub rare: Option<(ResourceKind, f64)>,
}

/// Expedition duration captured at launch time.
pub fn mission_duration(base: Ticks, mission_time_mult: f64) -> Ticks {
    ((base as f64 * mission_time_mult).round() as Ticks).max(1)
}

/// Resolve one expedition: roll the trial, advance pity, assemble rewards.
pub fn resolve(
    def: &MissionDef,
    risk_mult: f64,
    yield_mult: f64,
    pity_threshold: u32,
    pity: &mut PityCounters,
    mission: MissionId,
    rng: &mut SimRng,
) -> MissionOutcome {
    let failure_chance = (def.failure_chance * risk_mult).clamp(0.0, 1.0);
    let failed = rng.chance(failure_chance);

    let reward = if failed {
        None
    } else {
        let (kind, amount) = def.reward;
        Some((kind, amount * yield_mult))
    };

    // The counter advances on every resolution, independent of the trial.
    let rare = if pity.advance(mission, pity_threshold) {
        Some(def.rare_reward)
    } else {
        None
    };

    MissionOutcome {
        success: !failed,
        reward,
        rare,
    }
}
