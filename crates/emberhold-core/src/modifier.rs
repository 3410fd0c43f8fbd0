//! Owned-modifier state and the aggregation engine.
//!
//! [`recompute`] is the single source of truth for every derived number in
//! the game: production rates, stoke value, ember capacity, and the whole
//! discount/multiplier surface consumed by progression and the task queues.
//! It is a pure function of the registry plus the current state, performs a
//! total recomputation every time (never an incremental patch, so nothing
//! can drift), and must be re-invoked after every state-mutating action.
//!
//! Time-bounded buffs are deliberately absent from [`Derived`]: they are
//! evaluated against the current tick at application/display time, so their
//! expiry is exact.

use crate::effect::{BuffEffect, Channel, Effect, EffectKind};
use crate::id::*;
use crate::ledger::{ResourceKind, Ticks};
use crate::progression::{self, ProgressionState, MAX_MINOR};
use crate::registry::{ModifierDef, Registry};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Baselines
// ---------------------------------------------------------------------------

/// Passive ember production before any modifier.
pub const BASE_EMBER_PER_SEC: f64 = 0.1;

/// Ember granted per manual stoke before any modifier.
pub const BASE_TAP_VALUE: f64 = 1.0;

/// Pity threshold before Lucky trait reductions.
pub const BASE_PITY_THRESHOLD: u32 = 3;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A trait carried by a recruited helper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HelperTrait {
    /// Self-only yield multiplier bonus (fraction; 0.25 = +25%).
    Diligent(f64),
    /// Units of luck; each reduces the expedition pity threshold by one.
    Lucky(u8),
    /// Contribution to the forge cost discount (fraction).
    Thrifty(f64),
}

/// A recruited helper unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Helper {
    pub class: HelperClassId,
    pub level: u32,
    pub traits: Vec<HelperTrait>,
}

impl Helper {
    /// The self-only yield multiplier from Diligent traits.
    pub fn diligent_mult(&self) -> f64 {
        let bonus: f64 = self
            .traits
            .iter()
            .map(|t| match t {
                HelperTrait::Diligent(b) => *b,
                _ => 0.0,
            })
            .sum();
        1.0 + bonus
    }
}

// ---------------------------------------------------------------------------
// Artifact table and buffs
// ---------------------------------------------------------------------------

/// Permanent multipliers contributed by completed artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactTable {
    /// Per-resource production multipliers, indexed by [`ResourceKind::index`].
    pub production: [f64; 5],
    /// Multiplier on expedition failure probability (< 1 reduces risk).
    pub mission_risk: f64,
}

impl Default for ArtifactTable {
    fn default() -> Self {
        Self {
            production: [1.0; 5],
            mission_risk: 1.0,
        }
    }
}

/// A live time-bounded buff. Pruned once `expires_at <= now`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub effect: BuffEffect,
    pub expires_at: Ticks,
}

/// Running narrative (saga boon) totals. Boon deltas are baked in here when
/// applied; the flag set prevents re-application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeTotals {
    pub rate_mult: f64,
    pub cost_mult: f64,
    pub mission_time_mult: f64,
    pub reward_mult: f64,
}

impl Default for NarrativeTotals {
    fn default() -> Self {
        Self {
            rate_mult: 1.0,
            cost_mult: 1.0,
            mission_time_mult: 1.0,
            reward_mult: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// ModifierState
// ---------------------------------------------------------------------------

/// Everything owned that feeds the aggregator. Entries are created by
/// purchase/recruit/forge actions and never deleted except on full reset.
/// (No `PartialEq`: the slotmap roster has no meaningful equality; compare
/// serialized snapshots instead.)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModifierState {
    pub upgrades: BTreeMap<UpgradeId, u32>,
    pub research: BTreeMap<ResearchId, u32>,
    pub skills: BTreeMap<SkillId, u32>,
    pub structures: BTreeMap<StructureId, u32>,
    pub perks: BTreeMap<PerkId, u32>,

    pub helpers: SlotMap<HelperId, Helper>,

    #[serde(default)]
    pub artifacts: ArtifactTable,

    #[serde(default)]
    pub buffs: Vec<ActiveBuff>,

    /// One-shot saga boons already applied.
    #[serde(default)]
    pub boons: BTreeSet<BoonId>,

    #[serde(default)]
    pub narrative: NarrativeTotals,

    /// Brewed tonic inventory (unlimited capacity, count-based).
    #[serde(default)]
    pub tonics: BTreeMap<TonicId, u64>,
}

impl ModifierState {
    /// Drop every buff whose expiry has passed.
    pub fn prune_buffs(&mut self, now: Ticks) {
        self.buffs.retain(|b| b.expires_at > now);
    }

    /// Product of active rate buffs for a resource at `now`.
    pub fn rate_buff_mult(&self, resource: ResourceKind, now: Ticks) -> f64 {
        self.buffs
            .iter()
            .filter(|b| b.expires_at > now)
            .map(|b| match b.effect {
                BuffEffect::RatePercent { resource: r, bonus } if r == resource => 1.0 + bonus,
                _ => 1.0,
            })
            .product()
    }

    /// Sum of active flat stoke buffs at `now`.
    pub fn tap_buff_flat(&self, now: Ticks) -> f64 {
        self.buffs
            .iter()
            .filter(|b| b.expires_at > now)
            .map(|b| match b.effect {
                BuffEffect::TapFlat(v) => v,
                _ => 0.0,
            })
            .sum()
    }

    /// Total Lucky trait units across the roster.
    pub fn lucky_units(&self) -> u32 {
        self.helpers
            .values()
            .flat_map(|h| h.traits.iter())
            .map(|t| match t {
                HelperTrait::Lucky(n) => u32::from(*n),
                _ => 0,
            })
            .sum()
    }

    /// Summed Thrifty discount fractions across the roster.
    pub fn thrifty_sum(&self) -> f64 {
        self.helpers
            .values()
            .flat_map(|h| h.traits.iter())
            .map(|t| match t {
                HelperTrait::Thrifty(d) => *d,
                _ => 0.0,
            })
            .sum()
    }

    /// The effective pity threshold: base 3 minus one per Lucky unit,
    /// floored at 1.
    pub fn pity_threshold(&self) -> u32 {
        BASE_PITY_THRESHOLD
            .saturating_sub(self.lucky_units())
            .max(1)
    }
}

// ---------------------------------------------------------------------------
// Derived output
// ---------------------------------------------------------------------------

/// Final production rates and capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalRates {
    pub ember_per_sec: f64,
    /// Uncapped secondaries in [`ResourceKind::SECONDARY`] order.
    pub secondary_per_sec: [f64; 4],
    pub tap_value: f64,
    pub ember_cap: f64,
}

impl FinalRates {
    /// Rate for any resource kind.
    pub fn rate(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Ember => self.ember_per_sec,
            _ => self.secondary_per_sec[kind.index() - 1],
        }
    }
}

/// Everything the aggregator derives. Cached by the engine and replaced
/// wholesale after every mutating action.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived {
    pub rates: FinalRates,
    /// Tier cost multiplier, clamped to [0.2, 1].
    pub tier_discount: f64,
    /// Forge cost multiplier, floored at 0.25.
    pub craft_cost_mult: f64,
    /// Concurrent forge slots (base 1 plus effects).
    pub craft_slots: u32,
    /// Brew duration multiplier, floored at 0.5.
    pub brew_time_mult: f64,
    pub mission_time_mult: f64,
    pub mission_yield_mult: f64,
    /// Multiplier on expedition failure probability, clamped to [0, 1].
    pub mission_risk_mult: f64,
    pub ascension_reward_mult: f64,
    /// Extra offline catch-up hours on top of the 8-hour base.
    pub offline_hours_bonus: f64,
    /// Extra fractional yield on offline gains.
    pub offline_yield_bonus: f64,
}

// ---------------------------------------------------------------------------
// Channel accumulation
// ---------------------------------------------------------------------------

/// Per-channel running totals. Flat contributions are summed, percentage
/// contributions multiply; the fold order (all flats applied before the
/// multiplier product) is fixed regardless of registration order.
#[derive(Debug)]
struct ChannelTotals {
    flat: [f64; 5],
    mult: [f64; 5],
    tap_flat: f64,
    tap_mult: f64,
    capacity_flat: f64,
    capacity_mult: f64,
    tier_discount: f64,
    craft_cost: f64,
    craft_slots_flat: f64,
    brew_time: f64,
    mission_time: f64,
    mission_yield: f64,
    mission_risk: f64,
    leadership: f64,
    offline_hours: f64,
    offline_yield: f64,
    ascension_reward: f64,
}

impl ChannelTotals {
    fn new() -> Self {
        Self {
            flat: [0.0; 5],
            mult: [1.0; 5],
            tap_flat: 0.0,
            tap_mult: 1.0,
            capacity_flat: 0.0,
            capacity_mult: 1.0,
            tier_discount: 1.0,
            craft_cost: 1.0,
            craft_slots_flat: 0.0,
            brew_time: 1.0,
            mission_time: 1.0,
            mission_yield: 1.0,
            mission_risk: 1.0,
            leadership: 1.0,
            offline_hours: 0.0,
            offline_yield: 0.0,
            ascension_reward: 1.0,
        }
    }

    fn apply(&mut self, effect: &Effect, level: u32) {
        let flat = effect.flat_at(level);
        let mult = effect.mult_at(level);
        match effect.channel {
            Channel::Production(kind) => {
                self.flat[kind.index()] += flat;
                self.mult[kind.index()] *= mult;
            }
            Channel::TapValue => {
                self.tap_flat += flat;
                self.tap_mult *= mult;
            }
            Channel::CapacityMult => {
                self.capacity_flat += flat;
                self.capacity_mult *= mult;
            }
            Channel::TierDiscount => self.tier_discount *= mult,
            Channel::CraftCostMult => self.craft_cost *= mult,
            Channel::CraftSlots => self.craft_slots_flat += flat,
            Channel::BrewTimeMult => self.brew_time *= mult,
            Channel::MissionTimeMult => self.mission_time *= mult,
            Channel::MissionYieldMult => self.mission_yield *= mult,
            Channel::MissionRiskMult => self.mission_risk *= mult,
            Channel::Leadership => self.leadership *= mult,
            Channel::OfflineHours => self.offline_hours += flat,
            Channel::OfflineYield => self.offline_yield += flat,
            Channel::AscensionReward => self.ascension_reward *= mult,
        }
    }

    fn apply_defs<'a, I>(&mut self, owned: I)
    where
        I: Iterator<Item = (&'a ModifierDef, u32)>,
    {
        for (def, level) in owned {
            for effect in &def.effects {
                self.apply(effect, level);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Recompute
// ---------------------------------------------------------------------------

/// Derive everything from the full modifier and progression state.
///
/// Deterministic and side-effect free: two calls on unchanged inputs return
/// bit-identical output.
pub fn recompute(
    registry: &Registry,
    state: &ModifierState,
    progression_state: &ProgressionState,
) -> Derived {
    let mut totals = ChannelTotals::new();

    // Owned modifier categories. BTreeMap iteration keeps the fold order
    // stable across calls and across snapshots.
    totals.apply_defs(
        state
            .upgrades
            .iter()
            .filter_map(|(id, &lvl)| registry.upgrade(*id).map(|d| (d, lvl))),
    );
    totals.apply_defs(
        state
            .research
            .iter()
            .filter_map(|(id, &lvl)| registry.research(*id).map(|d| (d, lvl))),
    );
    totals.apply_defs(
        state
            .skills
            .iter()
            .filter_map(|(id, &lvl)| registry.skill(*id).map(|d| (d, lvl))),
    );
    totals.apply_defs(
        state
            .structures
            .iter()
            .filter_map(|(id, &lvl)| registry.structure(*id).map(|d| (d, lvl))),
    );
    for (id, &lvl) in &state.perks {
        if let Some(def) = registry.perk(*id) {
            for effect in &def.effects {
                totals.apply(effect, lvl);
            }
        }
    }

    // Helper roster: per-unit class yield times level, amplified by the
    // unit's own Diligent traits, then the aggregate scaled by leadership.
    let mut helper_yield = [0.0f64; 5];
    for helper in state.helpers.values() {
        if let Some(class) = registry.helper_class(helper.class) {
            let self_mult = helper.diligent_mult();
            for (i, y) in class.base_yield.iter().enumerate() {
                helper_yield[i] += y * f64::from(helper.level) * self_mult;
            }
        }
    }

    let global_mult = progression_state.cumulative_mult * state.narrative.rate_mult;

    let mut rates = [0.0f64; 5];
    for kind in ResourceKind::ALL {
        let i = kind.index();
        let base = if kind == ResourceKind::Ember {
            BASE_EMBER_PER_SEC
        } else {
            0.0
        };
        let pre_mult = base + totals.flat[i] + helper_yield[i] * totals.leadership;
        rates[i] =
            (pre_mult * totals.mult[i] * state.artifacts.production[i] * global_mult).max(0.0);
    }

    let tap_value =
        ((BASE_TAP_VALUE + totals.tap_flat) * totals.tap_mult * global_mult).max(0.0);

    // Capacity: ten times the unmodified next-tier cost, scaled by the
    // capacity channel, hard-clamped to twice the final tier's final cost.
    let config = registry.progression();
    let capacity_mult = ((1.0 + totals.capacity_flat) * totals.capacity_mult).max(0.0);
    let cap_raw = progression::unmodified_cost(progression_state.major, progression_state.minor)
        * 10.0
        * capacity_mult;
    let cap_limit = 2.0 * progression::unmodified_cost(config.max_major_tier, MAX_MINOR);
    let ember_cap = cap_raw.min(cap_limit);

    let craft_cost_mult = (totals.craft_cost
        * (1.0 - state.thrifty_sum()).max(0.0)
        * state.narrative.cost_mult)
        .max(0.25);

    Derived {
        rates: FinalRates {
            ember_per_sec: rates[ResourceKind::Ember.index()],
            secondary_per_sec: [rates[1], rates[2], rates[3], rates[4]],
            tap_value,
            ember_cap,
        },
        tier_discount: totals.tier_discount.clamp(0.2, 1.0),
        craft_cost_mult,
        craft_slots: 1 + totals.craft_slots_flat.max(0.0).floor() as u32,
        brew_time_mult: totals.brew_time.max(0.5),
        mission_time_mult: (totals.mission_time * state.narrative.mission_time_mult).max(0.0),
        mission_yield_mult: totals.mission_yield.max(0.0),
        mission_risk_mult: (totals.mission_risk * state.artifacts.mission_risk).clamp(0.0, 1.0),
        ascension_reward_mult: (totals.ascension_reward * state.narrative.reward_mult).max(0.0),
        offline_hours_bonus: totals.offline_hours.max(0.0),
        offline_yield_bonus: totals.offline_yield.max(0.0),
    }
}
