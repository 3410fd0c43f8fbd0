//! Closed effect descriptors for modifier definitions.
//!
//! Every purchasable definition (upgrade, research, skill, structure, perk)
//! declares its behavior as data: a target [`Channel`] plus an [`EffectKind`]
//! magnitude formula. The aggregator interprets these generically; no
//! definition carries code.

use crate::ledger::ResourceKind;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

/// The derived quantity an effect contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    /// Passive production of one resource, per second.
    Production(ResourceKind),
    /// Ember granted per manual stoke.
    TapValue,
    /// Multiplier on the ember capacity formula.
    CapacityMult,
    /// Multiplier on tier-transition costs. Content uses negative
    /// `PercentMult` magnitudes; the aggregator floors the product at 0.2.
    TierDiscount,
    /// Multiplier on forge (craft) costs. Floored at 0.25.
    CraftCostMult,
    /// Additional forge queue slots, on top of the base slot.
    CraftSlots,
    /// Multiplier on brew durations. Floored at 0.5.
    BrewTimeMult,
    /// Multiplier on expedition durations.
    MissionTimeMult,
    /// Multiplier on expedition rewards.
    MissionYieldMult,
    /// Multiplier on expedition failure probability.
    MissionRiskMult,
    /// Multiplier on the aggregate helper yield.
    Leadership,
    /// Additional offline catch-up hours, on top of the base window.
    OfflineHours,
    /// Additional fractional yield applied to offline gains.
    OfflineYield,
    /// Multiplier on the ascension reward.
    AscensionReward,
}

// ---------------------------------------------------------------------------
// Effect kinds
// ---------------------------------------------------------------------------

/// How an effect's magnitude scales with the owned level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Adds `magnitude * level` to the channel's flat base.
    FlatAdd(f64),
    /// Multiplies the channel by `1 + magnitude * level`. Negative
    /// magnitudes express discounts.
    PercentMult(f64),
    /// Multiplies the channel by `growth ^ level`.
    PerLevelGeometric(f64),
}

/// One declared effect of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub channel: Channel,
    pub kind: EffectKind,
}

impl Effect {
    pub fn new(channel: Channel, kind: EffectKind) -> Self {
        Self { channel, kind }
    }

    /// The flat contribution at the given level (zero for multiplicative kinds).
    pub fn flat_at(&self, level: u32) -> f64 {
        match self.kind {
            EffectKind::FlatAdd(m) => m * f64::from(level),
            EffectKind::PercentMult(_) | EffectKind::PerLevelGeometric(_) => 0.0,
        }
    }

    /// The multiplicative contribution at the given level (one for flat kinds).
    pub fn mult_at(&self, level: u32) -> f64 {
        match self.kind {
            EffectKind::FlatAdd(_) => 1.0,
            EffectKind::PercentMult(m) => 1.0 + m * f64::from(level),
            EffectKind::PerLevelGeometric(g) => g.powi(level as i32),
        }
    }
}

// ---------------------------------------------------------------------------
// Buff effects
// ---------------------------------------------------------------------------

/// A time-bounded effect granted by drinking a tonic (or by the offline
/// catch-up pass). Buffs are never baked into cached rates; they are applied
/// at tick-application and display time only, so expiry is exact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BuffEffect {
    /// Multiplies one resource's production rate by `1 + bonus` while active.
    RatePercent { resource: ResourceKind, bonus: f64 },
    /// Adds a flat amount of ember to every manual stoke while active.
    TapFlat(f64),
}

// ---------------------------------------------------------------------------
// Cost scaling
// ---------------------------------------------------------------------------

/// How a definition's purchase cost scales with the owned level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CostScaling {
    /// Cost multiplier grows linearly: `1 + increment * level`.
    Linear { increment: f64 },
    /// Cost multiplier grows geometrically: `factor ^ level`.
    Exponential { factor: f64 },
}

impl CostScaling {
    /// Multiplier applied to the base cost when buying level `level + 1`
    /// (level 0 means the first purchase at base cost).
    pub fn multiplier_at(&self, level: u32) -> f64 {
        match *self {
            CostScaling::Linear { increment } => 1.0 + increment * f64::from(level),
            CostScaling::Exponential { factor } => factor.powi(level as i32),
        }
    }
}
