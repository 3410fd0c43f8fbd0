//! Shared fixtures for unit and integration tests.
//!
//! Only compiled with the `test-utils` feature. The fixture content is a
//! small but representative slice of real game data: every definition
//! category and every effect channel is exercised by at least one entry.

use crate::effect::{BuffEffect, Channel, CostScaling, Effect, EffectKind};
use crate::engine::Engine;
use crate::id::*;
use crate::ledger::{ResourceKind, Ticks};
use crate::registry::{
    ArtifactBonus, ArtifactDef, BoonDef, Cost, HelperClassDef, MissionDef, ModifierDef, PerkDef,
    ProgressionConfig, Registry, RegistryBuilder, TonicDef,
};

/// The fixture content registry plus the ids it registered.
pub struct FixtureContent {
    pub registry: Registry,
    pub bellows: UpgradeId,
    pub draft_wheel: UpgradeId,
    pub ore_sifting: ResearchId,
    pub ledgers: ResearchId,
    pub provisioning: ResearchId,
    pub logistics: ResearchId,
    pub steady_hand: SkillId,
    pub guild_hall: StructureId,
    pub annex: StructureId,
    pub gilded_molds: PerkId,
    pub triumphs: PerkId,
    pub smith: HelperClassId,
    pub forager: HelperClassId,
    pub ember_crown: ArtifactId,
    pub wayfinder_charm: ArtifactId,
    pub hearth_tonic: TonicId,
    pub deep_delve: MissionId,
    pub herb_walk: MissionId,
    pub favor_of_the_hold: BoonId,
}

fn ember_cost(base: f64, factor: f64) -> Cost {
    Cost {
        amounts: vec![(ResourceKind::Ember, base)],
        scaling: CostScaling::Exponential { factor },
    }
}

/// Build the standard fixture content set.
pub fn fixture_registry() -> FixtureContent {
    let mut b = RegistryBuilder::new();

    let bellows = b
        .register_upgrade(ModifierDef {
            name: "bellows".to_string(),
            cost: ember_cost(10.0, 1.15),
            max_level: None,
            effects: vec![Effect::new(
                Channel::Production(ResourceKind::Ember),
                EffectKind::FlatAdd(0.4),
            )],
        })
        .unwrap();
    let draft_wheel = b
        .register_upgrade(ModifierDef {
            name: "draft wheel".to_string(),
            cost: ember_cost(50.0, 1.2),
            max_level: Some(10),
            effects: vec![
                Effect::new(
                    Channel::Production(ResourceKind::Ember),
                    EffectKind::PercentMult(0.25),
                ),
                Effect::new(Channel::TapValue, EffectKind::FlatAdd(0.5)),
            ],
        })
        .unwrap();

    let ore_sifting = b
        .register_research(ModifierDef {
            name: "ore sifting".to_string(),
            cost: ember_cost(20.0, 1.5),
            max_level: None,
            effects: vec![Effect::new(
                Channel::Production(ResourceKind::Ore),
                EffectKind::FlatAdd(0.2),
            )],
        })
        .unwrap();
    let ledgers = b
        .register_research(ModifierDef {
            name: "ledgers".to_string(),
            cost: ember_cost(100.0, 2.0),
            max_level: Some(16),
            effects: vec![Effect::new(
                Channel::TierDiscount,
                EffectKind::PercentMult(-0.05),
            )],
        })
        .unwrap();
    let provisioning = b
        .register_research(ModifierDef {
            name: "provisioning".to_string(),
            cost: ember_cost(200.0, 2.0),
            max_level: Some(4),
            effects: vec![
                Effect::new(Channel::OfflineHours, EffectKind::FlatAdd(1.0)),
                Effect::new(Channel::OfflineYield, EffectKind::FlatAdd(0.05)),
            ],
        })
        .unwrap();
    let logistics = b
        .register_research(ModifierDef {
            name: "logistics".to_string(),
            cost: ember_cost(150.0, 1.8),
            max_level: Some(5),
            effects: vec![
                Effect::new(Channel::MissionTimeMult, EffectKind::PercentMult(-0.1)),
                Effect::new(Channel::MissionYieldMult, EffectKind::PercentMult(0.1)),
            ],
        })
        .unwrap();

    let steady_hand = b
        .register_skill(ModifierDef {
            name: "steady hand".to_string(),
            cost: Cost {
                amounts: vec![(ResourceKind::Herb, 15.0)],
                scaling: CostScaling::Linear { increment: 1.0 },
            },
            max_level: Some(5),
            effects: vec![Effect::new(
                Channel::BrewTimeMult,
                EffectKind::PercentMult(-0.1),
            )],
        })
        .unwrap();

    let guild_hall = b
        .register_structure(ModifierDef {
            name: "guild hall".to_string(),
            cost: Cost {
                amounts: vec![(ResourceKind::Ore, 80.0)],
                scaling: CostScaling::Exponential { factor: 1.6 },
            },
            max_level: None,
            effects: vec![
                Effect::new(Channel::Leadership, EffectKind::PercentMult(0.25)),
                Effect::new(Channel::CapacityMult, EffectKind::PercentMult(0.1)),
            ],
        })
        .unwrap();
    let annex = b
        .register_structure(ModifierDef {
            name: "forge annex".to_string(),
            cost: Cost {
                amounts: vec![(ResourceKind::Ore, 120.0), (ResourceKind::Crystal, 10.0)],
                scaling: CostScaling::Exponential { factor: 2.0 },
            },
            max_level: Some(3),
            effects: vec![Effect::new(Channel::CraftSlots, EffectKind::FlatAdd(1.0))],
        })
        .unwrap();

    let gilded_molds = b
        .register_perk(PerkDef {
            name: "gilded molds".to_string(),
            sigil_cost: 1,
            max_level: Some(5),
            effects: vec![Effect::new(
                Channel::CraftCostMult,
                EffectKind::PercentMult(-0.1),
            )],
        })
        .unwrap();
    let triumphs = b
        .register_perk(PerkDef {
            name: "chronicle of triumphs".to_string(),
            sigil_cost: 2,
            max_level: Some(4),
            effects: vec![Effect::new(
                Channel::AscensionReward,
                EffectKind::PercentMult(0.25),
            )],
        })
        .unwrap();

    let smith = b
        .register_helper_class(HelperClassDef {
            name: "smith".to_string(),
            base_yield: [0.5, 0.1, 0.0, 0.0, 0.0],
            recruit_cost: vec![(ResourceKind::Ember, 50.0)],
            training_cost: ember_cost(25.0, 2.0),
        })
        .unwrap();
    let forager = b
        .register_helper_class(HelperClassDef {
            name: "forager".to_string(),
            base_yield: [0.0, 0.0, 0.0, 0.3, 0.0],
            recruit_cost: vec![(ResourceKind::Ember, 40.0)],
            training_cost: ember_cost(20.0, 2.0),
        })
        .unwrap();

    let ember_crown = b
        .register_artifact(ArtifactDef {
            name: "ember crown".to_string(),
            cost: vec![(ResourceKind::Ore, 100.0)],
            base_duration: 600,
            bonus: ArtifactBonus::Production {
                resource: ResourceKind::Ember,
                mult: 1.1,
            },
        })
        .unwrap();
    let wayfinder_charm = b
        .register_artifact(ArtifactDef {
            name: "wayfinder charm".to_string(),
            cost: vec![(ResourceKind::Crystal, 20.0)],
            base_duration: 400,
            bonus: ArtifactBonus::RiskReduction { mult: 0.5 },
        })
        .unwrap();

    let hearth_tonic = b
        .register_tonic(TonicDef {
            name: "hearth tonic".to_string(),
            cost: vec![(ResourceKind::Herb, 10.0)],
            base_duration: 120,
            buff: BuffEffect::RatePercent {
                resource: ResourceKind::Ember,
                bonus: 0.5,
            },
            buff_duration: 300,
        })
        .unwrap();

    let deep_delve = b
        .register_mission(MissionDef {
            name: "deep delve".to_string(),
            base_duration: 600,
            failure_chance: 0.3,
            reward: (ResourceKind::Ore, 40.0),
            rare_reward: (ResourceKind::Crystal, 5.0),
        })
        .unwrap();
    let herb_walk = b
        .register_mission(MissionDef {
            name: "herb walk".to_string(),
            base_duration: 300,
            failure_chance: 0.1,
            reward: (ResourceKind::Herb, 25.0),
            rare_reward: (ResourceKind::Essence, 2.0),
        })
        .unwrap();

    let favor_of_the_hold = b
        .register_boon(BoonDef {
            name: "favor of the hold".to_string(),
            rate_mult: 1.25,
            cost_mult: 0.9,
            mission_time_mult: 0.9,
            reward_mult: 1.5,
        })
        .unwrap();

    b.set_progression(ProgressionConfig {
        max_major_tier: 9,
        unlock_thresholds: vec![(1, "expeditions".to_string()), (2, "brewing".to_string())],
    });

    let registry = b.build().expect("fixture content must validate");
    FixtureContent {
        registry,
        bellows,
        draft_wheel,
        ore_sifting,
        ledgers,
        provisioning,
        logistics,
        steady_hand,
        guild_hall,
        annex,
        gilded_molds,
        triumphs,
        smith,
        forager,
        ember_crown,
        wayfinder_charm,
        hearth_tonic,
        deep_delve,
        herb_walk,
        favor_of_the_hold,
    }
}

/// A fixture engine over the standard content.
pub struct Fixture {
    pub engine: Engine,
    pub bellows: UpgradeId,
    pub draft_wheel: UpgradeId,
    pub ore_sifting: ResearchId,
    pub ledgers: ResearchId,
    pub provisioning: ResearchId,
    pub logistics: ResearchId,
    pub steady_hand: SkillId,
    pub guild_hall: StructureId,
    pub annex: StructureId,
    pub gilded_molds: PerkId,
    pub triumphs: PerkId,
    pub smith: HelperClassId,
    pub forager: HelperClassId,
    pub ember_crown: ArtifactId,
    pub wayfinder_charm: ArtifactId,
    pub hearth_tonic: TonicId,
    pub deep_delve: MissionId,
    pub herb_walk: MissionId,
    pub favor_of_the_hold: BoonId,
}

/// Fresh engine over the fixture content with the given RNG seed.
pub fn fixture(seed: u64) -> Fixture {
    let c = fixture_registry();
    Fixture {
        engine: Engine::new(c.registry, seed),
        bellows: c.bellows,
        draft_wheel: c.draft_wheel,
        ore_sifting: c.ore_sifting,
        ledgers: c.ledgers,
        provisioning: c.provisioning,
        logistics: c.logistics,
        steady_hand: c.steady_hand,
        guild_hall: c.guild_hall,
        annex: c.annex,
        gilded_molds: c.gilded_molds,
        triumphs: c.triumphs,
        smith: c.smith,
        forager: c.forager,
        ember_crown: c.ember_crown,
        wayfinder_charm: c.wayfinder_charm,
        hearth_tonic: c.hearth_tonic,
        deep_delve: c.deep_delve,
        herb_walk: c.herb_walk,
        favor_of_the_hold: c.favor_of_the_hold,
    }
}

// Cheat hooks for tests; state mutation otherwise only flows through actions.
impl Engine {
    /// Credit a resource directly, bypassing production and the ember cap.
    pub fn grant(&mut self, kind: ResourceKind, amount: f64) {
        self.state.ledger.grant_unclamped(kind, amount);
    }

    /// Set the sigil balance directly.
    pub fn grant_sigils(&mut self, sigils: u64) {
        self.state.ledger.sigils = sigils;
    }

    /// Raise the ember capacity directly (fixture caps are small).
    pub fn override_ember_cap(&mut self, cap: f64) {
        self.state.ledger.set_ember_cap(cap);
    }

    /// Jump the clock without simulating, for queue setup.
    pub fn set_tick(&mut self, tick: Ticks) {
        self.state.last_tick = tick;
    }
}
