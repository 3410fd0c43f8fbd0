//! The content registry: every modifier, helper class, artifact, tonic,
//! expedition, and boon definition, plus the progression configuration.
//!
//! Definitions are data supplied by the content collaborator, registered
//! through a [`RegistryBuilder`] and frozen into an immutable [`Registry`]
//! at startup. The core never interprets content-specific code; everything
//! is expressed through [`Effect`] descriptors and plain numbers.

use crate::effect::{BuffEffect, CostScaling, Effect};
use crate::id::*;
use crate::ledger::{ResourceKind, Ticks};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Definition types
// ---------------------------------------------------------------------------

/// A purchase cost: base resource amounts scaled by the owned level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    pub amounts: Vec<(ResourceKind, f64)>,
    pub scaling: CostScaling,
}

impl Cost {
    /// The concrete cost list for buying the next level when `level` are
    /// already owned.
    pub fn at_level(&self, level: u32) -> Vec<(ResourceKind, f64)> {
        let mult = self.scaling.multiplier_at(level);
        self.amounts
            .iter()
            .map(|&(kind, base)| (kind, base * mult))
            .collect()
    }
}

/// A leveled modifier definition. Shared by four of the five owned
/// categories (tier-upgrades, research, skills, structures).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierDef {
    pub name: String,
    pub cost: Cost,
    /// `None` means unbounded levels.
    pub max_level: Option<u32>,
    pub effects: Vec<Effect>,
}

/// A meta-perk definition, priced in sigils.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerkDef {
    pub name: String,
    pub sigil_cost: u64,
    pub max_level: Option<u32>,
    pub effects: Vec<Effect>,
}

/// A recruitable helper class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelperClassDef {
    pub name: String,
    /// Per-resource yield per second at level 1, before trait and
    /// leadership scaling. Indexed by [`ResourceKind::index`].
    pub base_yield: [f64; 5],
    pub recruit_cost: Vec<(ResourceKind, f64)>,
    pub training_cost: Cost,
}

/// What a completed artifact contributes, permanently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ArtifactBonus {
    /// Multiplies one resource's production multiplier table entry.
    Production { resource: ResourceKind, mult: f64 },
    /// Multiplies the expedition failure probability (values < 1 reduce risk).
    RiskReduction { mult: f64 },
}

/// A forgeable artifact definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDef {
    pub name: String,
    pub cost: Vec<(ResourceKind, f64)>,
    pub base_duration: Ticks,
    pub bonus: ArtifactBonus,
}

/// A brewable tonic definition. Brewed tonics land in a count-based
/// inventory; drinking one installs its buff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TonicDef {
    pub name: String,
    pub cost: Vec<(ResourceKind, f64)>,
    pub base_duration: Ticks,
    pub buff: BuffEffect,
    pub buff_duration: Ticks,
}

/// An expedition (gathering mission) definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionDef {
    pub name: String,
    pub base_duration: Ticks,
    /// Probability the expedition returns empty-handed, before artifact
    /// risk reduction. Must lie in [0, 1].
    pub failure_chance: f64,
    pub reward: (ResourceKind, f64),
    /// The rare reward granted by the pity guarantee.
    pub rare_reward: (ResourceKind, f64),
}

/// A one-shot saga boon (narrative reward). Applying it bakes these deltas
/// into the running narrative totals; it can never be applied twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoonDef {
    pub name: String,
    pub rate_mult: f64,
    pub cost_mult: f64,
    pub mission_time_mult: f64,
    pub reward_mult: f64,
}

/// Progression ladder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// The highest major tier; `(max_major_tier, 8)` is the terminal state.
    pub max_major_tier: u32,
    /// Features announced when the major tier reaches each threshold.
    pub unlock_thresholds: Vec<(u32, String)>,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            max_major_tier: 9,
            unlock_thresholds: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for constructing an immutable [`Registry`].
/// Register everything, then `build()` validates and freezes.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    upgrades: Vec<ModifierDef>,
    research: Vec<ModifierDef>,
    skills: Vec<ModifierDef>,
    structures: Vec<ModifierDef>,
    perks: Vec<PerkDef>,
    helper_classes: Vec<HelperClassDef>,
    artifacts: Vec<ArtifactDef>,
    tonics: Vec<TonicDef>,
    missions: Vec<MissionDef>,
    boons: Vec<BoonDef>,
    progression: ProgressionConfig,
    names: HashMap<String, ()>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn claim_name(&mut self, name: &str) -> Result<(), RegistryError> {
        if self.names.insert(name.to_string(), ()).is_some() {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    pub fn register_upgrade(&mut self, def: ModifierDef) -> Result<UpgradeId, RegistryError> {
        self.claim_name(&def.name)?;
        let id = UpgradeId(self.upgrades.len() as u32);
        self.upgrades.push(def);
        Ok(id)
    }

    pub fn register_research(&mut self, def: ModifierDef) -> Result<ResearchId, RegistryError> {
        self.claim_name(&def.name)?;
        let id = ResearchId(self.research.len() as u32);
        self.research.push(def);
        Ok(id)
    }

    pub fn register_skill(&mut self, def: ModifierDef) -> Result<SkillId, RegistryError> {
        self.claim_name(&def.name)?;
        let id = SkillId(self.skills.len() as u32);
        self.skills.push(def);
        Ok(id)
    }

    pub fn register_structure(&mut self, def: ModifierDef) -> Result<StructureId, RegistryError> {
        self.claim_name(&def.name)?;
        let id = StructureId(self.structures.len() as u32);
        self.structures.push(def);
        Ok(id)
    }

    pub fn register_perk(&mut self, def: PerkDef) -> Result<PerkId, RegistryError> {
        self.claim_name(&def.name)?;
        let id = PerkId(self.perks.len() as u32);
        self.perks.push(def);
        Ok(id)
    }

    pub fn register_helper_class(
        &mut self,
        def: HelperClassDef,
    ) -> Result<HelperClassId, RegistryError> {
        self.claim_name(&def.name)?;
        let id = HelperClassId(self.helper_classes.len() as u32);
        self.helper_classes.push(def);
        Ok(id)
    }

    pub fn register_artifact(&mut self, def: ArtifactDef) -> Result<ArtifactId, RegistryError> {
        self.claim_name(&def.name)?;
        let id = ArtifactId(self.artifacts.len() as u32);
        self.artifacts.push(def);
        Ok(id)
    }

    pub fn register_tonic(&mut self, def: TonicDef) -> Result<TonicId, RegistryError> {
        self.claim_name(&def.name)?;
        let id = TonicId(self.tonics.len() as u32);
        self.tonics.push(def);
        Ok(id)
    }

    pub fn register_mission(&mut self, def: MissionDef) -> Result<MissionId, RegistryError> {
        self.claim_name(&def.name)?;
        let id = MissionId(self.missions.len() as u32);
        self.missions.push(def);
        Ok(id)
    }

    pub fn register_boon(&mut self, def: BoonDef) -> Result<BoonId, RegistryError> {
        self.claim_name(&def.name)?;
        let id = BoonId(self.boons.len() as u32);
        self.boons.push(def);
        Ok(id)
    }

    pub fn set_progression(&mut self, config: ProgressionConfig) {
        self.progression = config;
    }

    /// Validate and freeze. All numeric sanity checks happen here so the
    /// runtime never has to re-validate content.
    pub fn build(self) -> Result<Registry, RegistryError> {
        for mission in &self.missions {
            if !(0.0..=1.0).contains(&mission.failure_chance) {
                return Err(RegistryError::InvalidFailureChance {
                    mission: mission.name.clone(),
                    chance: mission.failure_chance,
                });
            }
            if mission.base_duration == 0 {
                return Err(RegistryError::ZeroDuration(mission.name.clone()));
            }
        }
        for artifact in &self.artifacts {
            if artifact.base_duration == 0 {
                return Err(RegistryError::ZeroDuration(artifact.name.clone()));
            }
        }
        for tonic in &self.tonics {
            if tonic.base_duration == 0 || tonic.buff_duration == 0 {
                return Err(RegistryError::ZeroDuration(tonic.name.clone()));
            }
        }
        if self.progression.max_major_tier == 0 {
            return Err(RegistryError::InvalidProgressionConfig);
        }

        Ok(Registry {
            upgrades: self.upgrades,
            research: self.research,
            skills: self.skills,
            structures: self.structures,
            perks: self.perks,
            helper_classes: self.helper_classes,
            artifacts: self.artifacts,
            tonics: self.tonics,
            missions: self.missions,
            boons: self.boons,
            progression: self.progression,
        })
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable content registry. Frozen after `build()`; safe to share.
#[derive(Debug, Clone)]
pub struct Registry {
    upgrades: Vec<ModifierDef>,
    research: Vec<ModifierDef>,
    skills: Vec<ModifierDef>,
    structures: Vec<ModifierDef>,
    perks: Vec<PerkDef>,
    helper_classes: Vec<HelperClassDef>,
    artifacts: Vec<ArtifactDef>,
    tonics: Vec<TonicDef>,
    missions: Vec<MissionDef>,
    boons: Vec<BoonDef>,
    progression: ProgressionConfig,
}

impl Registry {
    pub fn upgrade(&self, id: UpgradeId) -> Option<&ModifierDef> {
        self.upgrades.get(id.0 as usize)
    }

    pub fn research(&self, id: ResearchId) -> Option<&ModifierDef> {
        self.research.get(id.0 as usize)
    }

    pub fn skill(&self, id: SkillId) -> Option<&ModifierDef> {
        self.skills.get(id.0 as usize)
    }

    pub fn structure(&self, id: StructureId) -> Option<&ModifierDef> {
        self.structures.get(id.0 as usize)
    }

    pub fn perk(&self, id: PerkId) -> Option<&PerkDef> {
        self.perks.get(id.0 as usize)
    }

    pub fn helper_class(&self, id: HelperClassId) -> Option<&HelperClassDef> {
        self.helper_classes.get(id.0 as usize)
    }

    pub fn artifact(&self, id: ArtifactId) -> Option<&ArtifactDef> {
        self.artifacts.get(id.0 as usize)
    }

    pub fn tonic(&self, id: TonicId) -> Option<&TonicDef> {
        self.tonics.get(id.0 as usize)
    }

    pub fn mission(&self, id: MissionId) -> Option<&MissionDef> {
        self.missions.get(id.0 as usize)
    }

    pub fn boon(&self, id: BoonId) -> Option<&BoonDef> {
        self.boons.get(id.0 as usize)
    }

    pub fn progression(&self) -> &ProgressionConfig {
        &self.progression
    }

    pub fn upgrades(&self) -> impl Iterator<Item = (UpgradeId, &ModifierDef)> {
        self.upgrades
            .iter()
            .enumerate()
            .map(|(i, d)| (UpgradeId(i as u32), d))
    }

    pub fn research_defs(&self) -> impl Iterator<Item = (ResearchId, &ModifierDef)> {
        self.research
            .iter()
            .enumerate()
            .map(|(i, d)| (ResearchId(i as u32), d))
    }

    pub fn skills(&self) -> impl Iterator<Item = (SkillId, &ModifierDef)> {
        self.skills
            .iter()
            .enumerate()
            .map(|(i, d)| (SkillId(i as u32), d))
    }

    pub fn structures(&self) -> impl Iterator<Item = (StructureId, &ModifierDef)> {
        self.structures
            .iter()
            .enumerate()
            .map(|(i, d)| (StructureId(i as u32), d))
    }

    pub fn perks(&self) -> impl Iterator<Item = (PerkId, &PerkDef)> {
        self.perks
            .iter()
            .enumerate()
            .map(|(i, d)| (PerkId(i as u32), d))
    }

    pub fn mission_count(&self) -> usize {
        self.missions.len()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate definition name: {0}")]
    DuplicateName(String),
    #[error("mission {mission}: failure chance {chance} outside [0, 1]")]
    InvalidFailureChance { mission: String, chance: f64 },
    #[error("definition {0}: zero duration")]
    ZeroDuration(String),
    #[error("progression config: max major tier must be at least 1")]
    InvalidProgressionConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Channel, EffectKind};

    fn ember_upgrade() -> ModifierDef {
        ModifierDef {
            name: "bellows".to_string(),
            cost: Cost {
                amounts: vec![(ResourceKind::Ember, 10.0)],
                scaling: CostScaling::Exponential { factor: 1.15 },
            },
            max_level: None,
            effects: vec![Effect::new(
                Channel::Production(ResourceKind::Ember),
                EffectKind::FlatAdd(0.2),
            )],
        }
    }

    #[test]
    fn register_and_build() {
        let mut b = RegistryBuilder::new();
        let id = b.register_upgrade(ember_upgrade()).unwrap();
        let reg = b.build().unwrap();
        assert_eq!(reg.upgrade(id).unwrap().name, "bellows");
        assert!(reg.upgrade(UpgradeId(99)).is_none());
    }

    #[test]
    fn duplicate_names_rejected_across_categories() {
        let mut b = RegistryBuilder::new();
        b.register_upgrade(ember_upgrade()).unwrap();
        let mut clash = ember_upgrade();
        clash.cost.amounts.clear();
        let result = b.register_research(clash);
        assert!(matches!(result, Err(RegistryError::DuplicateName(_))));
    }

    #[test]
    fn invalid_failure_chance_rejected() {
        let mut b = RegistryBuilder::new();
        b.register_mission(MissionDef {
            name: "deep delve".to_string(),
            base_duration: 600,
            failure_chance: 1.5,
            reward: (ResourceKind::Ore, 40.0),
            rare_reward: (ResourceKind::Crystal, 5.0),
        })
        .unwrap();
        assert!(matches!(
            b.build(),
            Err(RegistryError::InvalidFailureChance { .. })
        ));
    }

    #[test]
    fn zero_duration_rejected() {
        let mut b = RegistryBuilder::new();
        b.register_artifact(ArtifactDef {
            name: "ember sigil".to_string(),
            cost: vec![(ResourceKind::Ore, 5.0)],
            base_duration: 0,
            bonus: ArtifactBonus::Production {
                resource: ResourceKind::Ember,
                mult: 1.1,
            },
        })
        .unwrap();
        assert!(matches!(b.build(), Err(RegistryError::ZeroDuration(_))));
    }

    #[test]
    fn cost_at_level_scales() {
        let cost = Cost {
            amounts: vec![(ResourceKind::Ember, 10.0), (ResourceKind::Ore, 2.0)],
            scaling: CostScaling::Exponential { factor: 2.0 },
        };
        let level2 = cost.at_level(2);
        assert_eq!(level2, vec![(ResourceKind::Ember, 40.0), (ResourceKind::Ore, 8.0)]);
    }

    #[test]
    fn empty_registry_builds() {
        let reg = RegistryBuilder::new().build().unwrap();
        assert_eq!(reg.mission_count(), 0);
        assert_eq!(reg.progression().max_major_tier, 9);
    }
}
