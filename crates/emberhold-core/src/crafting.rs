//! Forging: the crafting instantiation of the task queue.
//!
//! Enqueue requires a free slot (slot capacity defaults to 1, extendable by
//! `CraftSlots` effects) and the discounted resource cost, deducted up
//! front. Resolution permanently applies the artifact's bonus to the
//! artifact multiplier table and bumps the lifetime forged counter.

use crate::ledger::ResourceKind;
use crate::modifier::ArtifactTable;
use crate::registry::{ArtifactBonus, ArtifactDef};
use crate::id::ArtifactId;
use serde::{Deserialize, Serialize};

/// Payload of a live forge entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftTask {
    pub artifact: ArtifactId,
}

/// The artifact's cost under the current forge discount.
pub fn discounted_cost(def: &ArtifactDef, craft_cost_mult: f64) -> Vec<(ResourceKind, f64)> {
    def.cost
        .iter()
        .map(|&(kind, amount)| (kind, amount * craft_cost_mult))
        .collect()
}

/// Fold a completed artifact's bonus into the permanent table.
pub fn apply_bonus(table: &mut ArtifactTable, bonus: ArtifactBonus) {
    match bonus {
        ArtifactBonus::Production { resource, mult } => {
            table.production[resource.index()] *= mult;
        }
        ArtifactBonus::RiskReduction { mult } => {
            table.mission_risk = (table.mission_risk * mult).clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(bonus: ArtifactBonus) -> ArtifactDef {
        ArtifactDef {
            name: "ember crown".to_string(),
            cost: vec![(ResourceKind::Ore, 100.0), (ResourceKind::Crystal, 20.0)],
            base_duration: 600,
            bonus,
        }
    }

    #[test]
    fn discount_scales_every_cost_entry() {
        let def = artifact(ArtifactBonus::RiskReduction { mult: 0.9 });
        let cost = discounted_cost(&def, 0.5);
        assert_eq!(cost, vec![(ResourceKind::Ore, 50.0), (ResourceKind::Crystal, 10.0)]);
    }

    #[test]
    fn production_bonus_compounds_in_table() {
        let mut table = ArtifactTable::default();
        apply_bonus(
            &mut table,
            ArtifactBonus::Production {
                resource: ResourceKind::Herb,
                mult: 1.2,
            },
        );
        apply_bonus(
            &mut table,
            ArtifactBonus::Production {
                resource: ResourceKind::Herb,
                mult: 1.5,
            },
        );
        assert!((table.production[ResourceKind::Herb.index()] - 1.8).abs() < 1e-12);
        assert_eq!(table.mission_risk, 1.0);
    }

    #[test]
    fn risk_reduction_never_goes_negative() {
        let mut table = ArtifactTable::default();
        apply_bonus(&mut table, ArtifactBonus::RiskReduction { mult: 0.5 });
        apply_bonus(&mut table, ArtifactBonus::RiskReduction { mult: 0.5 });
        assert_eq!(table.mission_risk, 0.25);
        apply_bonus(&mut table, ArtifactBonus::RiskReduction { mult: 0.0 });
        assert_eq!(table.mission_risk, 0.0);
    }
}
