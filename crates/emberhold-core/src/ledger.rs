//! The resource ledger: current quantities for the five resources plus the
//! ember capacity and the sigil (meta) currency.
//!
//! Invariants maintained here:
//! - every quantity is >= 0 at all times;
//! - ember never exceeds `ember_cap` after any mutation;
//! - multi-resource debits are all-or-nothing.

use serde::{Deserialize, Serialize};

/// Ticks are the atomic unit of simulation time (one tick = one second).
pub type Ticks = u64;

// ---------------------------------------------------------------------------
// Resource kinds
// ---------------------------------------------------------------------------

/// The five resources of the economy. Ember is the primary, capacity-capped
/// resource gating progression; the other four are uncapped secondaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Ember,
    Ore,
    Crystal,
    Herb,
    Essence,
}

impl ResourceKind {
    /// All resources, in ledger storage order.
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Ember,
        ResourceKind::Ore,
        ResourceKind::Crystal,
        ResourceKind::Herb,
        ResourceKind::Essence,
    ];

    /// The four uncapped secondaries, in storage order.
    pub const SECONDARY: [ResourceKind; 4] = [
        ResourceKind::Ore,
        ResourceKind::Crystal,
        ResourceKind::Herb,
        ResourceKind::Essence,
    ];

    /// Dense index into per-resource arrays.
    pub fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Current resource holdings. Mutated by purchases, tick application, and
/// queue resolution; lives for the whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    /// Quantities indexed by [`ResourceKind::index`].
    amounts: [f64; 5],

    /// Capacity applied to ember only. Re-derived by the aggregator.
    ember_cap: f64,

    /// Sigils: the secondary currency granted by ascensions, spent on perks.
    #[serde(default)]
    pub sigils: u64,

    /// Lifetime artifacts forged.
    #[serde(default)]
    pub artifacts_forged: u64,
}

impl ResourceLedger {
    /// A fresh ledger with nothing owned and the given starting ember cap.
    pub fn new(ember_cap: f64) -> Self {
        Self {
            amounts: [0.0; 5],
            ember_cap,
            sigils: 0,
            artifacts_forged: 0,
        }
    }

    /// Current quantity of a resource.
    pub fn amount(&self, kind: ResourceKind) -> f64 {
        self.amounts[kind.index()]
    }

    /// Current ember capacity.
    pub fn ember_cap(&self) -> f64 {
        self.ember_cap
    }

    /// Replace the ember capacity. Shrinking the cap clamps ember down.
    pub fn set_ember_cap(&mut self, cap: f64) {
        self.ember_cap = cap.max(0.0);
        self.clamp_ember();
    }

    /// Add to a resource. Negative deltas are ignored; ember is clamped.
    pub fn credit(&mut self, kind: ResourceKind, delta: f64) {
        if delta <= 0.0 {
            return;
        }
        self.amounts[kind.index()] += delta;
        if kind == ResourceKind::Ember {
            self.clamp_ember();
        }
    }

    /// Whether the ledger can cover every cost in the list. Costs naming
    /// the same resource more than once are summed before the check.
    pub fn can_afford(&self, costs: &[(ResourceKind, f64)]) -> bool {
        let needed = Self::sum_costs(costs);
        ResourceKind::ALL
            .iter()
            .all(|kind| self.amounts[kind.index()] >= needed[kind.index()])
    }

    /// Deduct every cost, or deduct nothing. Returns false if any resource
    /// falls short of its summed total.
    pub fn debit_all(&mut self, costs: &[(ResourceKind, f64)]) -> bool {
        if !self.can_afford(costs) {
            return false;
        }
        let needed = Self::sum_costs(costs);
        for kind in ResourceKind::ALL {
            let slot = &mut self.amounts[kind.index()];
            *slot = (*slot - needed[kind.index()]).max(0.0);
        }
        true
    }

    fn sum_costs(costs: &[(ResourceKind, f64)]) -> [f64; 5] {
        let mut needed = [0.0; 5];
        for &(kind, amount) in costs {
            needed[kind.index()] += amount.max(0.0);
        }
        needed
    }

    /// Credit without the ember clamp. Test fixtures only.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn grant_unclamped(&mut self, kind: ResourceKind, amount: f64) {
        self.amounts[kind.index()] += amount.max(0.0);
    }

    /// Zero out ember (ascension resets the primary resource).
    pub fn reset_ember(&mut self) {
        self.amounts[ResourceKind::Ember.index()] = 0.0;
    }

    fn clamp_ember(&mut self) {
        let ember = &mut self.amounts[ResourceKind::Ember.index()];
        *ember = ember.clamp(0.0, self.ember_cap);
    }
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new(0.0)
    }
}
