//! The session engine: owns the whole game state and orchestrates every
//! mutating action and the fixed-cadence tick pipeline.
//!
//! # Architecture
//!
//! The `Engine` owns:
//! - the immutable content [`Registry`],
//! - the [`GameState`] aggregate (ledger, modifiers, progression, queues,
//!   pity counters, RNG, last tick),
//! - the cached [`Derived`] output of the aggregator,
//! - a [`NotificationBuffer`] drained by the host.
//!
//! There are no module-level globals: hosts construct an `Engine` and route
//! every mutation through it. Multi-threaded hosts must serialize mutation
//! through a single writer; the engine itself is strictly synchronous.
//!
//! # Tick Pipeline
//!
//! Each `step()` advances one simulated second:
//! 1. **Resolve** -- every due entry across the three queues (forge, brew,
//!    expedition), in deterministic order.
//! 2. **Produce** -- apply cached rates (times active buffs) for one second.
//! 3. **Clamp** -- ember is clamped to capacity.
//! 4. **Bookkeeping** -- prune expired buffs, advance the tick counter.
//!
//! # Recompute Discipline
//!
//! Every mutating action ends with a full aggregator recompute. Recompute
//! is a cheap, pure, total pass; nothing is patched incrementally, so the
//! cached [`Derived`] can never drift from the owned state.

use crate::brewing::{self, BrewTask};
use crate::crafting::{self, CraftTask};
use crate::error::ActionError;
use crate::event::{Notification, NotificationBuffer, NotificationCategory};
use crate::id::*;
use crate::ledger::{ResourceKind, ResourceLedger, Ticks};
use crate::missions::{self, MissionTask, PityCounters};
use crate::modifier::{self, ActiveBuff, Derived, FinalRates, Helper, HelperTrait, ModifierState};
use crate::progression::{self, Advancement, ProgressionState};
use crate::queue::TaskQueue;
use crate::registry::Registry;
use crate::rng::SimRng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Game state aggregate
// ---------------------------------------------------------------------------

/// Everything that persists across a session. Serialized wholesale into the
/// snapshot; every field defaults so older saves restore cleanly.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GameState {
    #[serde(default)]
    pub ledger: ResourceLedger,
    #[serde(default)]
    pub modifiers: ModifierState,
    #[serde(default)]
    pub progression: ProgressionState,
    #[serde(default)]
    pub craft_queue: TaskQueue<CraftTask>,
    #[serde(default)]
    pub brew_queue: TaskQueue<BrewTask>,
    #[serde(default)]
    pub mission_queue: TaskQueue<MissionTask>,
    #[serde(default)]
    pub pity: PityCounters,
    #[serde(default)]
    pub rng: SimRng,
    #[serde(default)]
    pub last_tick: Ticks,
}

// ---------------------------------------------------------------------------
// Read-only views
// ---------------------------------------------------------------------------

/// Which task queue a query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueKind {
    Craft,
    Brew,
    Mission,
}

/// Read-only view of a live queue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntryView {
    pub name: String,
    pub enqueued_at: Ticks,
    pub resolves_at: Ticks,
    pub duration: Ticks,
}

/// Read-only view of the progression ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionSnapshot {
    pub major: u32,
    pub minor: u32,
    pub cumulative_mult: f64,
    pub advancements: u64,
    /// Effective ember cost of the next transition.
    pub next_cost: f64,
    pub at_peak: bool,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The core simulation engine.
#[derive(Debug)]
pub struct Engine {
    pub(crate) registry: Registry,
    pub(crate) state: GameState,
    pub(crate) derived: Derived,
    pub(crate) notifications: NotificationBuffer,
}

impl Engine {
    /// A fresh new-game engine over the given content.
    pub fn new(registry: Registry, seed: u64) -> Self {
        let state = GameState {
            rng: SimRng::new(seed),
            ..Default::default()
        };
        let derived = modifier::recompute(&registry, &state.modifiers, &state.progression);
        let mut engine = Self {
            registry,
            state,
            derived,
            notifications: NotificationBuffer::default(),
        };
        engine.state.ledger.set_ember_cap(engine.derived.rates.ember_cap);
        engine
    }

    /// Rebuild from a restored state (snapshot path).
    pub(crate) fn from_state(registry: Registry, state: GameState) -> Self {
        let derived = modifier::recompute(&registry, &state.modifiers, &state.progression);
        let mut engine = Self {
            registry,
            state,
            derived,
            notifications: NotificationBuffer::default(),
        };
        engine.state.ledger.set_ember_cap(engine.derived.rates.ember_cap);
        engine
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The cached aggregator output. Buffs are not baked in; see
    /// [`Engine::effective_rate`].
    pub fn derived(&self) -> &Derived {
        &self.derived
    }

    pub fn final_rates(&self) -> &FinalRates {
        &self.derived.rates
    }

    /// A resource's rate with currently-active buffs applied, as the next
    /// tick would apply it.
    pub fn effective_rate(&self, kind: ResourceKind) -> f64 {
        let now = self.state.last_tick + 1;
        self.derived.rates.rate(kind) * self.state.modifiers.rate_buff_mult(kind, now)
    }

    pub fn queue_snapshot(&self, kind: QueueKind) -> Vec<QueueEntryView> {
        let mut views: Vec<QueueEntryView> = match kind {
            QueueKind::Craft => self
                .state
                .craft_queue
                .iter()
                .map(|(_, e)| QueueEntryView {
                    name: self
                        .registry
                        .artifact(e.payload.artifact)
                        .map_or_else(String::new, |d| d.name.clone()),
                    enqueued_at: e.enqueued_at,
                    resolves_at: e.resolves_at,
                    duration: e.duration,
                })
                .collect(),
            QueueKind::Brew => self
                .state
                .brew_queue
                .iter()
                .map(|(_, e)| QueueEntryView {
                    name: self
                        .registry
                        .tonic(e.payload.tonic)
                        .map_or_else(String::new, |d| d.name.clone()),
                    enqueued_at: e.enqueued_at,
                    resolves_at: e.resolves_at,
                    duration: e.duration,
                })
                .collect(),
            QueueKind::Mission => self
                .state
                .mission_queue
                .iter()
                .map(|(_, e)| QueueEntryView {
                    name: self
                        .registry
                        .mission(e.payload.mission)
                        .map_or_else(String::new, |d| d.name.clone()),
                    enqueued_at: e.enqueued_at,
                    resolves_at: e.resolves_at,
                    duration: e.duration,
                })
                .collect(),
        };
        views.sort_by(|a, b| {
            a.resolves_at
                .cmp(&b.resolves_at)
                .then_with(|| a.enqueued_at.cmp(&b.enqueued_at))
        });
        views
    }

    pub fn progression_snapshot(&self) -> ProgressionSnapshot {
        let p = &self.state.progression;
        ProgressionSnapshot {
            major: p.major,
            minor: p.minor,
            cumulative_mult: p.cumulative_mult,
            advancements: p.advancements,
            next_cost: progression::unmodified_cost(p.major, p.minor) * self.derived.tier_discount,
            at_peak: p.at_peak(self.registry.progression()),
        }
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    // -----------------------------------------------------------------------
    // Manual gathering
    // -----------------------------------------------------------------------

    /// Stoke the forge: credit the tap value (plus any flat stoke buffs).
    pub fn tap(&mut self) {
        let now = self.state.last_tick + 1;
        let value = self.derived.rates.tap_value + self.state.modifiers.tap_buff_flat(now);
        self.state.ledger.credit(ResourceKind::Ember, value);
    }

    // -----------------------------------------------------------------------
    // Purchases
    // -----------------------------------------------------------------------

    pub fn buy_upgrade(&mut self, id: UpgradeId) -> Result<(), ActionError> {
        let def = self
            .registry
            .upgrade(id)
            .ok_or(ActionError::InvalidState("unknown definition"))?;
        let level = self.state.modifiers.upgrades.get(&id).copied().unwrap_or(0);
        Self::check_max_level(def.max_level, level)?;
        let cost = def.cost.at_level(level);
        if !self.state.ledger.debit_all(&cost) {
            return Err(ActionError::InsufficientFunds);
        }
        *self.state.modifiers.upgrades.entry(id).or_insert(0) += 1;
        self.recompute();
        Ok(())
    }

    pub fn buy_research(&mut self, id: ResearchId) -> Result<(), ActionError> {
        let def = self
            .registry
            .research(id)
            .ok_or(ActionError::InvalidState("unknown definition"))?;
        let level = self.state.modifiers.research.get(&id).copied().unwrap_or(0);
        Self::check_max_level(def.max_level, level)?;
        let cost = def.cost.at_level(level);
        if !self.state.ledger.debit_all(&cost) {
            return Err(ActionError::InsufficientFunds);
        }
        *self.state.modifiers.research.entry(id).or_insert(0) += 1;
        self.recompute();
        Ok(())
    }

    pub fn buy_skill(&mut self, id: SkillId) -> Result<(), ActionError> {
        let def = self
            .registry
            .skill(id)
            .ok_or(ActionError::InvalidState("unknown definition"))?;
        let level = self.state.modifiers.skills.get(&id).copied().unwrap_or(0);
        Self::check_max_level(def.max_level, level)?;
        let cost = def.cost.at_level(level);
        if !self.state.ledger.debit_all(&cost) {
            return Err(ActionError::InsufficientFunds);
        }
        *self.state.modifiers.skills.entry(id).or_insert(0) += 1;
        self.recompute();
        Ok(())
    }

    pub fn buy_structure(&mut self, id: StructureId) -> Result<(), ActionError> {
        let def = self
            .registry
            .structure(id)
            .ok_or(ActionError::InvalidState("unknown definition"))?;
        let level = self
            .state
            .modifiers
            .structures
            .get(&id)
            .copied()
            .unwrap_or(0);
        Self::check_max_level(def.max_level, level)?;
        let cost = def.cost.at_level(level);
        if !self.state.ledger.debit_all(&cost) {
            return Err(ActionError::InsufficientFunds);
        }
        *self.state.modifiers.structures.entry(id).or_insert(0) += 1;
        self.recompute();
        Ok(())
    }

    /// Meta-perks are priced in sigils, at a flat cost per level.
    pub fn buy_perk(&mut self, id: PerkId) -> Result<(), ActionError> {
        let def = self
            .registry
            .perk(id)
            .ok_or(ActionError::InvalidState("unknown definition"))?;
        let level = self.state.modifiers.perks.get(&id).copied().unwrap_or(0);
        Self::check_max_level(def.max_level, level)?;
        if self.state.ledger.sigils < def.sigil_cost {
            return Err(ActionError::InsufficientFunds);
        }
        self.state.ledger.sigils -= def.sigil_cost;
        *self.state.modifiers.perks.entry(id).or_insert(0) += 1;
        self.recompute();
        Ok(())
    }

    fn check_max_level(max: Option<u32>, level: u32) -> Result<(), ActionError> {
        if max.is_some_and(|m| level >= m) {
            return Err(ActionError::InvalidState("max level reached"));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    pub fn recruit_helper(
        &mut self,
        class: HelperClassId,
        traits: Vec<HelperTrait>,
    ) -> Result<HelperId, ActionError> {
        let def = self
            .registry
            .helper_class(class)
            .ok_or(ActionError::InvalidState("unknown definition"))?;
        let cost = def.recruit_cost.clone();
        if !self.state.ledger.debit_all(&cost) {
            return Err(ActionError::InsufficientFunds);
        }
        let id = self.state.modifiers.helpers.insert(Helper {
            class,
            level: 1,
            traits,
        });
        self.recompute();
        Ok(id)
    }

    pub fn train_helper(&mut self, id: HelperId) -> Result<(), ActionError> {
        let helper = self
            .state
            .modifiers
            .helpers
            .get(id)
            .ok_or(ActionError::InvalidState("unknown helper"))?;
        let def = self
            .registry
            .helper_class(helper.class)
            .ok_or(ActionError::InvalidState("unknown definition"))?;
        // Restored saves may carry level 0 helpers; charge the base cost.
        let cost = def.training_cost.at_level(helper.level.saturating_sub(1));
        if !self.state.ledger.debit_all(&cost) {
            return Err(ActionError::InsufficientFunds);
        }
        self.state.modifiers.helpers[id].level += 1;
        self.recompute();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Saga boons
    // -----------------------------------------------------------------------

    /// Apply a one-shot narrative reward. The deltas are baked into the
    /// running totals; a second application of the same boon is rejected.
    pub fn apply_boon(&mut self, id: BoonId) -> Result<(), ActionError> {
        let def = self
            .registry
            .boon(id)
            .ok_or(ActionError::InvalidState("unknown definition"))?;
        if self.state.modifiers.boons.contains(&id) {
            return Err(ActionError::InvalidState("boon already applied"));
        }
        let narrative = &mut self.state.modifiers.narrative;
        narrative.rate_mult *= def.rate_mult;
        narrative.cost_mult *= def.cost_mult;
        narrative.mission_time_mult *= def.mission_time_mult;
        narrative.reward_mult *= def.reward_mult;
        self.state.modifiers.boons.insert(id);
        self.recompute();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Progression
    // -----------------------------------------------------------------------

    /// Attempt the next ladder transition (breakthrough or ascension).
    pub fn advance_tier(&mut self) -> Result<Advancement, ActionError> {
        let result = progression::advance(
            &mut self.state.progression,
            &mut self.state.ledger,
            self.registry.progression(),
            self.derived.tier_discount,
            self.derived.ascension_reward_mult,
        )?;
        let tick = self.state.last_tick;
        match &result {
            Advancement::Breakthrough { major, minor } => {
                self.notifications.push(
                    NotificationCategory::Progression,
                    format!("breakthrough: tier {major}.{minor}"),
                    tick,
                );
            }
            Advancement::Ascension {
                major,
                sigils,
                unlocked,
                ..
            } => {
                self.notifications.push(
                    NotificationCategory::Progression,
                    format!("ascended to tier {major} (+{sigils} sigils)"),
                    tick,
                );
                for feature in unlocked {
                    self.notifications.push(
                        NotificationCategory::Unlock,
                        format!("unlocked: {feature}"),
                        tick,
                    );
                }
            }
        }
        self.recompute();
        Ok(result)
    }

    // -----------------------------------------------------------------------
    // Queues
    // -----------------------------------------------------------------------

    /// Start forging an artifact. The duration and discounted cost are
    /// captured now; later discounts never touch this entry.
    pub fn enqueue_craft(&mut self, artifact: ArtifactId) -> Result<EntryId, ActionError> {
        let def = self
            .registry
            .artifact(artifact)
            .ok_or(ActionError::InvalidState("unknown definition"))?;
        if self.state.craft_queue.len() >= self.derived.craft_slots as usize {
            return Err(ActionError::CapacityExceeded);
        }
        let cost = crafting::discounted_cost(def, self.derived.craft_cost_mult);
        let duration = def.base_duration;
        if !self.state.ledger.debit_all(&cost) {
            return Err(ActionError::InsufficientFunds);
        }
        let id = self
            .state
            .craft_queue
            .enqueue(CraftTask { artifact }, self.state.last_tick, duration);
        self.recompute();
        Ok(id)
    }

    /// Start brewing a tonic. Costs are deducted up front.
    pub fn enqueue_brew(&mut self, tonic: TonicId) -> Result<EntryId, ActionError> {
        let def = self
            .registry
            .tonic(tonic)
            .ok_or(ActionError::InvalidState("unknown definition"))?;
        let cost = def.cost.clone();
        let duration = brewing::brew_duration(def.base_duration, self.derived.brew_time_mult);
        if !self.state.ledger.debit_all(&cost) {
            return Err(ActionError::InsufficientFunds);
        }
        let id = self
            .state
            .brew_queue
            .enqueue(BrewTask { tonic }, self.state.last_tick, duration);
        self.recompute();
        Ok(id)
    }

    /// Launch an expedition. Requires at least one recruited helper and no
    /// other active expedition of the same type.
    pub fn launch_mission(&mut self, mission: MissionId) -> Result<EntryId, ActionError> {
        let def = self
            .registry
            .mission(mission)
            .ok_or(ActionError::InvalidState("unknown definition"))?;
        if self.state.modifiers.helpers.is_empty() {
            return Err(ActionError::InvalidState("no helpers recruited"));
        }
        if self.state.mission_queue.any(|t| t.mission == mission) {
            return Err(ActionError::InvalidState("expedition already active"));
        }
        let duration =
            missions::mission_duration(def.base_duration, self.derived.mission_time_mult);
        let id = self
            .state
            .mission_queue
            .enqueue(MissionTask { mission }, self.state.last_tick, duration);
        self.recompute();
        Ok(id)
    }

    /// Drink a brewed tonic from the inventory, installing its buff.
    pub fn drink_tonic(&mut self, tonic: TonicId) -> Result<(), ActionError> {
        let def = self
            .registry
            .tonic(tonic)
            .ok_or(ActionError::InvalidState("unknown definition"))?;
        let count = self.state.modifiers.tonics.get(&tonic).copied().unwrap_or(0);
        if count == 0 {
            return Err(ActionError::InvalidState("tonic not in inventory"));
        }
        let buff = ActiveBuff {
            effect: def.buff,
            expires_at: self.state.last_tick + def.buff_duration,
        };
        self.state.modifiers.tonics.insert(tonic, count - 1);
        self.state.modifiers.buffs.push(buff);
        self.recompute();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tick pipeline
    // -----------------------------------------------------------------------

    /// Advance one simulated second.
    pub fn step(&mut self) {
        let now = self.state.last_tick + 1;

        self.resolve_due(now);

        // Production for one second: cached rates times active buffs.
        for kind in ResourceKind::ALL {
            let rate =
                self.derived.rates.rate(kind) * self.state.modifiers.rate_buff_mult(kind, now);
            self.state.ledger.credit(kind, rate);
        }

        self.state.modifiers.prune_buffs(now);
        self.state.last_tick = now;
    }

    /// Advance `n` simulated seconds.
    pub fn advance(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Resolve every due entry across the three queues. Resolution order is
    /// fixed: forge, brew, expedition; within a queue, by resolution time.
    fn resolve_due(&mut self, now: Ticks) {
        let mut touched = false;

        for (_, entry) in self.state.craft_queue.take_due(now) {
            if let Some(def) = self.registry.artifact(entry.payload.artifact) {
                crafting::apply_bonus(&mut self.state.modifiers.artifacts, def.bonus);
                self.state.ledger.artifacts_forged += 1;
                self.notifications.push(
                    NotificationCategory::Craft,
                    format!("forged: {}", def.name),
                    now,
                );
                touched = true;
            }
        }

        for (_, entry) in self.state.brew_queue.take_due(now) {
            if let Some(def) = self.registry.tonic(entry.payload.tonic) {
                *self.state.modifiers.tonics.entry(entry.payload.tonic).or_insert(0) += 1;
                self.notifications.push(
                    NotificationCategory::Brew,
                    format!("brewed: {}", def.name),
                    now,
                );
                touched = true;
            }
        }

        // Artifacts forged this tick must count for expeditions resolving on
        // the same tick, so refresh the cache before reading the multipliers.
        if touched {
            self.recompute();
            touched = false;
        }

        let risk_mult = self.derived.mission_risk_mult;
        let yield_mult = self.derived.mission_yield_mult;
        let threshold = self.state.modifiers.pity_threshold();
        for (_, entry) in self.state.mission_queue.take_due(now) {
            let mission = entry.payload.mission;
            if let Some(def) = self.registry.mission(mission) {
                let outcome = missions::resolve(
                    def,
                    risk_mult,
                    yield_mult,
                    threshold,
                    &mut self.state.pity,
                    mission,
                    &mut self.state.rng,
                );
                if let Some((kind, amount)) = outcome.reward {
                    self.state.ledger.credit(kind, amount);
                }
                if let Some((kind, amount)) = outcome.rare {
                    self.state.ledger.credit(kind, amount);
                }
                let text = match (outcome.success, outcome.rare.is_some()) {
                    (true, true) => format!("{}: success, rare find!", def.name),
                    (true, false) => format!("{}: success", def.name),
                    (false, true) => format!("{}: failed, but a rare find", def.name),
                    (false, false) => format!("{}: failed", def.name),
                };
                self.notifications
                    .push(NotificationCategory::Mission, text, now);
                touched = true;
            }
        }

        if touched {
            self.recompute();
        }
    }

    // -----------------------------------------------------------------------
    // Aggregation
    // -----------------------------------------------------------------------

    /// Total recompute of the cached derived values; re-derives the ember
    /// capacity as part of the pass.
    pub(crate) fn recompute(&mut self) {
        self.derived =
            modifier::recompute(&self.registry, &self.state.modifiers, &self.state.progression);
        self.state.ledger.set_ember_cap(self.derived.rates.ember_cap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixture;

    #[test]
    fn fresh_engine_runs_at_base_rates() {
        let fx = fixture(1);
        let rates = fx.engine.final_rates();
        assert!((rates.ember_per_sec - 0.1).abs() < 1e-12);
        assert!((rates.tap_value - 1.0).abs() < 1e-12);
        // Base cap: first tier cost (100) times ten.
        assert!((rates.ember_cap - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn production_accrues_per_tick() {
        let mut fx = fixture(1);
        fx.engine.advance(100);
        let ember = fx.engine.state().ledger.amount(ResourceKind::Ember);
        assert!((ember - 10.0).abs() < 1e-9);
        assert_eq!(fx.engine.state().last_tick, 100);
    }

    #[test]
    fn tap_credits_tap_value() {
        let mut fx = fixture(1);
        fx.engine.tap();
        fx.engine.tap();
        assert!((fx.engine.state().ledger.amount(ResourceKind::Ember) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn buying_an_upgrade_costs_and_recomputes() {
        let mut fx = fixture(1);
        fx.engine.grant(ResourceKind::Ember, 100.0);
        fx.engine.buy_upgrade(fx.bellows).unwrap();
        let rates = fx.engine.final_rates();
        assert!((rates.ember_per_sec - 0.5).abs() < 1e-12);
        assert!((fx.engine.state().ledger.amount(ResourceKind::Ember) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn purchases_fail_cleanly_when_broke() {
        let mut fx = fixture(1);
        assert_eq!(
            fx.engine.buy_upgrade(fx.bellows),
            Err(ActionError::InsufficientFunds)
        );
        assert_eq!(fx.engine.state().ledger.amount(ResourceKind::Ember), 0.0);
    }

    #[test]
    fn max_level_is_enforced() {
        let mut fx = fixture(1);
        // Each purchase recomputes and clamps ember to the cap, so the
        // funding has to be topped up per iteration.
        for _ in 0..10 {
            fx.engine.grant(ResourceKind::Ember, 1e12);
            fx.engine.buy_upgrade(fx.draft_wheel).unwrap();
        }
        assert!(matches!(
            fx.engine.buy_upgrade(fx.draft_wheel),
            Err(ActionError::InvalidState(_))
        ));
    }

    #[test]
    fn perks_spend_sigils() {
        let mut fx = fixture(1);
        assert_eq!(
            fx.engine.buy_perk(fx.gilded_molds),
            Err(ActionError::InsufficientFunds)
        );
        fx.engine.grant_sigils(3);
        fx.engine.buy_perk(fx.gilded_molds).unwrap();
        assert_eq!(fx.engine.state().ledger.sigils, 2);
        assert!((fx.engine.derived().craft_cost_mult - 0.9).abs() < 1e-12);
    }

    #[test]
    fn helpers_raise_rates_when_recruited_and_trained() {
        let mut fx = fixture(1);
        fx.engine.grant(ResourceKind::Ember, 1000.0);
        let id = fx.engine.recruit_helper(fx.smith, Vec::new()).unwrap();
        // Smith: 0.5 ember/s at level 1.
        assert!((fx.engine.final_rates().ember_per_sec - 0.6).abs() < 1e-12);
        fx.engine.train_helper(id).unwrap();
        assert!((fx.engine.final_rates().ember_per_sec - 1.1).abs() < 1e-12);
    }

    #[test]
    fn boons_apply_once() {
        let mut fx = fixture(1);
        fx.engine.apply_boon(fx.favor_of_the_hold).unwrap();
        assert!((fx.engine.final_rates().ember_per_sec - 0.125).abs() < 1e-12);
        assert_eq!(
            fx.engine.apply_boon(fx.favor_of_the_hold),
            Err(ActionError::InvalidState("boon already applied"))
        );
    }

    #[test]
    fn craft_queue_respects_slot_capacity() {
        let mut fx = fixture(1);
        fx.engine.grant(ResourceKind::Ore, 1000.0);
        fx.engine.enqueue_craft(fx.ember_crown).unwrap();
        assert_eq!(
            fx.engine.enqueue_craft(fx.ember_crown),
            Err(ActionError::CapacityExceeded)
        );
    }

    #[test]
    fn craft_resolution_applies_permanent_bonus() {
        let mut fx = fixture(1);
        fx.engine.grant(ResourceKind::Ore, 1000.0);
        let base = fx.engine.final_rates().ember_per_sec;
        fx.engine.enqueue_craft(fx.ember_crown).unwrap();
        fx.engine.advance(600);
        assert!((fx.engine.final_rates().ember_per_sec - base * 1.1).abs() < 1e-12);
        assert_eq!(fx.engine.state().ledger.artifacts_forged, 1);
        assert!(fx.engine.state().craft_queue.is_empty());
    }

    #[test]
    fn brew_then_drink_installs_a_buff() {
        let mut fx = fixture(1);
        fx.engine.grant(ResourceKind::Herb, 100.0);
        assert_eq!(
            fx.engine.drink_tonic(fx.hearth_tonic),
            Err(ActionError::InvalidState("tonic not in inventory"))
        );
        fx.engine.enqueue_brew(fx.hearth_tonic).unwrap();
        fx.engine.advance(120);
        fx.engine.drink_tonic(fx.hearth_tonic).unwrap();
        let base = fx.engine.final_rates().ember_per_sec;
        assert!((fx.engine.effective_rate(ResourceKind::Ember) - base * 1.5).abs() < 1e-12);
        // Cached rates never bake the buff in.
        assert!((fx.engine.final_rates().ember_per_sec - base).abs() < 1e-12);
    }

    #[test]
    fn missions_need_helpers_and_reject_duplicates() {
        let mut fx = fixture(1);
        assert_eq!(
            fx.engine.launch_mission(fx.deep_delve),
            Err(ActionError::InvalidState("no helpers recruited"))
        );
        fx.engine.grant(ResourceKind::Ember, 100.0);
        fx.engine.recruit_helper(fx.smith, Vec::new()).unwrap();
        fx.engine.launch_mission(fx.deep_delve).unwrap();
        assert_eq!(
            fx.engine.launch_mission(fx.deep_delve),
            Err(ActionError::InvalidState("expedition already active"))
        );
        // A different expedition type may run concurrently.
        fx.engine.launch_mission(fx.herb_walk).unwrap();
    }

    #[test]
    fn advance_tier_emits_notifications() {
        let mut fx = fixture(1);
        fx.engine.grant(ResourceKind::Ember, 100.0);
        fx.engine.advance_tier().unwrap();
        let notes = fx.engine.drain_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].category, NotificationCategory::Progression);
        assert_eq!(fx.engine.progression_snapshot().minor, 1);
    }

    #[test]
    fn training_a_level_zero_helper_charges_the_base_cost() {
        use crate::registry::Registry;

        // Older saves can carry a level 0 helper; training must not panic
        // and charges the level-1 cost.
        fn engine_with_level_zero_helper(registry: Registry, class: HelperClassId) -> Engine {
            let mut state = GameState::default();
            state.modifiers.helpers.insert(Helper {
                class,
                level: 0,
                traits: Vec::new(),
            });
            Engine::from_state(registry, state)
        }

        let content = crate::test_utils::fixture_registry();
        let mut engine = engine_with_level_zero_helper(content.registry, content.smith);
        let id = engine
            .state()
            .modifiers
            .helpers
            .keys()
            .next()
            .expect("seeded helper");

        engine.grant(ResourceKind::Ember, 100.0);
        engine.train_helper(id).unwrap();
        assert_eq!(engine.state().modifiers.helpers[id].level, 1);
        // Base training cost for the smith is 25 ember.
        assert!((engine.state().ledger.amount(ResourceKind::Ember) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn same_tick_artifact_counts_for_expedition_rolls() {
        use crate::effect::CostScaling;
        use crate::registry::{
            ArtifactBonus, ArtifactDef, Cost, HelperClassDef, MissionDef, RegistryBuilder,
        };

        // An artifact that eliminates expedition risk, resolving on the same
        // tick as a guaranteed-failure expedition: the fresh multiplier must
        // apply to that roll.
        let mut b = RegistryBuilder::new();
        let charm = b
            .register_artifact(ArtifactDef {
                name: "nullifying charm".to_string(),
                cost: vec![(ResourceKind::Ore, 10.0)],
                base_duration: 100,
                bonus: ArtifactBonus::RiskReduction { mult: 0.0 },
            })
            .unwrap();
        let trek = b
            .register_mission(MissionDef {
                name: "doomed trek".to_string(),
                base_duration: 100,
                failure_chance: 1.0,
                reward: (ResourceKind::Herb, 10.0),
                rare_reward: (ResourceKind::Crystal, 1.0),
            })
            .unwrap();
        let porter = b
            .register_helper_class(HelperClassDef {
                name: "porter".to_string(),
                base_yield: [0.0; 5],
                recruit_cost: vec![(ResourceKind::Ember, 10.0)],
                training_cost: Cost {
                    amounts: vec![(ResourceKind::Ember, 10.0)],
                    scaling: CostScaling::Linear { increment: 1.0 },
                },
            })
            .unwrap();

        let mut engine = Engine::new(b.build().unwrap(), 3);
        engine.grant(ResourceKind::Ember, 100.0);
        engine.grant(ResourceKind::Ore, 100.0);
        engine.recruit_helper(porter, Vec::new()).unwrap();
        engine.enqueue_craft(charm).unwrap();
        engine.launch_mission(trek).unwrap();
        engine.advance(100);

        assert_eq!(engine.state().ledger.artifacts_forged, 1);
        assert_eq!(engine.derived().mission_risk_mult, 0.0);
        assert!((engine.state().ledger.amount(ResourceKind::Herb) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn queue_snapshot_reports_names_and_times() {
        let mut fx = fixture(1);
        fx.engine.grant(ResourceKind::Herb, 100.0);
        fx.engine.set_tick(10);
        fx.engine.enqueue_brew(fx.hearth_tonic).unwrap();
        let view = fx.engine.queue_snapshot(QueueKind::Brew);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].name, "hearth tonic");
        assert_eq!(view[0].enqueued_at, 10);
        assert_eq!(view[0].resolves_at, 130);
        assert!(fx.engine.queue_snapshot(QueueKind::Craft).is_empty());
    }
}
