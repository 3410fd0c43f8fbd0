//! Emberhold Core -- the deterministic simulation engine for the Emberhold
//! idle-forge game.
//!
//! This crate provides the resource economy, the modifier aggregation
//! engine, the tiered progression ladder, the timed task queues (forging,
//! brewing, expeditions), offline catch-up, and versioned snapshots. It
//! contains no rendering, input, or platform code; hosts drive it through
//! [`engine::Engine`] and drain its notification buffer.
//!
//! # Tick Pipeline
//!
//! Each call to [`engine::Engine::step`] advances the simulation by one
//! second through the following phases:
//!
//! 1. **Resolve** -- Complete every due queue entry (forge, brew,
//!    expedition), in deterministic order.
//! 2. **Produce** -- Credit one second of cached production, scaled by
//!    active buffs.
//! 3. **Clamp** -- Ember is clamped to the derived capacity.
//! 4. **Bookkeeping** -- Prune expired buffs and advance the tick counter.
//!
//! # Recompute Discipline
//!
//! Owned state (levels, helpers, artifacts, progression) and derived state
//! (rates, discounts, caps) are strictly separated. Derived values are
//! produced only by the total recompute pass in [`modifier::recompute`],
//! which the engine re-runs after every mutating action; nothing is patched
//! incrementally, so caches can never drift.
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- Session controller: actions, tick driver, queries.
//! - [`ledger::ResourceLedger`] -- The five resource quantities, the ember
//!   capacity, and the sigil currency.
//! - [`modifier::ModifierState`] / [`modifier::Derived`] -- Owned modifier
//!   sources and the aggregated output.
//! - [`progression::ProgressionState`] -- The major/minor tier ladder with
//!   breakthroughs and ascensions.
//! - [`queue::TaskQueue`] -- Generic fixed-resolution-time task queue.
//! - [`registry::Registry`] -- Immutable content definitions (frozen at
//!   startup).
//! - [`serialize`] -- Versioned JSON snapshot support.

pub mod brewing;
pub mod crafting;
#[cfg(feature = "data-loader")]
pub mod data_loader;
pub mod effect;
pub mod engine;
pub mod error;
pub mod event;
pub mod id;
pub mod ledger;
pub mod missions;
pub mod modifier;
pub mod offline;
pub mod progression;
pub mod queue;
pub mod registry;
pub mod rng;
pub mod serialize;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
