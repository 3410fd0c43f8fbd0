//! Offline catch-up: a single analytic pass over the away interval.
//!
//! Resuming never replays ticks. Elapsed wall time is clamped to the
//! catch-up window (8 hours plus any `OfflineHours` effects), each cached
//! rate is multiplied by the clamped seconds and the offline-yield bonus,
//! and the result is credited through the ledger (which clamps ember to
//! capacity). A short ember surge buff rewards the return. Queue entries
//! that became due while away resolve on the first live tick after resume.

use crate::effect::BuffEffect;
use crate::engine::Engine;
use crate::event::NotificationCategory;
use crate::ledger::{ResourceKind, Ticks};
use crate::modifier::ActiveBuff;

/// Base catch-up window, in hours.
pub const BASE_OFFLINE_HOURS: f64 = 8.0;
/// Ember production surge granted on resume.
pub const RESUME_SURGE_BONUS: f64 = 0.2;
/// Surge duration, in ticks.
pub const RESUME_SURGE_TICKS: Ticks = 300;

/// What the catch-up pass granted, for the host's "welcome back" screen.
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineReport {
    /// Seconds actually simulated after clamping.
    pub simulated: Ticks,
    /// Seconds the clamp discarded.
    pub discarded: Ticks,
    /// Credited gains, indexed by [`ResourceKind::index`]. Ember reflects
    /// the pre-clamp credit; the ledger may have capped it.
    pub gains: [f64; 5],
}

impl Engine {
    /// Catch up to `now` (in ticks since the epoch of `last_tick`).
    ///
    /// A `now` at or before the last simulated tick is a no-op report;
    /// clocks that run backwards are not an error.
    pub fn resume(&mut self, now: Ticks) -> OfflineReport {
        let elapsed = now.saturating_sub(self.state.last_tick);
        if elapsed == 0 {
            return OfflineReport {
                simulated: 0,
                discarded: 0,
                gains: [0.0; 5],
            };
        }

        let window_hours = BASE_OFFLINE_HOURS + self.derived.offline_hours_bonus;
        let window = (window_hours * 3600.0).floor() as Ticks;
        let simulated = elapsed.min(window);
        let yield_mult = 1.0 + self.derived.offline_yield_bonus;

        // Cached rates only; buffs active at departure do not extend into
        // the away interval.
        let mut gains = [0.0; 5];
        for kind in ResourceKind::ALL {
            let amount = self.derived.rates.rate(kind) * simulated as f64 * yield_mult;
            gains[kind.index()] = amount;
            self.state.ledger.credit(kind, amount);
        }

        self.state.modifiers.buffs.push(ActiveBuff {
            effect: BuffEffect::RatePercent {
                resource: ResourceKind::Ember,
                bonus: RESUME_SURGE_BONUS,
            },
            expires_at: now + RESUME_SURGE_TICKS,
        });

        self.state.last_tick = now;
        self.notifications.push(
            NotificationCategory::Offline,
            format!("away for {elapsed}s, gathered {simulated}s of production"),
            now,
        );
        self.recompute();

        OfflineReport {
            simulated,
            discarded: elapsed - simulated,
            gains,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixture;

    #[test]
    fn short_absence_is_uncapped() {
        let mut fx = fixture(1);
        let report = fx.engine.resume(600);
        assert_eq!(report.simulated, 600);
        assert_eq!(report.discarded, 0);
        // Base ember rate is 0.1/s.
        assert!((report.gains[ResourceKind::Ember.index()] - 60.0).abs() < 1e-9);
    }

    #[test]
    fn long_absence_clamps_to_window() {
        let mut fx = fixture(1);
        let report = fx.engine.resume(40_000);
        assert_eq!(report.simulated, 28_800);
        assert_eq!(report.discarded, 11_200);
        assert_eq!(fx.engine.state().last_tick, 40_000);
    }

    #[test]
    fn resume_grants_ember_surge() {
        let mut fx = fixture(1);
        fx.engine.resume(100);
        let base = fx.engine.final_rates().ember_per_sec;
        let effective = fx.engine.effective_rate(ResourceKind::Ember);
        assert!((effective - base * 1.2).abs() < 1e-9);
    }

    #[test]
    fn surge_expires_after_its_window() {
        let mut fx = fixture(1);
        fx.engine.resume(100);
        fx.engine.advance(RESUME_SURGE_TICKS);
        let base = fx.engine.final_rates().ember_per_sec;
        assert!((fx.engine.effective_rate(ResourceKind::Ember) - base).abs() < 1e-12);
    }

    #[test]
    fn backwards_clock_is_a_noop() {
        let mut fx = fixture(1);
        fx.engine.advance(50);
        let report = fx.engine.resume(10);
        assert_eq!(report.simulated, 0);
        assert_eq!(fx.engine.state().last_tick, 50);
    }
}
