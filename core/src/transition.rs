//! Transition engine — the pure rules of the game.
//!
//! RULES:
//!   - Every transition takes the current snapshot and returns the next one.
//!   - A precondition that is not met returns the *same* `Arc`
//!     (`Arc::ptr_eq` holds). That is not an error; callers use it to
//!     skip saving.
//!   - No I/O, no clock reads. Time arrives as an argument.
//!   - Cached yield rates are recomputed whenever upgrades or prestige move.

use crate::{
    accrual,
    achievements,
    catalog::{self, CostType, PRESTIGE_REQUIREMENT},
    cost,
    snapshot::{GameSnapshot, UpgradeState},
    types::{Quantity, TimestampMs},
};
use num_traits::{CheckedSub, Zero};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Apply one manual click.
pub fn click(snapshot: &Arc<GameSnapshot>) -> Arc<GameSnapshot> {
    let mut next = GameSnapshot::clone(snapshot);
    next.resource += &snapshot.resource_per_click;
    next.total_clicks = next.total_clicks.saturating_add(1);
    Arc::new(next)
}

/// Buy the next level of `upgrade_id` if the player can pay for it.
pub fn purchase_upgrade(snapshot: &Arc<GameSnapshot>, upgrade_id: &str) -> Arc<GameSnapshot> {
    let Some(def) = catalog::find(upgrade_id) else {
        return Arc::clone(snapshot);
    };

    // Priced once, at the pre-purchase level; short of it is a no-op.
    let level = snapshot.level_of(upgrade_id);
    let price = cost::cost_at_level(def, level);
    let Some(remaining) = snapshot.balance(def.cost_type).checked_sub(&price) else {
        return Arc::clone(snapshot);
    };
    let Some(next_level) = level.checked_add(1) else {
        log::error!("purchase of {upgrade_id} rejected: level overflow");
        return Arc::clone(snapshot);
    };

    let mut next = GameSnapshot::clone(snapshot);
    match def.cost_type {
        CostType::Stardust => next.resource = remaining,
        CostType::Credits  => next.secondary_currency = remaining,
    }
    next.upgrades.insert(
        upgrade_id.to_string(),
        UpgradeState { level: next_level, cost_type: def.cost_type },
    );
    next.recompute_rates();
    Arc::new(next)
}

/// Online passive accrual: `ticks` idle periods elapsed while the session ran.
pub fn idle_tick(snapshot: &Arc<GameSnapshot>, ticks: u64, now: TimestampMs) -> Arc<GameSnapshot> {
    if ticks == 0 {
        return Arc::clone(snapshot);
    }
    let mut next = GameSnapshot::clone(snapshot);
    next.resource += &snapshot.resource_per_tick * ticks;
    next.last_tick_timestamp = now;
    Arc::new(next)
}

/// Whole seconds between the last reconciliation and `now`.
pub fn elapsed_seconds(snapshot: &GameSnapshot, now: TimestampMs) -> i64 {
    now.saturating_sub(snapshot.last_tick_timestamp) / 1000
}

/// Offline catch-up: credit the time since `last_tick_timestamp`, capped.
/// Running it twice at the same `now` credits the gap only once.
pub fn reconcile_idle(snapshot: &Arc<GameSnapshot>, now: TimestampMs) -> Arc<GameSnapshot> {
    let elapsed = elapsed_seconds(snapshot, now);
    if elapsed <= 0 {
        return Arc::clone(snapshot);
    }
    let mut next = GameSnapshot::clone(snapshot);
    next.resource += accrual::idle_reward(&snapshot.resource_per_tick, elapsed);
    next.last_tick_timestamp = now;
    Arc::new(next)
}

pub fn can_activate_prestige(snapshot: &GameSnapshot) -> bool {
    snapshot.resource >= Quantity::from(PRESTIGE_REQUIREMENT)
}

/// Trade all progress except credits and achievements for a permanent
/// +1 idle yield.
pub fn activate_prestige(snapshot: &Arc<GameSnapshot>, now: TimestampMs) -> Arc<GameSnapshot> {
    if !can_activate_prestige(snapshot) {
        return Arc::clone(snapshot);
    }
    let mut next = GameSnapshot::clone(snapshot);
    next.resource = Quantity::zero();
    next.total_clicks = 0;
    next.upgrades = BTreeMap::new();
    next.prestige_level = snapshot.prestige_level.saturating_add(1);
    next.last_tick_timestamp = now;
    next.recompute_rates();
    Arc::new(next)
}

/// Credits bought outside the engine (wallet purchase or exchange).
pub fn credit_secondary(snapshot: &Arc<GameSnapshot>, amount: &Quantity) -> Arc<GameSnapshot> {
    if amount.is_zero() {
        return Arc::clone(snapshot);
    }
    let mut next = GameSnapshot::clone(snapshot);
    next.secondary_currency += amount;
    Arc::new(next)
}

/// Authoritative progress read back from an on-chain record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRecord {
    pub resource:           Quantity,
    pub total_clicks:       u64,
    pub prestige_level:     u32,
    pub secondary_currency: Option<Quantity>,
}

/// Overwrite progress wholesale from a trusted external record.
/// Prestige never moves backwards; rates are re-derived afterwards.
pub fn apply_external_record(
    snapshot: &Arc<GameSnapshot>,
    record: &ExternalRecord,
) -> Arc<GameSnapshot> {
    let mut next = GameSnapshot::clone(snapshot);
    next.resource = record.resource.clone();
    next.total_clicks = record.total_clicks;
    if record.prestige_level < snapshot.prestige_level {
        log::warn!(
            "external record prestige {} is behind local {}; keeping local",
            record.prestige_level,
            snapshot.prestige_level
        );
    } else {
        next.prestige_level = record.prestige_level;
    }
    if let Some(credits) = &record.secondary_currency {
        next.secondary_currency = credits.clone();
    }
    next.recompute_rates();
    if next == **snapshot {
        return Arc::clone(snapshot);
    }
    Arc::new(next)
}

/// Record every achievement whose condition now holds.
pub fn unlock_achievements(snapshot: &Arc<GameSnapshot>) -> Arc<GameSnapshot> {
    let unlocked = achievements::newly_met(snapshot);
    if unlocked.is_empty() {
        return Arc::clone(snapshot);
    }
    let mut next = GameSnapshot::clone(snapshot);
    next.achievements.extend(unlocked.into_iter().map(String::from));
    Arc::new(next)
}

/// Start over from the canonical initial snapshot. Nothing is kept.
pub fn reset(now: TimestampMs) -> Arc<GameSnapshot> {
    Arc::new(GameSnapshot::initial(now))
}
