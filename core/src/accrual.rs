//! Accrual model — how much stardust a click or an idle second yields.

use crate::{
    catalog::{self, BASE_PER_CLICK, BASE_PER_TICK, IDLE_CAP_SECONDS},
    snapshot::GameSnapshot,
    types::Quantity,
};

/// Stardust per click: base plus every owned upgrade's click yield × level.
pub fn per_click_yield(snapshot: &GameSnapshot) -> Quantity {
    let mut total = Quantity::from(BASE_PER_CLICK);
    for (id, state) in &snapshot.upgrades {
        if state.level == 0 {
            continue;
        }
        if let Some(def) = catalog::find(id) {
            total += Quantity::from(def.per_click) * state.level;
        }
    }
    total
}

/// Stardust per idle tick: base plus upgrades, plus one per prestige level.
pub fn per_tick_yield(snapshot: &GameSnapshot) -> Quantity {
    let mut total = Quantity::from(BASE_PER_TICK);
    for (id, state) in &snapshot.upgrades {
        if state.level == 0 {
            continue;
        }
        if let Some(def) = catalog::find(id) {
            total += Quantity::from(def.per_tick) * state.level;
        }
    }
    total + snapshot.prestige_level
}

/// Reward for `elapsed_seconds` spent away, capped at 24 hours.
/// Zero or negative elapsed time earns nothing.
pub fn idle_reward(per_tick: &Quantity, elapsed_seconds: i64) -> Quantity {
    if elapsed_seconds <= 0 {
        return Quantity::default();
    }
    let capped = elapsed_seconds.min(IDLE_CAP_SECONDS) as u64;
    per_tick * capped
}
