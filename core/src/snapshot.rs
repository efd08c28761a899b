//! The game snapshot: the complete progress of one player.
//!
//! RULE: A snapshot is never mutated once it is shared.
//! Transitions clone the prior snapshot, edit the private copy, and
//! hand back a fresh `Arc`. The cached yield rates are recomputed on
//! that copy before it is published.

use crate::{
    accrual,
    catalog::{CostType, BASE_PER_CLICK, BASE_PER_TICK},
    types::{AchievementId, Quantity, TimestampMs, UpgradeId},
};
use std::collections::{BTreeMap, BTreeSet};

/// Purchase state of one upgrade. Absent from the map means level 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeState {
    pub level:     u32,
    pub cost_type: CostType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub resource:            Quantity,
    pub resource_per_click:  Quantity,
    pub resource_per_tick:   Quantity,
    pub total_clicks:        u64,
    pub upgrades:            BTreeMap<UpgradeId, UpgradeState>,
    pub secondary_currency:  Quantity,
    pub prestige_level:      u32,
    pub achievements:        BTreeSet<AchievementId>,
    pub last_tick_timestamp: TimestampMs,
}

impl GameSnapshot {
    /// The canonical starting point of a fresh game.
    pub fn initial(now: TimestampMs) -> Self {
        Self {
            resource:            Quantity::default(),
            resource_per_click:  Quantity::from(BASE_PER_CLICK),
            resource_per_tick:   Quantity::from(BASE_PER_TICK),
            total_clicks:        0,
            upgrades:            BTreeMap::new(),
            secondary_currency:  Quantity::default(),
            prestige_level:      0,
            achievements:        BTreeSet::new(),
            last_tick_timestamp: now,
        }
    }

    /// Current level of an upgrade; 0 when never bought.
    pub fn level_of(&self, upgrade_id: &str) -> u32 {
        self.upgrades.get(upgrade_id).map_or(0, |u| u.level)
    }

    /// The balance an upgrade of `cost_type` is paid from.
    pub fn balance(&self, cost_type: CostType) -> &Quantity {
        match cost_type {
            CostType::Stardust => &self.resource,
            CostType::Credits  => &self.secondary_currency,
        }
    }

    /// Refresh the cached yield rates from `upgrades` and `prestige_level`.
    /// Only call on a private copy that has not been published yet.
    pub(crate) fn recompute_rates(&mut self) {
        self.resource_per_click = accrual::per_click_yield(self);
        self.resource_per_tick = accrual::per_tick_yield(self);
    }

    /// True when the cached rates agree with the upgrade levels.
    pub fn rates_consistent(&self) -> bool {
        self.resource_per_click == accrual::per_click_yield(self)
            && self.resource_per_tick == accrual::per_tick_yield(self)
    }
}
