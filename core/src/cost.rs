//! Cost model — what the next level of an upgrade costs.
//!
//! Every price is exact integer arithmetic. Each level compounds the
//! previous price by `multiplier / 1000`, flooring at every step, so
//! the curve is reproducible bit-for-bit across platforms.

use crate::{
    catalog::{self, CostType, UpgradeDef, MULTIPLIER_DENOMINATOR},
    snapshot::GameSnapshot,
    types::Quantity,
};

/// Price of buying `def` when it currently sits at `level`.
pub fn cost_at_level(def: &UpgradeDef, level: u32) -> Quantity {
    let mut cost = Quantity::from(def.base_cost);
    for _ in 0..level {
        cost = cost * def.cost_multiplier / MULTIPLIER_DENOMINATOR;
    }
    cost
}

/// Price of the next level of `upgrade_id`. `None` for an unknown upgrade.
pub fn upgrade_cost(upgrade_id: &str, current_level: u32) -> Option<Quantity> {
    catalog::find(upgrade_id).map(|def| cost_at_level(def, current_level))
}

/// Whether the player holds enough of the right currency for the next level.
pub fn can_afford(snapshot: &GameSnapshot, upgrade_id: &str) -> bool {
    let Some(def) = catalog::find(upgrade_id) else {
        return false;
    };
    let cost = cost_at_level(def, snapshot.level_of(upgrade_id));
    *snapshot.balance(def.cost_type) >= cost
}

/// Total currency sunk into upgrades so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spend {
    pub stardust: Quantity,
    pub credits:  Quantity,
}

/// Sum of every level purchased, split by currency.
/// Upgrades no longer in the catalog are skipped.
pub fn total_spent(snapshot: &GameSnapshot) -> Spend {
    let mut spend = Spend::default();
    for (id, state) in &snapshot.upgrades {
        let Some(def) = catalog::find(id) else {
            continue;
        };
        let mut cost = Quantity::from(def.base_cost);
        for _ in 0..state.level {
            match def.cost_type {
                CostType::Stardust => spend.stardust += &cost,
                CostType::Credits  => spend.credits += &cost,
            }
            cost = cost * def.cost_multiplier / MULTIPLIER_DENOMINATOR;
        }
    }
    spend
}
