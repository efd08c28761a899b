//! Upgrade catalog: the static table of everything a player can buy.
//!
//! RULE: Catalog entries are game-balance constants.
//! Ids are persisted in save data, so an id is never renamed or reused.
//! Append new upgrades at the end; display order follows table order.

use serde::{Deserialize, Serialize};

/// Stardust granted per click before any upgrade.
pub const BASE_PER_CLICK: u64 = 1;

/// Stardust granted per idle tick before any upgrade or prestige bonus.
pub const BASE_PER_TICK: u64 = 0;

/// Stardust a player must hold to activate prestige.
pub const PRESTIGE_REQUIREMENT: u64 = 1_000_000;

/// Offline accrual is capped at 24 hours.
pub const IDLE_CAP_SECONDS: i64 = 24 * 60 * 60;

/// Cost multipliers are expressed in thousandths (1150 = +15% per level).
pub const MULTIPLIER_DENOMINATOR: u64 = 1000;

/// Which balance an upgrade is paid from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CostType {
    Stardust,
    Credits,
}

impl CostType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stardust => "stardust",
            Self::Credits  => "credits",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeDef {
    pub id:                 &'static str,
    pub name:               &'static str,
    pub description:        &'static str,
    pub base_cost:          u64,
    /// Numerator over [`MULTIPLIER_DENOMINATOR`].
    pub cost_multiplier:    u64,
    pub per_click:          u64,
    pub per_tick:           u64,
    pub cost_type:          CostType,
    pub active:             bool,
}

static UPGRADES: [UpgradeDef; 9] = [
    UpgradeDef {
        id:              "telescope",
        name:            "Telescope",
        description:     "A basic telescope to observe distant stars and collect more stardust.",
        base_cost:       10,
        cost_multiplier: 1150,
        per_click:       1,
        per_tick:        0,
        cost_type:       CostType::Stardust,
        active:          true,
    },
    UpgradeDef {
        id:              "satellite",
        name:            "Satellite",
        description:     "An orbital satellite that automatically collects stardust from space.",
        base_cost:       100,
        cost_multiplier: 1150,
        per_click:       5,
        per_tick:        1,
        cost_type:       CostType::Stardust,
        active:          true,
    },
    UpgradeDef {
        id:              "observatory",
        name:            "Observatory",
        description:     "A ground-based observatory with advanced detection capabilities.",
        base_cost:       1000,
        cost_multiplier: 1150,
        per_click:       10,
        per_tick:        5,
        cost_type:       CostType::Stardust,
        active:          true,
    },
    UpgradeDef {
        id:              "starship",
        name:            "Starship",
        description:     "A starship that harvests stardust from multiple star systems.",
        base_cost:       10,
        cost_multiplier: 1200,
        per_click:       50,
        per_tick:        25,
        cost_type:       CostType::Credits,
        active:          true,
    },
    UpgradeDef {
        id:              "spacestation",
        name:            "Space Station",
        description:     "A massive space station with industrial-scale stardust processing.",
        base_cost:       50,
        cost_multiplier: 1200,
        per_click:       100,
        per_tick:        50,
        cost_type:       CostType::Credits,
        active:          true,
    },
    UpgradeDef {
        id:              "wormhole",
        name:            "Wormhole Generator",
        description:     "Opens wormholes to distant galaxies rich in stardust.",
        base_cost:       200,
        cost_multiplier: 1250,
        per_click:       500,
        per_tick:        250,
        cost_type:       CostType::Credits,
        active:          true,
    },
    UpgradeDef {
        id:              "blackhole",
        name:            "Black Hole",
        description:     "Harnesses the energy of a black hole to generate stardust.",
        base_cost:       500,
        cost_multiplier: 1250,
        per_click:       1000,
        per_tick:        500,
        cost_type:       CostType::Credits,
        active:          true,
    },
    UpgradeDef {
        id:              "galacticnetwork",
        name:            "Galactic Network",
        description:     "A network spanning entire galaxies, collecting stardust automatically.",
        base_cost:       1000,
        cost_multiplier: 1300,
        per_click:       5000,
        per_tick:        2500,
        cost_type:       CostType::Credits,
        active:          true,
    },
    UpgradeDef {
        id:              "universeengine",
        name:            "Universe Engine",
        description:     "The ultimate stardust generator, powered by entire universes.",
        base_cost:       2000,
        cost_multiplier: 1500,
        per_click:       10000,
        per_tick:        5000,
        cost_type:       CostType::Credits,
        active:          true,
    },
];

/// Look up an upgrade by id.
pub fn find(id: &str) -> Option<&'static UpgradeDef> {
    UPGRADES.iter().find(|u| u.id == id)
}

/// Every upgrade, in display order.
pub fn all() -> &'static [UpgradeDef] {
    &UPGRADES
}

/// Upgrades currently offered in the shop.
pub fn active() -> impl Iterator<Item = &'static UpgradeDef> {
    UPGRADES.iter().filter(|u| u.active)
}

/// Offered upgrades paid from the given balance.
pub fn by_cost_type(cost_type: CostType) -> impl Iterator<Item = &'static UpgradeDef> {
    active().filter(move |u| u.cost_type == cost_type)
}
