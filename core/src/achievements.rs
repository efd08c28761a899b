//! Achievement catalog. Unlocks are one-way: an id, once in the
//! snapshot's set, is never removed (prestige keeps them too).

use crate::{snapshot::GameSnapshot, types::Quantity};

pub struct AchievementDef {
    pub id:          &'static str,
    pub name:        &'static str,
    pub description: &'static str,
    condition:       fn(&GameSnapshot) -> bool,
}

impl AchievementDef {
    pub fn is_met(&self, snapshot: &GameSnapshot) -> bool {
        (self.condition)(snapshot)
    }
}

static ACHIEVEMENTS: [AchievementDef; 5] = [
    AchievementDef {
        id:          "first_click",
        name:        "First Light",
        description: "Click your first star",
        condition:   |s| s.total_clicks >= 1,
    },
    AchievementDef {
        id:          "hundred_clicks",
        name:        "Star Gazer",
        description: "Click 100 stars",
        condition:   |s| s.total_clicks >= 100,
    },
    AchievementDef {
        id:          "first_upgrade",
        name:        "First Steps",
        description: "Purchase your first upgrade",
        condition:   |s| s.upgrades.values().any(|u| u.level > 0),
    },
    AchievementDef {
        id:          "thousand_stardust",
        name:        "Cosmic Collector",
        description: "Collect 1,000 stardust",
        condition:   |s| s.resource >= Quantity::from(1000u32),
    },
    AchievementDef {
        id:          "first_prestige",
        name:        "Rebirth",
        description: "Activate prestige for the first time",
        condition:   |s| s.prestige_level >= 1,
    },
];

pub fn all() -> &'static [AchievementDef] {
    &ACHIEVEMENTS
}

pub fn find(id: &str) -> Option<&'static AchievementDef> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Achievements whose condition holds but which the snapshot lacks.
pub fn newly_met(snapshot: &GameSnapshot) -> Vec<&'static str> {
    ACHIEVEMENTS
        .iter()
        .filter(|a| !snapshot.achievements.contains(a.id) && a.is_met(snapshot))
        .map(|a| a.id)
        .collect()
}
