//! The status channel — what happened, for whoever is listening.
//!
//! RULE: Events describe changes after the fact. Nothing in the engine
//! reacts to them; they exist for the UI collaborator and for logs.
//! Quantities travel as decimal strings so JSON consumers never lose
//! precision.

use crate::{
    catalog::CostType,
    types::{AchievementId, SessionId, UpgradeId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    SessionStarted {
        session_id: SessionId,
        restored:   bool,
    },
    IdleReconciled {
        seconds: i64,
        reward:  String,
    },
    Clicked {
        delta: String,
    },
    UpgradePurchased {
        upgrade_id: UpgradeId,
        level:      u32,
        cost:       String,
        cost_type:  CostType,
    },
    PrestigeActivated {
        prestige_level: u32,
    },
    AchievementUnlocked {
        id: AchievementId,
    },
    CreditsReceived {
        amount: String,
    },
    ExternalRecordApplied,
    GameReset,
    Saved {
        reason: SaveReason,
    },
    SaveFailed {
        reason: SaveReason,
        error:  String,
    },
}

/// Why a save was written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaveReason {
    Startup,
    Debounced,
    Autosave,
    Shutdown,
}
