//! Shared primitive types used across the entire engine.

/// Arbitrary-precision, never-negative currency amount.
pub type Quantity = num_bigint::BigUint;

/// Epoch milliseconds as supplied by the wall clock.
pub type TimestampMs = i64;

/// Stable identifier of an upgrade in the catalog.
pub type UpgradeId = String;

/// Stable identifier of an achievement.
pub type AchievementId = String;

/// The canonical session identifier.
pub type SessionId = String;
