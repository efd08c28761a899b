//! Star Miner economic engine.
//!
//! LAYERS (leaf-first, each depends only on the ones above it):
//!   catalog, achievements, exchange   static game data and rates
//!   cost, accrual                     pure derived numbers
//!   snapshot                          the one piece of game state
//!   transition                        pure snapshot -> snapshot rules
//!   codec, store                      save text and where it lives
//!   scheduler                         timers, actions, persistence

pub mod accrual;
pub mod achievements;
pub mod catalog;
pub mod clock;
pub mod codec;
pub mod config;
pub mod cost;
pub mod error;
pub mod event;
pub mod exchange;
pub mod format;
pub mod scheduler;
pub mod snapshot;
pub mod store;
pub mod transition;
pub mod types;
