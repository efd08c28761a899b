//! The session scheduler — owner of the one live snapshot.
//!
//! TIMERS (all measured against the injected wall clock):
//!   1. Idle tick       every `idle_tick_ms`; missed periods coalesce.
//!   2. Debounced save  `debounce_ms` after the most recent action.
//!   3. Autosave        every `autosave_ms`, unconditionally.
//!
//! RULES:
//!   - Every change goes through a transition; the result replaces
//!     the held `Arc` whole. Readers only ever get `Arc` clones.
//!   - Timers fire only from `poll()`. Nothing runs in the background.
//!   - Saves are fire-and-forget: a failed write is logged and published
//!     as an event, never retried, never returned to the caller.
//!   - `shutdown()` consumes the scheduler, so no timer can outlive it.
//!   - At most `MAX_PENDING_EVENTS` undrained events are kept; the oldest
//!     are dropped first.

use crate::{
    catalog::{self, IDLE_CAP_SECONDS},
    clock::WallClock,
    codec,
    config::{GameConfig, SchedulerConfig},
    cost,
    error::GameResult,
    event::{GameEvent, SaveReason},
    snapshot::GameSnapshot,
    store::SaveMedium,
    transition::{self, ExternalRecord},
    types::{Quantity, SessionId, TimestampMs},
};
use std::collections::VecDeque;
use std::sync::Arc;
use uuid::Uuid;

/// Undrained events kept for a collaborator that is not listening.
pub const MAX_PENDING_EVENTS: usize = 1_024;

pub struct Scheduler {
    session_id:       SessionId,
    config:           SchedulerConfig,
    slot_key:         String,
    store:            Box<dyn SaveMedium>,
    clock:            Box<dyn WallClock>,
    snapshot:         Arc<GameSnapshot>,
    next_tick_at:     TimestampMs,
    next_autosave_at: TimestampMs,
    pending_save_at:  Option<TimestampMs>,
    events:           VecDeque<GameEvent>,
}

impl Scheduler {
    /// Open a session: restore the saved game (or start a new one),
    /// credit offline time, and save the result before returning.
    ///
    /// An unreadable save is replaced by a new game. A storage read
    /// failure is returned, since nothing has been lost yet.
    pub fn start(
        config: &GameConfig,
        store: Box<dyn SaveMedium>,
        clock: Box<dyn WallClock>,
    ) -> GameResult<Self> {
        config.validate()?;
        let now = clock.now();
        let session_id = Uuid::new_v4().to_string();

        let stored = store.load(&config.storage.slot_key)?;
        let restored = stored.is_some();
        let snapshot = match stored {
            Some(text) => codec::decode_or_initial(&text, now),
            None => GameSnapshot::initial(now),
        };

        let period = millis(config.scheduler.idle_tick_ms);
        let autosave = millis(config.scheduler.autosave_ms);
        let mut scheduler = Self {
            session_id:       session_id.clone(),
            config:           config.scheduler.clone(),
            slot_key:         config.storage.slot_key.clone(),
            store,
            clock,
            snapshot:         Arc::new(snapshot),
            next_tick_at:     now.saturating_add(period),
            next_autosave_at: now.saturating_add(autosave),
            pending_save_at:  None,
            events:           VecDeque::new(),
        };

        scheduler.publish(GameEvent::SessionStarted { session_id, restored });
        scheduler.reconcile_at(now);
        scheduler.refresh_achievements();
        scheduler.persist(SaveReason::Startup);

        log::info!(
            "session={} started: restored={restored} stardust={} prestige={}",
            scheduler.session_id,
            scheduler.snapshot.resource,
            scheduler.snapshot.prestige_level
        );
        Ok(scheduler)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Read-only view of the live snapshot.
    pub fn snapshot(&self) -> Arc<GameSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Take every event published since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    /// True while a debounced save is armed.
    pub fn save_pending(&self) -> bool {
        self.pending_save_at.is_some()
    }

    /// Earliest time at which `poll()` has something to do.
    pub fn next_deadline(&self) -> TimestampMs {
        let timers = self.next_tick_at.min(self.next_autosave_at);
        self.pending_save_at.map_or(timers, |at| at.min(timers))
    }

    // ── Actions ────────────────────────────────────────────────

    pub fn click(&mut self) -> Arc<GameSnapshot> {
        let delta = self.snapshot.resource_per_click.to_string();
        let next = transition::click(&self.snapshot);
        self.publish(GameEvent::Clicked { delta });
        self.commit(next)
    }

    pub fn purchase_upgrade(&mut self, upgrade_id: &str) -> Arc<GameSnapshot> {
        let level = self.snapshot.level_of(upgrade_id);
        let next = transition::purchase_upgrade(&self.snapshot, upgrade_id);
        if Arc::ptr_eq(&next, &self.snapshot) {
            log::debug!("session={} purchase of {upgrade_id} skipped", self.session_id);
            return next;
        }
        if let (Some(def), Some(price)) =
            (catalog::find(upgrade_id), cost::upgrade_cost(upgrade_id, level))
        {
            log::debug!(
                "session={} bought {upgrade_id} level {} for {price} {}",
                self.session_id,
                level + 1,
                def.cost_type.label()
            );
            self.publish(GameEvent::UpgradePurchased {
                upgrade_id: upgrade_id.to_string(),
                level:      level + 1,
                cost:       price.to_string(),
                cost_type:  def.cost_type,
            });
        }
        self.commit(next)
    }

    pub fn activate_prestige(&mut self) -> Arc<GameSnapshot> {
        let now = self.clock.now();
        let next = transition::activate_prestige(&self.snapshot, now);
        if Arc::ptr_eq(&next, &self.snapshot) {
            return next;
        }
        log::info!(
            "session={} prestige activated: level {}",
            self.session_id,
            next.prestige_level
        );
        self.publish(GameEvent::PrestigeActivated { prestige_level: next.prestige_level });
        self.commit(next)
    }

    /// Credit time since the last reconciliation. Idempotent at a fixed now.
    pub fn reconcile_idle(&mut self) -> Arc<GameSnapshot> {
        let now = self.clock.now();
        if self.reconcile_at(now) {
            self.refresh_achievements();
            self.arm_debounce();
        }
        self.snapshot()
    }

    /// Credits bought through the wallet collaborator.
    pub fn credit_secondary(&mut self, amount: &Quantity) -> Arc<GameSnapshot> {
        let next = transition::credit_secondary(&self.snapshot, amount);
        if !Arc::ptr_eq(&next, &self.snapshot) {
            self.publish(GameEvent::CreditsReceived { amount: amount.to_string() });
        }
        self.commit(next)
    }

    /// Trusted overwrite from an on-chain record.
    pub fn apply_external_record(&mut self, record: &ExternalRecord) -> Arc<GameSnapshot> {
        let next = transition::apply_external_record(&self.snapshot, record);
        if !Arc::ptr_eq(&next, &self.snapshot) {
            self.publish(GameEvent::ExternalRecordApplied);
        }
        self.commit(next)
    }

    /// Throw away all progress, credits included.
    pub fn reset(&mut self) -> Arc<GameSnapshot> {
        let next = transition::reset(self.clock.now());
        log::info!("session={} game reset", self.session_id);
        self.publish(GameEvent::GameReset);
        self.commit(next)
    }

    // ── Timers ─────────────────────────────────────────────────

    /// Fire every timer that is due at the clock's current time.
    pub fn poll(&mut self) {
        let now = self.clock.now();
        self.run_idle_ticks(now);

        if let Some(due) = self.pending_save_at {
            if now >= due {
                self.pending_save_at = None;
                self.persist(SaveReason::Debounced);
            }
        }

        if now >= self.next_autosave_at {
            self.persist(SaveReason::Autosave);
            let period = millis(self.config.autosave_ms);
            let missed = now.saturating_sub(self.next_autosave_at) / period + 1;
            self.next_autosave_at =
                self.next_autosave_at.saturating_add(missed.saturating_mul(period));
        }
    }

    /// End the session. A pending debounced save is flushed first.
    pub fn shutdown(mut self) -> Arc<GameSnapshot> {
        if self.pending_save_at.take().is_some() {
            self.persist(SaveReason::Shutdown);
        }
        log::info!(
            "session={} closed: stardust={} clicks={}",
            self.session_id,
            self.snapshot.resource,
            self.snapshot.total_clicks
        );
        self.snapshot
    }

    // ── Internals ──────────────────────────────────────────────

    /// Replace the live snapshot if the transition changed anything.
    fn commit(&mut self, next: Arc<GameSnapshot>) -> Arc<GameSnapshot> {
        if Arc::ptr_eq(&next, &self.snapshot) {
            return next;
        }
        self.snapshot = next;
        self.refresh_achievements();
        self.arm_debounce();
        self.snapshot()
    }

    /// Cancel any pending debounced save and schedule a new one.
    fn arm_debounce(&mut self) {
        let due = self.clock.now().saturating_add(millis(self.config.debounce_ms));
        self.pending_save_at = Some(due);
    }

    fn reconcile_at(&mut self, now: TimestampMs) -> bool {
        let seconds = transition::elapsed_seconds(&self.snapshot, now);
        let next = transition::reconcile_idle(&self.snapshot, now);
        if Arc::ptr_eq(&next, &self.snapshot) {
            return false;
        }
        let reward = &next.resource - &self.snapshot.resource;
        if seconds > IDLE_CAP_SECONDS {
            log::info!(
                "session={} away {seconds}s, crediting the {IDLE_CAP_SECONDS}s cap",
                self.session_id
            );
        }
        log::debug!("session={} idle reconciled: {seconds}s -> +{reward}", self.session_id);
        self.publish(GameEvent::IdleReconciled { seconds, reward: reward.to_string() });
        self.snapshot = next;
        // The gap is now paid for; the online tick restarts its period from here.
        self.next_tick_at = now.saturating_add(millis(self.config.idle_tick_ms));
        true
    }

    fn run_idle_ticks(&mut self, now: TimestampMs) {
        if now < self.next_tick_at {
            return;
        }
        let period = millis(self.config.idle_tick_ms);
        let due = now.saturating_sub(self.next_tick_at) / period + 1;
        let cap = (IDLE_CAP_SECONDS * 1000 / period).max(1);
        if due > cap {
            log::warn!(
                "session={} {due} idle ticks overdue, crediting {cap}",
                self.session_id
            );
        }
        self.snapshot = transition::idle_tick(&self.snapshot, due.min(cap) as u64, now);
        self.refresh_achievements();
        self.next_tick_at = self.next_tick_at.saturating_add(due.saturating_mul(period));
    }

    fn refresh_achievements(&mut self) {
        let next = transition::unlock_achievements(&self.snapshot);
        if Arc::ptr_eq(&next, &self.snapshot) {
            return;
        }
        let unlocked: Vec<String> =
            next.achievements.difference(&self.snapshot.achievements).cloned().collect();
        for id in unlocked {
            log::info!("session={} achievement unlocked: {id}", self.session_id);
            self.publish(GameEvent::AchievementUnlocked { id });
        }
        self.snapshot = next;
    }

    fn publish(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn persist(&mut self, reason: SaveReason) {
        let result = codec::encode(&self.snapshot)
            .and_then(|text| self.store.save(&self.slot_key, &text));
        match result {
            Ok(()) => {
                log::debug!("session={} saved ({reason:?})", self.session_id);
                self.publish(GameEvent::Saved { reason });
            }
            Err(e) => {
                log::warn!("session={} save failed ({reason:?}): {e}", self.session_id);
                self.publish(GameEvent::SaveFailed { reason, error: e.to_string() });
            }
        }
    }
}

/// A configured period as signed millis. Validation bounds periods to a
/// day, so the saturation only matters for configs that skipped it.
fn millis(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}
