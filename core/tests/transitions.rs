//! Transition engine tests — clicks, purchases, idle accrual, prestige.
//!
//! Every "nothing happened" outcome must hand back the very same Arc.

use proptest::prelude::*;
use starminer_core::{
    accrual,
    catalog::{self, CostType, PRESTIGE_REQUIREMENT},
    cost,
    snapshot::GameSnapshot,
    transition::{self, ExternalRecord},
    types::Quantity,
};
use std::sync::Arc;

const NOW: i64 = 1_700_000_000_000;

fn fresh() -> Arc<GameSnapshot> {
    Arc::new(GameSnapshot::initial(NOW))
}

fn with_stardust(amount: u64) -> Arc<GameSnapshot> {
    let mut s = GameSnapshot::initial(NOW);
    s.resource = Quantity::from(amount);
    Arc::new(s)
}

fn with_credits(amount: u64) -> Arc<GameSnapshot> {
    let mut s = GameSnapshot::initial(NOW);
    s.secondary_currency = Quantity::from(amount);
    Arc::new(s)
}

/// One click on a new game yields exactly one stardust.
#[test]
fn basic_click() {
    let s = transition::click(&fresh());
    assert_eq!(s.resource, Quantity::from(1u32));
    assert_eq!(s.total_clicks, 1);
}

/// Buying a telescope at 1000 stardust costs 10 and adds 1 per click.
#[test]
fn telescope_purchase() {
    let before = with_stardust(1_000);
    let after = transition::purchase_upgrade(&before, "telescope");

    assert_eq!(after.resource, Quantity::from(990u32));
    assert_eq!(after.level_of("telescope"), 1);
    assert_eq!(after.upgrades["telescope"].cost_type, CostType::Stardust);
    assert_eq!(
        after.resource_per_click,
        &before.resource_per_click + catalog::find("telescope").unwrap().per_click
    );
}

/// A second purchase is priced at level 1 (11 stardust), not level 0.
#[test]
fn repeat_purchase_uses_pre_purchase_level() {
    let s = transition::purchase_upgrade(&with_stardust(100), "telescope");
    let s = transition::purchase_upgrade(&s, "telescope");
    assert_eq!(s.resource, Quantity::from(100u32 - 10 - 11));
    assert_eq!(s.level_of("telescope"), 2);
    assert_eq!(s.resource_per_click, Quantity::from(3u32));
}

/// Credit-priced upgrades draw from credits and leave stardust alone.
#[test]
fn credit_upgrade_spends_credits() {
    let mut s = GameSnapshot::initial(NOW);
    s.resource = Quantity::from(5u32);
    s.secondary_currency = Quantity::from(25u32);
    let after = transition::purchase_upgrade(&Arc::new(s), "starship");

    assert_eq!(after.secondary_currency, Quantity::from(15u32));
    assert_eq!(after.resource, Quantity::from(5u32));
    assert_eq!(after.resource_per_tick, Quantity::from(25u32));
    assert_eq!(after.resource_per_click, Quantity::from(51u32));
}

#[test]
fn unaffordable_purchase_is_same_snapshot() {
    let before = with_stardust(9);
    let after = transition::purchase_upgrade(&before, "telescope");
    assert!(Arc::ptr_eq(&before, &after));

    // Stardust does not pay for credit upgrades.
    let rich = with_stardust(1_000_000);
    assert!(Arc::ptr_eq(&rich, &transition::purchase_upgrade(&rich, "starship")));
}

/// The balance is checked against the same price that is charged.
#[test]
fn exact_balance_buys_and_empties() {
    let s = with_stardust(10 + 11);
    let s = transition::purchase_upgrade(&s, "telescope");
    let s = transition::purchase_upgrade(&s, "telescope");
    assert_eq!(s.resource, Quantity::from(0u32));
    assert_eq!(s.level_of("telescope"), 2);

    let short = with_credits(9);
    assert!(Arc::ptr_eq(&short, &transition::purchase_upgrade(&short, "starship")));
    let exact = with_credits(10);
    let bought = transition::purchase_upgrade(&exact, "starship");
    assert_eq!(bought.secondary_currency, Quantity::from(0u32));
    assert_eq!(bought.level_of("starship"), 1);
}

#[test]
fn unknown_upgrade_is_same_snapshot() {
    let before = with_stardust(1_000_000);
    let after = transition::purchase_upgrade(&before, "warp_drive");
    assert!(Arc::ptr_eq(&before, &after));
    assert!(!cost::can_afford(&before, "warp_drive"));
}

/// Away 3661 s at 5/s: reconciliation credits 18 305 stardust.
#[test]
fn idle_catch_up() {
    let mut s = GameSnapshot::initial(NOW - 3_661_000);
    s.prestige_level = 5;
    s.resource_per_tick = accrual::per_tick_yield(&s);
    assert_eq!(s.resource_per_tick, Quantity::from(5u32));

    let after = transition::reconcile_idle(&Arc::new(s), NOW);
    assert_eq!(after.resource, Quantity::from(18_305u32));
    assert_eq!(after.last_tick_timestamp, NOW);
}

/// A second reconciliation at the same instant credits nothing.
#[test]
fn reconcile_twice_is_idempotent() {
    let mut s = GameSnapshot::initial(NOW - 60_000);
    s.prestige_level = 1;
    s.resource_per_tick = accrual::per_tick_yield(&s);

    let once = transition::reconcile_idle(&Arc::new(s), NOW);
    let twice = transition::reconcile_idle(&once, NOW);
    assert!(Arc::ptr_eq(&once, &twice));
    assert_eq!(twice.resource, Quantity::from(60u32));
}

/// A clock that ran backwards credits nothing and keeps the timestamp.
#[test]
fn reconcile_with_clock_skew_is_noop() {
    let s = fresh();
    let after = transition::reconcile_idle(&s, NOW - 5_000);
    assert!(Arc::ptr_eq(&s, &after));
}

/// Away longer than a day: only 24 hours are paid.
#[test]
fn reconcile_caps_at_one_day() {
    let mut s = GameSnapshot::initial(NOW - 3 * 86_400_000);
    s.prestige_level = 2;
    s.resource_per_tick = accrual::per_tick_yield(&s);

    let after = transition::reconcile_idle(&Arc::new(s), NOW);
    assert_eq!(after.resource, Quantity::from(2u32 * 86_400));
}

#[test]
fn idle_tick_adds_rate_per_tick() {
    let mut s = GameSnapshot::initial(NOW);
    s.prestige_level = 3;
    s.resource_per_tick = accrual::per_tick_yield(&s);
    let s = Arc::new(s);

    let after = transition::idle_tick(&s, 4, NOW + 4_000);
    assert_eq!(after.resource, Quantity::from(12u32));
    assert_eq!(after.last_tick_timestamp, NOW + 4_000);
    assert!(Arc::ptr_eq(&s, &transition::idle_tick(&s, 0, NOW + 4_000)));
}

#[test]
fn prestige_below_threshold_is_same_snapshot() {
    let before = with_stardust(PRESTIGE_REQUIREMENT - 1);
    let after = transition::activate_prestige(&before, NOW);
    assert!(Arc::ptr_eq(&before, &after));
}

/// Prestige wipes progress but keeps credits and achievements.
#[test]
fn prestige_resets_progress() {
    let mut s = GameSnapshot::initial(NOW - 1_000);
    s.resource = Quantity::from(PRESTIGE_REQUIREMENT + 10);
    s.secondary_currency = Quantity::from(70u32);
    s.total_clicks = 5_000;
    s.achievements.insert("first_click".into());
    let s = transition::purchase_upgrade(&Arc::new(s), "telescope");
    let s = transition::purchase_upgrade(&s, "starship");
    assert_eq!(s.resource, Quantity::from(PRESTIGE_REQUIREMENT));
    assert_eq!(s.secondary_currency, Quantity::from(60u32));
    assert_eq!(s.upgrades.len(), 2);

    let after = transition::activate_prestige(&s, NOW);
    assert!(!Arc::ptr_eq(&s, &after));

    assert_eq!(after.resource, Quantity::from(0u32));
    assert_eq!(after.total_clicks, 0);
    assert!(after.upgrades.is_empty());
    assert_eq!(after.prestige_level, s.prestige_level + 1);
    assert_eq!(after.secondary_currency, Quantity::from(60u32));
    assert!(after.achievements.contains("first_click"));
    assert_eq!(after.achievements, s.achievements);
    assert_eq!(after.last_tick_timestamp, NOW);
    assert_eq!(after.resource_per_click, Quantity::from(1u32));
    assert_eq!(after.resource_per_tick, Quantity::from(1u32));
}

#[test]
fn credits_arrive_from_outside() {
    let s = fresh();
    let after = transition::credit_secondary(&s, &Quantity::from(1_000u32));
    assert_eq!(after.secondary_currency, Quantity::from(1_000u32));
    assert!(Arc::ptr_eq(&after, &transition::credit_secondary(&after, &Quantity::from(0u32))));
}

/// An on-chain overwrite re-derives rates and never lowers prestige.
#[test]
fn external_record_keeps_invariants() {
    let mut s = GameSnapshot::initial(NOW);
    s.prestige_level = 4;
    s.resource_per_tick = accrual::per_tick_yield(&s);
    let s = Arc::new(s);

    let raised = transition::apply_external_record(
        &s,
        &ExternalRecord {
            resource:           Quantity::from(123u32),
            total_clicks:       9,
            prestige_level:     6,
            secondary_currency: None,
        },
    );
    assert_eq!(raised.resource, Quantity::from(123u32));
    assert_eq!(raised.total_clicks, 9);
    assert_eq!(raised.prestige_level, 6);
    assert!(raised.rates_consistent());
    assert_eq!(raised.resource_per_tick, Quantity::from(6u32));

    let lowered = transition::apply_external_record(
        &raised,
        &ExternalRecord {
            resource:           Quantity::from(123u32),
            total_clicks:       9,
            prestige_level:     2,
            secondary_currency: Some(Quantity::from(8u32)),
        },
    );
    assert_eq!(lowered.prestige_level, 6);
    assert_eq!(lowered.secondary_currency, Quantity::from(8u32));
}

#[test]
fn achievements_unlock_once() {
    let s = transition::click(&fresh());
    let s = transition::unlock_achievements(&s);
    assert!(s.achievements.contains("first_click"));
    assert_eq!(s.achievements.len(), 1);

    let again = transition::unlock_achievements(&s);
    assert!(Arc::ptr_eq(&s, &again));
}

#[test]
fn reset_returns_initial_snapshot() {
    let s = transition::reset(NOW);
    assert_eq!(*s, GameSnapshot::initial(NOW));
}

// ── Properties ─────────────────────────────────────────────────

fn upgrade_ids() -> impl Strategy<Value = &'static str> {
    prop::sample::select(catalog::all().iter().map(|u| u.id).collect::<Vec<_>>())
}

proptest! {
    #[test]
    fn cost_never_decreases(id in upgrade_ids(), level in 0u32..80) {
        let here = cost::upgrade_cost(id, level).unwrap();
        let next = cost::upgrade_cost(id, level + 1).unwrap();
        prop_assert!(next >= here);
    }

    #[test]
    fn purchase_never_overdraws(
        id in upgrade_ids(),
        stardust in 0u64..5_000,
        credits in 0u64..5_000,
    ) {
        let mut s = GameSnapshot::initial(NOW);
        s.resource = Quantity::from(stardust);
        s.secondary_currency = Quantity::from(credits);
        let s = Arc::new(s);

        let after = transition::purchase_upgrade(&s, id);
        if cost::can_afford(&s, id) {
            prop_assert_eq!(after.level_of(id), 1);
            let spent = (&s.resource + &s.secondary_currency)
                - (&after.resource + &after.secondary_currency);
            prop_assert_eq!(spent, cost::upgrade_cost(id, 0).unwrap());
        } else {
            prop_assert!(Arc::ptr_eq(&s, &after));
        }
        prop_assert!(after.rates_consistent());
    }

    #[test]
    fn click_only_moves_resource_and_counter(clicks in 0u64..1_000, level in 0u32..5) {
        let mut s = GameSnapshot::initial(NOW);
        s.total_clicks = clicks;
        s.resource = Quantity::from(clicks * 3);
        s.prestige_level = level;
        s.resource_per_tick = accrual::per_tick_yield(&s);
        let s = Arc::new(s);

        let after = transition::click(&s);
        prop_assert_eq!(&after.resource, &(&s.resource + &s.resource_per_click));
        prop_assert_eq!(after.total_clicks, s.total_clicks + 1);

        let mut expected = GameSnapshot::clone(&after);
        expected.resource = s.resource.clone();
        expected.total_clicks = s.total_clicks;
        prop_assert_eq!(&expected, &*s);
    }

    #[test]
    fn idle_reward_caps_at_a_day(rate in any::<u64>()) {
        let rate = Quantity::from(rate);
        prop_assert_eq!(
            accrual::idle_reward(&rate, 100_000),
            accrual::idle_reward(&rate, 86_400)
        );
    }

    #[test]
    fn prestige_only_when_rich_enough(stardust in 0u64..2_000_000) {
        let s = with_stardust(stardust);
        let after = transition::activate_prestige(&s, NOW + 1);
        if stardust >= PRESTIGE_REQUIREMENT {
            prop_assert_eq!(after.prestige_level, 1);
            prop_assert_eq!(&after.resource, &Quantity::from(0u32));
        } else {
            prop_assert!(Arc::ptr_eq(&s, &after));
        }
    }
}

#[test]
fn credit_helper_is_unaffordable_for_stardust_items() {
    let s = with_credits(1_000);
    assert!(!cost::can_afford(&s, "telescope"));
    assert!(cost::can_afford(&s, "galacticnetwork"));
}
