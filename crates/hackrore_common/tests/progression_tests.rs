//! Tests for XP accumulation, level derivation and unlock monotonicity.

use hackrore_common::levels::threshold_for_level;
use hackrore_common::{level_for_xp, MemoryStore, ProgressionLedger, MAX_LEVEL};

fn fresh() -> ProgressionLedger {
    ProgressionLedger::load(MemoryStore::shared())
}

#[test]
fn test_xp_is_sum_regardless_of_batching() {
    let amounts = [50u64, 100, 20, 10, 250, 500, 50, 100, 20, 7];
    let total: u64 = amounts.iter().sum();

    let mut one_by_one = fresh();
    for a in amounts {
        one_by_one.add_xp(a, "step").unwrap();
    }

    let mut reversed = fresh();
    for a in amounts.iter().rev() {
        reversed.add_xp(*a, "step").unwrap();
    }

    let mut batched = fresh();
    batched.add_xp(total, "all at once").unwrap();

    for ledger in [&one_by_one, &reversed, &batched] {
        assert_eq!(ledger.xp(), total);
        assert_eq!(ledger.level(), level_for_xp(total));
    }
}

#[test]
fn test_level_never_decreases() {
    let mut ledger = fresh();
    let mut last = ledger.level();
    for _ in 0..120 {
        ledger.add_xp(43, "tick").unwrap();
        assert!(ledger.level() >= last);
        last = ledger.level();
    }
    assert_eq!(ledger.level(), MAX_LEVEL);
}

#[test]
fn test_unlocks_stay_unlocked() {
    let mut ledger = fresh();
    ledger.add_xp(300, "level three").unwrap();
    assert!(ledger.check_unlock("theme_cyberpunk"));

    for _ in 0..10 {
        ledger.add_xp(1, "more").unwrap();
        assert!(ledger.check_unlock("theme_cyberpunk"));
        assert!(ledger.check_unlock("badge_novice"));
    }
}

#[test]
fn test_progress_bounds_across_table() {
    let mut ledger = fresh();
    for _ in 0..200 {
        let p = ledger.progress_to_next_level();
        assert!((0.0..=100.0).contains(&p.progress_percent));
        assert_eq!(p.current_level_threshold, threshold_for_level(ledger.level()));
        assert!(p.next_level_threshold >= p.current_level_threshold);
        ledger.add_xp(29, "tick").unwrap();
    }
}

#[test]
fn test_example_scenario_first_level() {
    let mut ledger = fresh();
    let award = ledger.add_xp(100, "x").unwrap();
    assert_eq!(ledger.level(), 2);
    let unlocked: Vec<_> = award.unlocked.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(unlocked, vec!["badge_novice"]);
    assert!(ledger
        .unlockables()
        .iter()
        .filter(|u| u.required_level <= 2)
        .all(|u| u.unlocked));
}

#[test]
fn test_state_survives_reload() {
    let store = MemoryStore::shared();
    let mut ledger = ProgressionLedger::load(store.clone());
    ledger.add_xp(1500, "big run").unwrap();

    let reloaded = ProgressionLedger::load(store);
    assert_eq!(reloaded.xp(), 1500);
    assert_eq!(reloaded.level(), 6);
    assert_eq!(reloaded.unlockables(), ledger.unlockables());
}
