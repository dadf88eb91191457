//! Integration tests for experience, levels and promotions.

use guildhall_jobs::{
    BufferedSink, EconomyLedger, EngineContext, EventKind, ExperienceCurve, Grade, JobClass,
    JobEvent, JobService, MemoryLedger, MemoryPlayerStore, PlayerId, PlayerStore,
    PromotionBlocker, Rules, MAX_EXP,
};
use rand::Rng;
use std::sync::{Arc, Barrier};
use std::thread;

struct Engine {
    jobs: JobService,
    store: Arc<MemoryPlayerStore>,
    ledger: Arc<dyn EconomyLedger>,
    events: Arc<BufferedSink>,
}

fn engine_with_ledger(ledger: Arc<dyn EconomyLedger>) -> Engine {
    let store = Arc::new(MemoryPlayerStore::new());
    let events = Arc::new(BufferedSink::new());
    let ctx = EngineContext::new(
        Arc::new(Rules::new()),
        store.clone(),
        Arc::clone(&ledger),
        events.clone(),
    );
    Engine {
        jobs: JobService::new(ctx),
        store,
        ledger,
        events,
    }
}

fn engine() -> Engine {
    engine_with_ledger(Arc::new(MemoryLedger::new()))
}

/// Reports a healthy balance but refuses every withdrawal, as if another
/// purchase drained the account between check and commit.
struct RacingLedger;

impl EconomyLedger for RacingLedger {
    fn balance(&self, _player: PlayerId) -> i64 {
        1_000_000
    }

    fn withdraw(&self, _player: PlayerId, _amount: i64) -> bool {
        false
    }

    fn deposit(&self, _player: PlayerId, _amount: i64, _reason: &str) -> bool {
        true
    }
}

// ============================================================================
// Curve properties
// ============================================================================

#[test]
fn test_level_is_monotonic_in_experience() {
    let curve = ExperienceCurve::default();
    let mut rng = rand::thread_rng();
    for _ in 0..10_000 {
        let a = rng.gen_range(0..=MAX_EXP);
        let b = rng.gen_range(0..=MAX_EXP);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        assert!(
            curve.level_for(lo) <= curve.level_for(hi),
            "level_for({lo}) > level_for({hi})"
        );
    }
}

#[test]
fn test_curve_round_trip() {
    let curve = ExperienceCurve::default();
    for level in 1..=curve.max_level() {
        assert_eq!(curve.level_for(curve.cumulative_exp_for_level(level)), level);
    }
    for level in 1..=70 {
        assert_eq!(
            curve.level_for_capped(curve.cumulative_exp_for_level(level), 70),
            level
        );
    }
}

// ============================================================================
// Experience
// ============================================================================

#[test]
fn test_first_level_up_scenario() {
    let e = engine();
    e.jobs.select_job(1, JobClass::Miner).unwrap();

    let curve = ExperienceCurve::default();
    assert_eq!(curve.level_up_cost(1), 110);

    assert_eq!(e.jobs.add_exp(1, JobClass::Miner, 110).unwrap(), 2);
    let record = e.store.record(1, JobClass::Miner).unwrap();
    assert_eq!((record.level, record.experience), (2, 110));
}

#[test]
fn test_experience_clamps_at_ceiling() {
    let e = engine();
    e.jobs.select_job(1, JobClass::Fisher).unwrap();
    e.jobs.add_exp(1, JobClass::Fisher, MAX_EXP * 2).unwrap();

    let record = e.store.record(1, JobClass::Fisher).unwrap();
    assert_eq!(record.experience, MAX_EXP);
    assert_eq!(record.level, 100);
}

#[test]
fn test_concurrent_grants_level_up_once() {
    for _ in 0..50 {
        let e = engine();
        e.jobs.select_job(1, JobClass::Miner).unwrap();
        let jobs = Arc::new(e.jobs);
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let jobs = Arc::clone(&jobs);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    jobs.add_exp(1, JobClass::Miner, 60).unwrap()
                })
            })
            .collect();

        let levels: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(levels.iter().filter(|&&l| l == 2).count(), 1, "{levels:?}");

        let record = e.store.record(1, JobClass::Miner).unwrap();
        assert_eq!((record.level, record.experience), (2, 120));

        let level_ups = e
            .events
            .drain()
            .into_iter()
            .filter(|ev| ev.kind() == EventKind::LevelUp)
            .count();
        assert_eq!(level_ups, 1);
    }
}

#[test]
fn test_many_players_in_parallel() {
    let e = engine();
    let players: Vec<PlayerId> = (1..=32).collect();
    for &p in &players {
        e.jobs.select_job(p, JobClass::Farmer).unwrap();
    }
    let jobs = Arc::new(e.jobs);

    let handles: Vec<_> = players
        .iter()
        .map(|&p| {
            let jobs = Arc::clone(&jobs);
            thread::spawn(move || {
                for _ in 0..100 {
                    jobs.add_exp(p, JobClass::Farmer, 7).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for &p in &players {
        assert_eq!(e.store.record(p, JobClass::Farmer).unwrap().experience, 700);
    }
}

// ============================================================================
// Promotions
// ============================================================================

#[test]
fn test_level_shortfall_reported_before_currency() {
    let ledger = Arc::new(MemoryLedger::new());
    let e = engine_with_ledger(ledger.clone());
    e.jobs.select_job(1, JobClass::Miner).unwrap();
    e.jobs.experience(JobClass::Miner).unwrap().set_level(1, 19);
    ledger.set_balance(1, 50_000);

    let check = e.jobs.can_promote(1, JobClass::Miner).unwrap();
    assert!(!check.allowed);
    assert_eq!(check.target, Some(Grade::Second));
    assert!(matches!(
        check.blocker,
        Some(PromotionBlocker::LevelTooLow { required: 20, .. })
    ));
    assert!(check.reason().contains("level"));
    assert!(!check.reason().contains("currency"));
}

#[test]
fn test_can_promote_is_idempotent() {
    let e = engine();
    e.jobs.select_job(1, JobClass::Herbalist).unwrap();
    e.jobs.experience(JobClass::Herbalist).unwrap().set_level(1, 45);

    let first = e.jobs.can_promote(1, JobClass::Herbalist).unwrap();
    let second = e.jobs.can_promote(1, JobClass::Herbalist).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_failed_withdrawal_leaves_record_untouched() {
    let e = engine_with_ledger(Arc::new(RacingLedger));
    e.jobs.select_job(1, JobClass::Miner).unwrap();
    e.jobs.experience(JobClass::Miner).unwrap().set_level(1, 30);
    e.events.drain();
    let before = e.store.record(1, JobClass::Miner).unwrap();

    assert!(e.jobs.can_promote(1, JobClass::Miner).unwrap().allowed);
    let result = e.jobs.promote(1, JobClass::Miner).unwrap();

    assert!(!result.success);
    assert_eq!(result.new_grade, Grade::First);
    assert_eq!(result.paid, 0);
    assert_eq!(e.store.record(1, JobClass::Miner).unwrap(), before);
    assert!(e.events.drain().is_empty());
    assert_eq!(e.ledger.balance(1), 1_000_000);
}

#[test]
fn test_concurrent_promotions_pay_once() {
    for _ in 0..50 {
        let ledger = Arc::new(MemoryLedger::new());
        let e = engine_with_ledger(ledger.clone());
        e.jobs.select_job(1, JobClass::Miner).unwrap();
        e.jobs.experience(JobClass::Miner).unwrap().set_level(1, 100);
        ledger.set_balance(1, 10_000);

        let jobs = Arc::new(e.jobs);
        let barrier = Arc::new(Barrier::new(4));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let jobs = Arc::clone(&jobs);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    jobs.promote(1, JobClass::Miner).unwrap()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.success).count(), 1, "{results:?}");
        assert_eq!(e.ledger.balance(1), 0);
        assert_eq!(
            e.store.record(1, JobClass::Miner).unwrap().grade,
            Grade::Second
        );

        let grade_ups = e
            .events
            .drain()
            .into_iter()
            .filter(|ev| ev.kind() == EventKind::GradeUp)
            .count();
        assert_eq!(grade_ups, 1);
    }
}

#[test]
fn test_promotion_path_to_top_grade() {
    let ledger = Arc::new(MemoryLedger::new());
    let e = engine_with_ledger(ledger.clone());

    e.jobs.select_job(1, JobClass::Miner).unwrap();
    e.jobs.experience(JobClass::Miner).unwrap().set_level(1, 100);
    ledger.set_balance(1, 260_000);

    for expected in [Grade::Second, Grade::Third, Grade::Fourth] {
        let result = e.jobs.promote(1, JobClass::Miner).unwrap();
        assert!(result.success, "{}", result.message);
        assert_eq!(result.new_grade, expected);
    }
    assert_eq!(e.ledger.balance(1), 0);

    let check = e.jobs.can_promote(1, JobClass::Miner).unwrap();
    assert_eq!(check.blocker, Some(PromotionBlocker::MaxGrade(Grade::Fourth)));

    let grade_ups: Vec<JobEvent> = e
        .events
        .drain()
        .into_iter()
        .filter(|ev| ev.kind() == EventKind::GradeUp)
        .collect();
    assert_eq!(grade_ups.len(), 3);
}
