//! # Golden Path
//!
//! One scripted player session against the shipped balance data:
//!
//! Select Miner → Mine → Sell → Level Up → Promote → Try Chef
//!
//! Prints every step and the notifications the engine emitted.

use std::sync::Arc;

use guildhall_jobs::{
    ChannelSink, EngineConfig, EngineContext, JobClass, JobEvent, JobResult, JobService,
    MemoryLedger, MemoryPlayerStore, Rules, SellService,
};

const CONFIG: &str = include_str!("../../../../data/schemas/jobs.toml");

const PLAYER: u64 = 1;

fn print_summary(jobs: &JobService) {
    for s in jobs.summaries(PLAYER) {
        println!(
            "  {:<10} {}  level {:>3}/{:<3}  exp {:>7}  next {:>6}  {:>5.1}%  {}",
            s.job.display_name(),
            s.tier,
            s.level,
            s.max_level,
            s.experience,
            s.exp_to_next,
            s.progress * 100.0,
            s.grade,
        );
    }
}

fn describe(event: &JobEvent) -> String {
    match event {
        JobEvent::LevelUp {
            job,
            old_level,
            new_level,
            ..
        } => format!("{job} level {old_level} -> {new_level}"),
        JobEvent::GradeUp {
            job,
            new_grade,
            bonuses,
            ..
        } => format!("{job} promoted to {new_grade} [{}]", bonuses.join(", ")),
        JobEvent::JobSelected { job, .. } => format!("now working as {job}"),
    }
}

fn main() -> JobResult<()> {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║           GUILDHALL JOBS - GOLDEN PATH                           ║");
    println!("║           Select → Mine → Sell → Promote                         ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let config = EngineConfig::from_toml_str(CONFIG)?;
    let rules = Arc::new(Rules::from_config(&config)?);
    let store = Arc::new(MemoryPlayerStore::new());
    let ledger = Arc::new(MemoryLedger::new());
    let (sink, events) = ChannelSink::unbounded();

    let ctx = EngineContext::new(rules, store.clone(), ledger.clone(), Arc::new(sink));
    let jobs = JobService::new(ctx.clone());
    let shop = SellService::new(ctx);

    // =========================================================================
    // STEP 1: Job selection
    // =========================================================================
    jobs.select_job(PLAYER, JobClass::Miner)?;
    println!("[1] Selected Miner");
    if let Err(err) = jobs.select_job(PLAYER, JobClass::Chef) {
        println!("    Chef refused: {err}");
    }
    for status in jobs.unlock_status(PLAYER, JobClass::Chef) {
        let mark = if status.passed { "x" } else { " " };
        println!("    [{mark}] {}", status.description);
    }

    // =========================================================================
    // STEP 2: Mining
    // =========================================================================
    let gained = jobs.grant_exp_for_action(PLAYER, JobClass::Miner, "iron_ore", 200)?;
    println!("[2] Mined 200 iron ore: +{gained} exp");
    print_summary(&jobs);

    // =========================================================================
    // STEP 3: Selling
    // =========================================================================
    println!(
        "[3] Quote for 64 iron ore: sell {} / buy {}",
        shop.quote_sell(PLAYER, "iron_ore", 64)?,
        shop.quote_buy(PLAYER, "iron_ore", 64)?
    );
    let sale = shop.sell(PLAYER, "iron_ore", 64);
    println!(
        "    {} (+{} currency, +{} exp)",
        sale.message, sale.earned_currency, sale.earned_exp
    );

    // =========================================================================
    // STEP 4: Promotion
    // =========================================================================
    let check = jobs.can_promote(PLAYER, JobClass::Miner)?;
    println!("[4] Promotion check: {}", check.reason());

    let gained = jobs.grant_exp_for_action(PLAYER, JobClass::Miner, "diamond_ore", 250)?;
    println!("    Mined 250 diamond ore: +{gained} exp");
    ledger.set_balance(PLAYER, 15_000);

    let promotion = jobs.promote(PLAYER, JobClass::Miner)?;
    println!(
        "    {} (paid {}, {} -> {})",
        promotion.message, promotion.paid, promotion.old_grade, promotion.new_grade
    );
    print_summary(&jobs);

    // =========================================================================
    // STEP 5: Second tier
    // =========================================================================
    store.set_catalog_count(PLAYER, 12);
    match jobs.select_job(PLAYER, JobClass::Chef) {
        Ok(()) => println!("[5] Selected Chef"),
        Err(err) => println!("[5] Chef refused: {err}"),
    }
    match jobs.grant_job(PLAYER, JobClass::Artisan) {
        Ok(()) => println!("    Granted Artisan (admin)"),
        Err(err) => println!("    Artisan grant refused: {err}"),
    }
    print_summary(&jobs);

    // =========================================================================
    // Notifications
    // =========================================================================
    println!();
    println!("Notifications:");
    for event in events.try_iter() {
        println!("  {}", describe(&event));
    }
    Ok(())
}
