//! DeepSub Headless Simulation Harness
//!
//! Validates pure logic and the full engine without a host environment.
//! Runs entirely in-process, with no rendering, no I/O beyond stdout.
//!
//! Usage:
//!   cargo run -p deepsub-simtest
//!   cargo run -p deepsub-simtest -- --verbose

use deepsub_core::components::Environment;
use deepsub_core::{Notification, SimulationEngine, Vehicle};
use deepsub_logic::config::ChargeTuning;
use deepsub_logic::indicator::{format_amount, urgency_color, IndicatorColor};
use deepsub_logic::modules::ModuleKind;
use deepsub_logic::power_index::{PowerCostTable, POWER_INDEX_COUNT};
use deepsub_logic::tiers::TieredGroup;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Tuning fixture (same JSON a deployment would ship) ──────────────────
const TUNING_JSON: &str = include_str!("../../../data/charge_tuning.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== DeepSub Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Tuning fixture
    let tuning = match load_tuning(&mut results) {
        Some(t) => t,
        None => report_and_exit(results, verbose),
    };

    // 2. Tier resolution sweep
    results.extend(validate_tiers(verbose));

    // 3. Power index tables
    results.extend(validate_power_tables(verbose));

    // 4. Indicator formatting
    results.extend(validate_indicators(verbose));

    // 5. End-to-end engine scenarios
    results.extend(validate_engine(&tuning, verbose));

    // 6. Randomized invariant sweep
    results.extend(validate_random_loadouts(&tuning, verbose));

    report_and_exit(results, verbose)
}

fn report_and_exit(results: Vec<TestResult>, verbose: bool) -> ! {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
    std::process::exit(0);
}

// ── 1. Tuning fixture ───────────────────────────────────────────────────

fn load_tuning(results: &mut Vec<TestResult>) -> Option<ChargeTuning> {
    println!("--- Tuning Fixture ---");
    let tuning: ChargeTuning = match serde_json::from_str(TUNING_JSON) {
        Ok(t) => t,
        Err(e) => {
            results.push(check(
                "tuning_parse",
                false,
                format!("JSON parse error: {}", e),
            ));
            return None;
        }
    };

    results.push(check("tuning_parse", true, "fixture deserializes"));
    results.push(check(
        "tuning_bio_unit_cap",
        (tuning.bio_unit_cap() - 4.5).abs() < 1e-6,
        format!("per-unit bio cap = {}", tuning.bio_unit_cap()),
    ));
    results.push(check(
        "tuning_reactor_caps_ordered",
        tuning.max_bio_reactors <= tuning.bio_reactor_hard_cap,
        "base cap within hard cap",
    ));
    Some(tuning)
}

// ── 2. Tier resolution ──────────────────────────────────────────────────

fn validate_tiers(_verbose: bool) -> Vec<TestResult> {
    println!("--- Tier Resolution ---");
    let mut results = Vec::new();

    let mut group = TieredGroup::new(0u16);
    group.begin_scan();
    for (i, v) in [1u16, 3, 2].iter().enumerate() {
        group.count(*v, i as u32).unwrap();
    }
    let outcome = group.finish_scan().unwrap();
    results.push(check(
        "tier_max_wins",
        outcome.value == 3,
        format!("resolved {}", outcome.value),
    ));

    group.begin_scan();
    let outcome = group.finish_scan().unwrap();
    results.push(check(
        "tier_cleared_on_empty",
        outcome.cleared && outcome.value == 0,
        "floor restored once",
    ));

    group.begin_scan();
    let outcome = group.finish_scan().unwrap();
    results.push(check(
        "tier_cleared_fires_once",
        !outcome.cleared,
        "second empty scan quiet",
    ));

    let mut bare = TieredGroup::new(0u16);
    results.push(check(
        "tier_count_needs_begin_scan",
        bare.count(1, 0).is_err(),
        "protocol violation reported",
    ));

    results
}

// ── 3. Power index tables ───────────────────────────────────────────────

fn validate_power_tables(_verbose: bool) -> Vec<TestResult> {
    println!("--- Power Index Tables ---");
    let mut results = Vec::new();
    let table = PowerCostTable::standard();

    let ratings: Vec<f32> = (0..POWER_INDEX_COUNT)
        .map(|i| table.costs_for(i).unwrap().engine_rating)
        .collect();
    results.push(check(
        "table_engine_ratings",
        ratings == vec![1.0, 3.0, 5.0, 6.0],
        format!("{:?}", ratings),
    ));

    results.push(check(
        "table_rejects_out_of_range",
        table.costs_for(POWER_INDEX_COUNT).is_err(),
        "index 4 fails fast",
    ));

    let monotone = (1..POWER_INDEX_COUNT).all(|i| {
        let prev = table.costs_for(i - 1).unwrap();
        let next = table.costs_for(i).unwrap();
        next.engine_rating >= prev.engine_rating
            && next.silent_running <= prev.silent_running
            && next.sonar <= prev.sonar
            && next.shield <= prev.shield
    });
    results.push(check(
        "table_monotone",
        monotone,
        "higher index never costs more",
    ));

    results
}

// ── 4. Indicators ───────────────────────────────────────────────────────

fn validate_indicators(_verbose: bool) -> Vec<TestResult> {
    println!("--- Indicators ---");
    let mut results = Vec::new();

    results.push(check(
        "indicator_grouping",
        format_amount(1234567.0) == "1,234,567",
        format_amount(1234567.0),
    ));
    results.push(check(
        "indicator_urgency",
        urgency_color(10.0, 100.0) == IndicatorColor::Red
            && urgency_color(90.0, 100.0) == IndicatorColor::White,
        "red below 20%, white above 50%",
    ));

    results
}

// ── 5. Engine scenarios ─────────────────────────────────────────────────

fn validate_engine(tuning: &ChargeTuning, verbose: bool) -> Vec<TestResult> {
    println!("--- Engine Scenarios ---");
    let mut results = Vec::new();

    // Power index scenario: empty vehicle, then Mk1 + Mk2.
    let mut engine = SimulationEngine::new(tuning.clone());
    let vehicle = engine.spawn_vehicle("harness", 1200.0, 6);
    engine.tick().unwrap();

    let baseline = engine.world.get::<&Vehicle>(vehicle).unwrap().power_rating;
    results.push(check(
        "engine_baseline_rating",
        baseline == 1.0,
        format!("rating {}", baseline),
    ));

    engine.set_module(vehicle, 0, Some(ModuleKind::PowerEfficiencyMk1));
    engine.set_module(vehicle, 1, Some(ModuleKind::PowerEfficiencyMk2));
    engine.tick().unwrap();

    let boosted = engine.world.get::<&Vehicle>(vehicle).unwrap().power_rating;
    let notifications = engine.drain_notifications();
    let rating_changes = notifications
        .iter()
        .filter(|n| matches!(n, Notification::PowerRatingChanged { .. }))
        .count();
    results.push(check(
        "engine_best_tier_wins",
        boosted == 5.0 && rating_changes == 1,
        format!("rating {} with {} notification(s)", boosted, rating_changes),
    ));

    // Bio arbitration scenario: 3 reactors, cap 2, request far above yield.
    let mut engine = SimulationEngine::new(tuning.clone());
    let vehicle = engine.spawn_vehicle("bio-bay", 1200.0, 6);
    for priority in 0..3u8 {
        engine.add_bio_reactor(vehicle, 200.0, 200.0, priority);
    }
    engine.consume_power(vehicle, 100.0);
    engine.tick().unwrap();

    let deficit = engine.world.get::<&Vehicle>(vehicle).unwrap().power_deficit();
    let expected = 100.0 - 2.0 * tuning.bio_unit_cap();
    results.push(check(
        "engine_bio_cap",
        (deficit - expected).abs() < 1e-3,
        format!("deficit {} after one tick", deficit),
    ));

    if verbose {
        if let Some(snapshots) = engine.hud_snapshots(vehicle) {
            for s in snapshots {
                println!("    hud: {} {} ({:?})", s.icon, s.text, s.color);
            }
        }
    }

    // Registry lifecycle: despawn mid-simulation.
    let before = engine.bundle_count();
    engine.world.despawn(vehicle).unwrap();
    engine.tick().unwrap();
    results.push(check(
        "engine_dead_vehicle_evicted",
        before == 1 && engine.bundle_count() == 0,
        "bundle torn down with the vehicle",
    ));

    results
}

// ── 6. Randomized invariants ────────────────────────────────────────────

fn validate_random_loadouts(tuning: &ChargeTuning, verbose: bool) -> Vec<TestResult> {
    println!("--- Randomized Invariants ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(0x5EA);

    let modules = ModuleKind::all();
    let mut violations = 0;
    let iterations = 200;

    for _ in 0..iterations {
        let mut engine = SimulationEngine::new(tuning.clone());
        let vehicle = engine.spawn_vehicle("random", 1200.0, 6);

        for slot_id in 0..6 {
            if rng.gen_bool(0.6) {
                let kind = modules[rng.gen_range(0..modules.len())];
                engine.set_module(vehicle, slot_id, Some(kind));
            }
        }
        if rng.gen_bool(0.5) {
            let count: u8 = rng.gen_range(1..=4);
            for priority in 0..count {
                engine.add_bio_reactor(vehicle, 200.0, rng.gen_range(0.0..200.0), priority);
            }
        }
        engine.set_environment(
            vehicle,
            Environment {
                depth: rng.gen_range(0.0..500.0),
                sun_intensity: rng.gen_range(0.0..1.0),
                water_temp: rng.gen_range(5.0..90.0),
            },
        );

        let consumed = rng.gen_range(0.0..300.0);
        engine.consume_power(vehicle, consumed);
        let deficit_before = engine.world.get::<&Vehicle>(vehicle).unwrap().power_deficit();

        if engine.tick().is_err() {
            violations += 1;
            continue;
        }

        let veh = engine.world.get::<&Vehicle>(vehicle).unwrap();
        let recovered = deficit_before - veh.power_deficit();
        // Delivered power stays within [0, requested]; charge stays within
        // capacity; rating always comes from the defined tables.
        if !(-1e-3..=deficit_before + 1e-3).contains(&recovered)
            || veh.power_charge > veh.power_capacity + 1e-3
            || ![1.0, 3.0, 5.0, 6.0].contains(&veh.power_rating)
        {
            violations += 1;
        }
    }

    if verbose {
        println!("    {} randomized loadouts checked", iterations);
    }
    results.push(check(
        "random_loadout_invariants",
        violations == 0,
        format!("{} violations in {} runs", violations, iterations),
    ));

    results
}
