//! ledger-runner: headless runner for the synthetic ledger generator.
//!
//! Usage:
//!   ledger-runner --seed 12345 --transactions 150 --db ledger.db
//!   ledger-runner --config data/generator.json --policy legacy --json
//!   ledger-runner --seed 7 --as-of "2025-06-30 18:00:00"
//!
//! Timestamps are anchored at `--as-of` (or `as_of` in the config file).
//! `--as-of now` opts into the wall clock; the default is a fixed instant.

use anyhow::Result;
use chrono::NaiveDateTime;
use ledger_synth_core::{
    config::GeneratorConfig,
    engine::{completed_volume_by_type, GeneratedLedger, LedgerEngine, RunSummary},
    policy::PolicyPreset,
    store::SimStore,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let json = args.iter().any(|a| a == "--json");
    let db = flag_value(&args, "--db").unwrap_or(":memory:");

    let mut config = match flag_value(&args, "--config") {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    config.transaction_count = parse_arg(&args, "--transactions", config.transaction_count);
    config.customers = parse_arg(&args, "--customers", config.customers);
    config.max_retries = parse_arg(&args, "--max-retries", config.max_retries);
    if let Some(name) = flag_value(&args, "--policy") {
        config.policy = name
            .parse::<PolicyPreset>()
            .map_err(|e| anyhow::anyhow!("--policy: {e}"))?;
    }
    match flag_value(&args, "--as-of") {
        Some("now") => config.as_of = Some(chrono::Local::now().naive_local()),
        Some(value) => {
            let as_of = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .map_err(|e| anyhow::anyhow!("--as-of '{value}': {e}"))?;
            config.as_of = Some(as_of);
        }
        None => {}
    }
    config.validate()?;
    log::debug!("resolved config: {config:?}");

    let engine = LedgerEngine::new(LedgerEngine::new_run_id(seed), seed, config);
    if !json {
        let config = engine.config();
        println!("Synthetic ledger: ledger-runner");
        println!("  seed:          {}", engine.seed());
        println!("  transactions:  {}", config.transaction_count);
        println!("  customers:     {}", config.customers);
        println!("  max retries:   {}", config.max_retries);
        println!("  policy:        {}", config.policy.as_str());
        println!("  as of:         {}", config.reference_time());
        println!("  db:            {db}");
        println!();
    }

    let store = SimStore::open(db)?;
    store.migrate()?;
    let (generated, summary) = engine.run(&store)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, &generated, &store)?;
    }
    Ok(())
}

fn print_summary(summary: &RunSummary, generated: &GeneratedLedger, store: &SimStore) -> Result<()> {
    let stored_txns = store.transaction_count(&summary.run_id)?;
    let stored_auth = store.auth_log_count(&summary.run_id)?;

    println!("=== RUN SUMMARY ===");
    println!("  run_id:           {}", summary.run_id);
    println!("  customers:        {}", summary.customers);
    println!("  accounts:         {}", summary.accounts);
    println!("  devices:          {}", summary.devices);
    println!("  external accts:   {}", summary.external_accounts);
    println!("  requested:        {}", summary.requested);
    println!("  produced:         {}", summary.produced);
    println!("  abandoned slots:  {}", summary.abandoned);
    println!("  failed attempts:  {}", summary.failed_attempts);
    println!("  auth attempts:    {}", summary.auth_attempts);
    println!("  stored:           {stored_txns} transactions, {stored_auth} auth logs");
    if summary.produced < summary.requested {
        println!(
            "  WARNING: under-generated by {}",
            summary.requested - summary.produced
        );
    }

    println!();
    println!("=== STATUS MIX ===");
    for (status, n) in &summary.by_status {
        println!("  {status:<12} {n:>6}");
    }

    println!();
    println!("=== CATEGORY MIX (count / completed volume) ===");
    let volume = completed_volume_by_type(&generated.report);
    for (category, n) in &summary.by_type {
        let amount = volume
            .iter()
            .find(|(t, _)| t.as_str() == category.as_str())
            .map(|(_, v)| v.to_string())
            .unwrap_or_else(|| "0".into());
        println!("  {category:<34} {n:>6}  {amount:>22}");
    }

    if !generated.report.abandoned.is_empty() {
        println!();
        println!("=== ABANDONED SLOTS ===");
        for slot in &generated.report.abandoned {
            println!(
                "  slot {:>5} after {} attempts: {}",
                slot.slot, slot.attempts, slot.reason
            );
        }
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
