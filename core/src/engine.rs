//! The generation engine: one run of the synthetic ledger.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Authentication catalog verification
//!   2. Entity factory            (or a supplied snapshot)
//!   3. Ledger State seeding
//!   4. Transaction generator     (mutates Ledger State)
//!   5. Authentication log generator
//!   6. One bulk write            (store runs only)
//!
//! RULES:
//!   - Every run builds a fresh GenerationContext: random streams,
//!     identity pool and ledger are never shared between runs.
//!   - All randomness flows through the context's RngBank.
//!   - Nothing is written until the full in-memory ledger exists.

use crate::{
    auth_catalog::AuthMethodCatalog,
    auth_log_generator::AuthLogGenerator,
    config::GeneratorConfig,
    entity_factory::EntityFactory,
    error::LedgerResult,
    identity_pool::IdentityPool,
    ledger_state::LedgerState,
    model::{AuthenticationAttempt, EntitySnapshot, TransactionStatus, TransactionType},
    rng::{RngBank, StreamSlot},
    sequence::IdSequence,
    store::SimStore,
    transaction_generator::{GenerationReport, TransactionGenerator, TransactionSettings},
    types::RunId,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-run state. Constructed inside each run and dropped with it.
pub struct GenerationContext {
    pub rng_bank: RngBank,
    pub identity: IdentityPool,
}

impl GenerationContext {
    pub fn fresh(seed: u64) -> Self {
        let rng_bank = RngBank::new(seed);
        let identity = IdentityPool::new(rng_bank.for_stream(StreamSlot::Identity));
        Self { rng_bank, identity }
    }
}

/// Everything one run produced, still in memory.
#[derive(Debug, Clone)]
pub struct GeneratedLedger {
    pub entities: EntitySnapshot,
    pub report: GenerationReport,
    pub auth_logs: Vec<AuthenticationAttempt>,
    pub ledger: LedgerState,
}

impl GeneratedLedger {
    pub fn summary(&self, run_id: &str, seed: u64) -> RunSummary {
        RunSummary {
            run_id: run_id.to_string(),
            seed,
            customers: self.entities.customers.len(),
            accounts: self.entities.accounts.len(),
            devices: self.entities.devices.len(),
            external_accounts: self.entities.external_accounts.len(),
            requested: self.report.requested,
            produced: self.report.produced(),
            abandoned: self.report.abandoned.len(),
            failed_attempts: self.report.failed_attempts,
            auth_attempts: self.auth_logs.len(),
            by_type: self
                .report
                .count_by_type()
                .into_iter()
                .map(|(k, v)| (k.as_str().to_string(), v))
                .collect(),
            by_status: self
                .report
                .count_by_status()
                .into_iter()
                .map(|(k, v)| (k.as_str().to_string(), v))
                .collect(),
        }
    }
}

/// Printable outcome of a run. Compare `produced` with `requested` to
/// detect under-generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub seed: u64,
    pub customers: usize,
    pub accounts: usize,
    pub devices: usize,
    pub external_accounts: usize,
    pub requested: usize,
    pub produced: usize,
    pub abandoned: usize,
    pub failed_attempts: u32,
    pub auth_attempts: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
}

pub struct LedgerEngine {
    pub run_id: RunId,
    seed: u64,
    config: GeneratorConfig,
}

impl LedgerEngine {
    pub fn new(run_id: RunId, seed: u64, config: GeneratorConfig) -> Self {
        Self {
            run_id,
            seed,
            config,
        }
    }

    /// Fresh run id for `seed`. Unique even when the same seed is run
    /// repeatedly against one database.
    pub fn new_run_id(seed: u64) -> RunId {
        format!("run-{seed}-{}", uuid::Uuid::new_v4().simple())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Build entities and generate the ledger entirely in memory.
    pub fn generate(
        &self,
        catalog: &AuthMethodCatalog,
        ids: &mut dyn IdSequence,
    ) -> LedgerResult<GeneratedLedger> {
        self.config.validate()?;
        catalog.verify()?;
        let mut ctx = GenerationContext::fresh(self.seed);
        let entities = EntityFactory::new(&self.config, &ctx.rng_bank).build(&mut ctx.identity, ids)?;
        self.generate_with(ctx, entities, catalog, ids)
    }

    /// Generate against a supplied entity snapshot (e.g. loaded from a store).
    pub fn generate_from_snapshot(
        &self,
        entities: EntitySnapshot,
        catalog: &AuthMethodCatalog,
        ids: &mut dyn IdSequence,
    ) -> LedgerResult<GeneratedLedger> {
        self.config.validate()?;
        catalog.verify()?;
        let ctx = GenerationContext::fresh(self.seed);
        self.generate_with(ctx, entities, catalog, ids)
    }

    fn generate_with(
        &self,
        ctx: GenerationContext,
        entities: EntitySnapshot,
        catalog: &AuthMethodCatalog,
        ids: &mut dyn IdSequence,
    ) -> LedgerResult<GeneratedLedger> {
        // Preconditions are checked before the first record is drawn.
        let txn_gen =
            TransactionGenerator::new(&entities, TransactionSettings::from_config(&self.config))?;
        let auth_gen = AuthLogGenerator::new(&entities, catalog)?;

        let mut ledger = LedgerState::from_snapshot(&entities);
        let mut txn_rng = ctx.rng_bank.for_stream(StreamSlot::Transaction);
        let report = txn_gen.generate(self.config.transaction_count, &mut ledger, &mut txn_rng, ids);

        let mut auth_rng = ctx.rng_bank.for_stream(StreamSlot::Authentication);
        let auth_logs = auth_gen.generate(&report.transactions, &mut auth_rng, ids)?;

        if report.shortfall() > 0 {
            log::info!(
                "run {}: under-generated by {} of {} requested",
                self.run_id,
                report.shortfall(),
                report.requested
            );
        }

        Ok(GeneratedLedger {
            entities,
            report,
            auth_logs,
            ledger,
        })
    }

    /// Full run against a store: generate in memory, then write once.
    pub fn run(&self, store: &SimStore) -> LedgerResult<(GeneratedLedger, RunSummary)> {
        let catalog = store.auth_methods()?;
        catalog.verify()?;
        let mut ids = store.sequence_book()?;

        let generated = self.generate(&catalog, &mut ids)?;
        store.persist_run(&self.run_id, self.seed, &generated)?;

        let summary = generated.summary(&self.run_id, self.seed);
        log::info!(
            "run {} complete: {} transactions, {} authentication attempts",
            self.run_id,
            summary.produced,
            summary.auth_attempts
        );
        Ok((generated, summary))
    }
}

/// Completed-transaction volume per category (test and report helper).
pub fn completed_volume_by_type(
    report: &GenerationReport,
) -> BTreeMap<TransactionType, rust_decimal::Decimal> {
    let mut out = BTreeMap::new();
    for txn in report
        .transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Completed)
    {
        *out.entry(txn.transaction_type)
            .or_insert(rust_decimal::Decimal::ZERO) += txn.amount;
    }
    out
}
