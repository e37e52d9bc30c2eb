//! Transaction Generator: the weighted payment stream.
//!
//! RULES:
//!   - Slots run one at a time; each commit is applied to the Ledger State
//!     before the next slot reads a balance.
//!   - Every balance check reads the Ledger State directly.
//!   - A slot is a small state machine:
//!       Attempting → Committed
//!       Attempting → Retrying → Attempting | Abandoned
//!     Abandoned slots produce no record and are reported, not raised.

use crate::{
    amount::AmountSampler,
    config::GeneratorConfig,
    error::{LedgerError, LedgerResult},
    ledger_state::LedgerState,
    model::{
        BankAccount, Destination, EntitySnapshot, PaymentTransaction, TransactionStatus,
        TransactionType,
    },
    policy::{SecurityTierPolicy, TransactionPolicy},
    rng::StreamRng,
    sequence::{IdSequence, SequenceKind},
    types::{AccountId, CustomerId, DeviceId, ExternalAccountId},
};
use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;

/// Timestamps are spread uniformly over this many days before `as_of`.
pub const TIMESTAMP_WINDOW_DAYS: i64 = 30;

/// Why a single attempt did not commit. Always recoverable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotViolation {
    #[error("customer {customer_id} holds a single active account")]
    NoSiblingAccount { customer_id: CustomerId },

    #[error("no active account belongs to another customer")]
    NoOtherOwnerAccount,

    #[error("no external accounts loaded")]
    NoExternalAccounts,

    #[error("amount {amount} is not positive")]
    NonPositiveAmount { amount: Decimal },

    #[error("balance {balance} cannot cover {amount}")]
    InsufficientBalance { balance: Decimal, amount: Decimal },

    #[error("internal error: {0}")]
    Internal(String),
}

/// Per-slot lifecycle. Committed and Abandoned are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotState {
    Attempting { attempt: u32 },
    Retrying { attempt: u32, reason: SlotViolation },
    Committed { attempt: u32, transaction: Box<PaymentTransaction> },
    Abandoned { attempts: u32, reason: SlotViolation },
}

impl SlotState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed { .. } | Self::Abandoned { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AbandonedSlot {
    pub slot: usize,
    pub attempts: u32,
    pub reason: SlotViolation,
}

/// What a run produced. Fewer transactions than requested is normal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    pub requested: usize,
    pub transactions: Vec<PaymentTransaction>,
    pub abandoned: Vec<AbandonedSlot>,
    /// Attempts that failed and were retried or abandoned.
    pub failed_attempts: u32,
}

impl GenerationReport {
    pub fn produced(&self) -> usize {
        self.transactions.len()
    }

    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.produced())
    }

    pub fn count_by_type(&self) -> BTreeMap<TransactionType, usize> {
        let mut counts = BTreeMap::new();
        for txn in &self.transactions {
            *counts.entry(txn.transaction_type).or_insert(0) += 1;
        }
        counts
    }

    pub fn count_by_status(&self) -> BTreeMap<TransactionStatus, usize> {
        let mut counts = BTreeMap::new();
        for txn in &self.transactions {
            *counts.entry(txn.status).or_insert(0) += 1;
        }
        counts
    }
}

/// Knobs for one transaction run, resolved from the config.
#[derive(Debug, Clone)]
pub struct TransactionSettings {
    pub policy: TransactionPolicy,
    pub tier_policy: SecurityTierPolicy,
    pub max_retries: u32,
    pub edge_case_weight: f64,
    pub as_of: NaiveDateTime,
}

impl TransactionSettings {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            policy: config.transaction_policy(),
            tier_policy: config.security_tier,
            max_retries: config.max_retries.max(1),
            edge_case_weight: config.edge_case_weight,
            as_of: config.reference_time(),
        }
    }
}

/// Source account fields an attempt needs. Copied out of the snapshot so
/// the balance itself is never captured here.
#[derive(Debug, Clone, Copy)]
struct SourceAccount {
    account_id: AccountId,
    customer_id: CustomerId,
}

impl From<&BankAccount> for SourceAccount {
    fn from(a: &BankAccount) -> Self {
        Self {
            account_id: a.account_id,
            customer_id: a.customer_id,
        }
    }
}

pub struct TransactionGenerator {
    settings: TransactionSettings,
    sampler: AmountSampler,
    active_accounts: Vec<SourceAccount>,
    accounts_by_customer: BTreeMap<CustomerId, Vec<AccountId>>,
    external_accounts: Vec<ExternalAccountId>,
    active_devices: Vec<DeviceId>,
}

impl TransactionGenerator {
    /// Fails when the snapshot has no active accounts or no active devices.
    pub fn new(snapshot: &EntitySnapshot, settings: TransactionSettings) -> LedgerResult<Self> {
        let active_accounts: Vec<SourceAccount> =
            snapshot.active_accounts().map(SourceAccount::from).collect();
        if active_accounts.is_empty() {
            return Err(LedgerError::NoActiveAccounts);
        }
        let active_devices: Vec<DeviceId> =
            snapshot.active_devices().map(|d| d.device_id).collect();
        if active_devices.is_empty() {
            return Err(LedgerError::NoActiveDevices);
        }

        let mut accounts_by_customer: BTreeMap<CustomerId, Vec<AccountId>> = BTreeMap::new();
        for acct in &active_accounts {
            accounts_by_customer
                .entry(acct.customer_id)
                .or_default()
                .push(acct.account_id);
        }

        let external_accounts = snapshot
            .external_accounts
            .iter()
            .map(|a| a.account_id)
            .collect();

        Ok(Self {
            sampler: AmountSampler::new(settings.edge_case_weight),
            settings,
            active_accounts,
            accounts_by_customer,
            external_accounts,
            active_devices,
        })
    }

    /// Produce up to `count` transactions, committing completed ones to `ledger`.
    pub fn generate(
        &self,
        count: usize,
        ledger: &mut LedgerState,
        rng: &mut StreamRng,
        ids: &mut dyn IdSequence,
    ) -> GenerationReport {
        log::debug!("drawing {count} slots from the {} stream", rng.name);
        let mut report = GenerationReport {
            requested: count,
            transactions: Vec::with_capacity(count),
            ..GenerationReport::default()
        };

        for slot in 0..count {
            let (terminal, failed) = self.run_slot(slot, ledger, rng, ids);
            report.failed_attempts += failed;
            match terminal {
                SlotState::Committed { transaction, .. } => report.transactions.push(*transaction),
                SlotState::Abandoned { attempts, reason } => {
                    log::debug!("slot {slot} abandoned after {attempts} attempts: {reason}");
                    report.abandoned.push(AbandonedSlot {
                        slot,
                        attempts,
                        reason,
                    });
                }
                // run_slot only returns terminal states
                other => debug_assert!(other.is_terminal(), "non-terminal slot state {other:?}"),
            }
        }

        log::info!(
            "transactions: {} of {} produced, {} slots abandoned, {} failed attempts",
            report.produced(),
            report.requested,
            report.abandoned.len(),
            report.failed_attempts
        );
        report
    }

    /// Drive one slot to a terminal state. Returns it with the number of
    /// failed attempts along the way.
    pub fn run_slot(
        &self,
        slot: usize,
        ledger: &mut LedgerState,
        rng: &mut StreamRng,
        ids: &mut dyn IdSequence,
    ) -> (SlotState, u32) {
        let mut failed = 0;
        let mut state = SlotState::Attempting { attempt: 1 };
        while !state.is_terminal() {
            state = match state {
                SlotState::Attempting { attempt } => match self.attempt(ledger, rng, ids) {
                    Ok(transaction) => SlotState::Committed {
                        attempt,
                        transaction: Box::new(transaction),
                    },
                    Err(reason) => {
                        failed += 1;
                        SlotState::Retrying { attempt, reason }
                    }
                },
                SlotState::Retrying { attempt, reason } => {
                    if attempt >= self.settings.max_retries {
                        SlotState::Abandoned {
                            attempts: attempt,
                            reason,
                        }
                    } else {
                        log::debug!("slot {slot} attempt {attempt} retrying: {reason}");
                        SlotState::Attempting {
                            attempt: attempt + 1,
                        }
                    }
                }
                terminal => terminal,
            };
        }
        (state, failed)
    }

    /// One attempt: draw every field, check balances, then commit.
    fn attempt(
        &self,
        ledger: &mut LedgerState,
        rng: &mut StreamRng,
        ids: &mut dyn IdSequence,
    ) -> Result<PaymentTransaction, SlotViolation> {
        let policy = &self.settings.policy;

        // 1. Category
        let category = TransactionPolicy::category_at(rng.pick_weighted(&policy.category_weights));

        // 2. Source account
        let source = *rng
            .pick(&self.active_accounts)
            .ok_or_else(|| SlotViolation::Internal("active account pool is empty".into()))?;

        // 3. Destination
        let destination = self.resolve_destination(category, source, rng)?;

        // 4. Amount
        let amount = if category == TransactionType::Inquiry {
            Decimal::ZERO
        } else {
            let draw = self.sampler.draw(ledger.balance(source.account_id), rng);
            if draw.amount <= Decimal::ZERO {
                return Err(SlotViolation::NonPositiveAmount {
                    amount: draw.amount,
                });
            }
            draw.amount
        };

        // 5. Status, checked against the current ledger balance
        let status = TransactionPolicy::status_at(rng.pick_weighted(&policy.status_weights));
        if status == TransactionStatus::Completed {
            let balance = ledger.balance(source.account_id);
            if balance < amount {
                return Err(SlotViolation::InsufficientBalance { balance, amount });
            }
        }

        // 6. Ancillary fields
        let window_secs = TIMESTAMP_WINDOW_DAYS * 24 * 60 * 60;
        let transaction_date =
            self.settings.as_of - Duration::seconds(rng.range_inclusive(0, window_secs));
        let device_id = *rng
            .pick(&self.active_devices)
            .ok_or_else(|| SlotViolation::Internal("active device pool is empty".into()))?;
        let is_suspicious = rng.chance(policy.suspicious_probability(category, amount));
        let security_level = self.settings.tier_policy.tier_for(amount);

        let transaction_id = ids.next_id(SequenceKind::Transaction).map_err(|e| {
            log::warn!("transaction id unavailable, consuming a retry: {e}");
            SlotViolation::Internal(e.to_string())
        })?;

        // 7. Commit
        if status == TransactionStatus::Completed {
            ledger.apply_completed_transfer(source.account_id, destination, amount);
        }

        let (to_account_internal_id, to_account_external_id) = match destination {
            Destination::Internal(id) => (Some(id), None),
            Destination::External(id) => (None, Some(id)),
            Destination::None => (None, None),
        };

        Ok(PaymentTransaction {
            transaction_id,
            from_account_id: source.account_id,
            to_account_internal_id,
            to_account_external_id,
            customer_id: source.customer_id,
            transaction_type: category,
            amount,
            security_level,
            description: format!(
                "{} on {}",
                category.as_str(),
                transaction_date.format("%Y-%m-%d %H:%M:%S")
            ),
            transaction_date,
            status,
            device_id,
            is_suspicious,
        })
    }

    fn resolve_destination(
        &self,
        category: TransactionType,
        source: SourceAccount,
        rng: &mut StreamRng,
    ) -> Result<Destination, SlotViolation> {
        match category {
            TransactionType::TransferSameBankSameOwner => {
                let siblings: Vec<AccountId> = self
                    .accounts_by_customer
                    .get(&source.customer_id)
                    .map(|ids| {
                        ids.iter()
                            .copied()
                            .filter(|id| *id != source.account_id)
                            .collect()
                    })
                    .unwrap_or_default();
                rng.pick(&siblings)
                    .map(|id| Destination::Internal(*id))
                    .ok_or(SlotViolation::NoSiblingAccount {
                        customer_id: source.customer_id,
                    })
            }
            TransactionType::TransferSameBankDiffOwner => {
                let others: Vec<AccountId> = self
                    .active_accounts
                    .iter()
                    .filter(|a| a.customer_id != source.customer_id)
                    .map(|a| a.account_id)
                    .collect();
                rng.pick(&others)
                    .map(|id| Destination::Internal(*id))
                    .ok_or(SlotViolation::NoOtherOwnerAccount)
            }
            c if c.targets_external() => rng
                .pick(&self.external_accounts)
                .map(|id| Destination::External(*id))
                .ok_or(SlotViolation::NoExternalAccounts),
            // goods/services payments, e-wallet top-ups and withdrawals leave
            // the closed ledger; inquiries move nothing
            _ => Ok(Destination::None),
        }
    }
}
