//! Identifier sequence source.
//!
//! The generators never invent record ids. Every new row takes the next
//! value of its sequence, and sequences only move forward.

use crate::error::{LedgerError, LedgerResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SequenceKind {
    Bank,
    Customer,
    BankAccount,
    Device,
    ExternalCustomer,
    ExternalAccount,
    Transaction,
    AuthLog,
}

impl SequenceKind {
    pub const ALL: [SequenceKind; 8] = [
        Self::Bank,
        Self::Customer,
        Self::BankAccount,
        Self::Device,
        Self::ExternalCustomer,
        Self::ExternalAccount,
        Self::Transaction,
        Self::AuthLog,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::Customer => "customer",
            Self::BankAccount => "bank_account",
            Self::Device => "device",
            Self::ExternalCustomer => "external_customer",
            Self::ExternalAccount => "external_account",
            Self::Transaction => "transaction",
            Self::AuthLog => "auth_log",
        }
    }
}

/// Supplies the next unique id for a record kind.
pub trait IdSequence {
    fn next_id(&mut self, kind: SequenceKind) -> LedgerResult<i64>;
}

/// In-memory monotonic counters, one per kind.
#[derive(Debug, Clone)]
pub struct SequenceBook {
    next: BTreeMap<SequenceKind, i64>,
}

impl SequenceBook {
    /// Every sequence starts at `first`.
    pub fn starting_at(first: i64) -> Self {
        Self {
            next: SequenceKind::ALL.iter().map(|k| (*k, first)).collect(),
        }
    }

    /// Move `kind` so its next id is strictly greater than `last_used`.
    pub fn advance_past(&mut self, kind: SequenceKind, last_used: i64) {
        let slot = self.next.entry(kind).or_insert(1);
        if *slot <= last_used {
            *slot = last_used + 1;
        }
    }

    pub fn peek(&self, kind: SequenceKind) -> i64 {
        self.next.get(&kind).copied().unwrap_or(1)
    }
}

impl Default for SequenceBook {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdSequence for SequenceBook {
    fn next_id(&mut self, kind: SequenceKind) -> LedgerResult<i64> {
        let slot = self.next.entry(kind).or_insert(1);
        let id = *slot;
        *slot = id.checked_add(1).ok_or_else(|| {
            LedgerError::Other(anyhow::anyhow!("{} sequence overflowed", kind.name()))
        })?;
        Ok(id)
    }
}
