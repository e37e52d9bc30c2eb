//! Ledger State: the authoritative in-memory balance map for one run.
//!
//! RULE: every balance check during generation reads from here, never
//! from a copy captured before the loop. Internal and external balances
//! live in separate maps so an external top-up can never touch an
//! internal account that happens to share a numeric id.

use crate::{
    model::{Destination, EntitySnapshot},
    types::{AccountId, ExternalAccountId},
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerState {
    internal: BTreeMap<AccountId, Decimal>,
    external: BTreeMap<ExternalAccountId, Decimal>,
}

impl LedgerState {
    /// Seed from active internal accounts and every external account.
    pub fn from_snapshot(snapshot: &EntitySnapshot) -> Self {
        let internal = snapshot
            .active_accounts()
            .map(|a| (a.account_id, a.balance))
            .collect();
        let external = snapshot
            .external_accounts
            .iter()
            .map(|a| (a.account_id, a.balance))
            .collect();
        Self { internal, external }
    }

    pub fn set_balance(&mut self, account_id: AccountId, balance: Decimal) {
        self.internal.insert(account_id, balance);
    }

    pub fn set_external_balance(&mut self, account_id: ExternalAccountId, balance: Decimal) {
        self.external.insert(account_id, balance);
    }

    /// Current internal balance. Unknown ids read as zero.
    pub fn balance(&self, account_id: AccountId) -> Decimal {
        self.internal.get(&account_id).copied().unwrap_or(Decimal::ZERO)
    }

    /// Current external balance. Unknown ids read as zero.
    pub fn external_balance(&self, account_id: ExternalAccountId) -> Decimal {
        self.external.get(&account_id).copied().unwrap_or(Decimal::ZERO)
    }

    /// Move `amount` out of `from` and into the destination, if any.
    /// Called only once a transaction has been decided as completed.
    pub fn apply_completed_transfer(
        &mut self,
        from: AccountId,
        destination: Destination,
        amount: Decimal,
    ) {
        *self.internal.entry(from).or_insert(Decimal::ZERO) -= amount;
        match destination {
            Destination::Internal(to) => {
                *self.internal.entry(to).or_insert(Decimal::ZERO) += amount;
            }
            Destination::External(to) => {
                *self.external.entry(to).or_insert(Decimal::ZERO) += amount;
            }
            Destination::None => {}
        }
    }

    /// Sum across both pools; constant under transfers between tracked accounts.
    pub fn total(&self) -> Decimal {
        self.internal.values().copied().sum::<Decimal>()
            + self.external.values().copied().sum::<Decimal>()
    }

    pub fn internal_balances(&self) -> impl Iterator<Item = (AccountId, Decimal)> + '_ {
        self.internal.iter().map(|(id, b)| (*id, *b))
    }

    pub fn external_balances(&self) -> impl Iterator<Item = (ExternalAccountId, Decimal)> + '_ {
        self.external.iter().map(|(id, b)| (*id, *b))
    }

    pub fn has_negative_internal(&self) -> bool {
        self.internal.values().any(|b| b.is_sign_negative() && !b.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn missing_account_reads_zero() {
        let ledger = LedgerState::default();
        assert_eq!(ledger.balance(42), Decimal::ZERO);
        assert_eq!(ledger.external_balance(42), Decimal::ZERO);
    }

    #[test]
    fn internal_transfer_conserves_total() {
        let mut ledger = LedgerState::default();
        ledger.set_balance(1, dec("100.00"));
        ledger.set_balance(2, dec("5.00"));
        let before = ledger.total();

        ledger.apply_completed_transfer(1, Destination::Internal(2), dec("40.25"));

        assert_eq!(ledger.balance(1), dec("59.75"));
        assert_eq!(ledger.balance(2), dec("45.25"));
        assert_eq!(ledger.total(), before);
    }

    #[test]
    fn external_destination_does_not_touch_colliding_internal_id() {
        let mut ledger = LedgerState::default();
        ledger.set_balance(1, dec("100.00"));
        ledger.set_balance(7, dec("10.00"));
        ledger.set_external_balance(7, dec("0.00"));

        ledger.apply_completed_transfer(1, Destination::External(7), dec("30.00"));

        assert_eq!(ledger.balance(7), dec("10.00"));
        assert_eq!(ledger.external_balance(7), dec("30.00"));
        assert_eq!(ledger.balance(1), dec("70.00"));
    }

    #[test]
    fn outbound_payment_is_visible_to_the_next_read() {
        let mut ledger = LedgerState::default();
        ledger.set_balance(3, dec("12.00"));
        ledger.apply_completed_transfer(3, Destination::None, dec("2.50"));
        assert_eq!(ledger.balance(3), dec("9.50"));
        assert!(!ledger.has_negative_internal());
    }
}
