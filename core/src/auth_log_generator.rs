//! Authentication Log Generator: one or two attempts per transaction.
//!
//! The security tier is read from each transaction record as it is
//! processed; the transaction is authoritative for its own tier.

use crate::{
    auth_catalog::{self, AuthMethodCatalog, TIER_D_SECONDARY},
    error::{LedgerError, LedgerResult},
    model::{
        AuthResult, AuthenticationAttempt, CustomerType, EntitySnapshot, PaymentTransaction,
        SecurityTier,
    },
    name_generator::NameGenerator,
    rng::StreamRng,
    sequence::{IdSequence, SequenceKind},
    types::{AuthMethodId, CustomerId},
};
use chrono::Duration;
use std::collections::HashMap;

/// success / failed / expired / cancelled
pub const RESULT_WEIGHTS: [f64; 4] = [95.0, 3.0, 1.0, 1.0];

/// Probability of a second attempt for tier C and D transactions.
pub const SECOND_ATTEMPT_PROBABILITY: f64 = 0.5;

pub struct AuthLogGenerator {
    customer_types: HashMap<CustomerId, CustomerType>,
}

impl AuthLogGenerator {
    /// The catalog must be complete before any attempt is produced.
    pub fn new(snapshot: &EntitySnapshot, catalog: &AuthMethodCatalog) -> LedgerResult<Self> {
        catalog.verify()?;
        Ok(Self {
            customer_types: snapshot
                .customers
                .iter()
                .map(|c| (c.customer_id, c.customer_type))
                .collect(),
        })
    }

    pub fn generate(
        &self,
        transactions: &[PaymentTransaction],
        rng: &mut StreamRng,
        ids: &mut dyn IdSequence,
    ) -> LedgerResult<Vec<AuthenticationAttempt>> {
        let mut logs = Vec::with_capacity(transactions.len());
        for txn in transactions {
            logs.extend(self.attempts_for(txn, rng, ids)?);
        }
        log::info!(
            "authentication: {} attempts for {} transactions",
            logs.len(),
            transactions.len()
        );
        Ok(logs)
    }

    /// Attempts for a single transaction, in chronological order.
    pub fn attempts_for(
        &self,
        txn: &PaymentTransaction,
        rng: &mut StreamRng,
        ids: &mut dyn IdSequence,
    ) -> LedgerResult<Vec<AuthenticationAttempt>> {
        let tier = txn.security_level;
        let customer_type = self
            .customer_types
            .get(&txn.customer_id)
            .copied()
            .unwrap_or(CustomerType::Individual);

        let eligible = eligible_methods(tier, customer_type);
        let attempts = if tier.is_strong() && rng.chance(SECOND_ATTEMPT_PROBABILITY) {
            2
        } else {
            1
        };

        let mut out = Vec::with_capacity(attempts);
        let mut timestamp = txn.transaction_date + Duration::seconds(rng.range_inclusive(0, 60));
        for i in 0..attempts {
            let pool = if tier == SecurityTier::D && attempts > 1 && i > 0 {
                let secondary = secondary_methods(tier, customer_type);
                if secondary.is_empty() {
                    eligible.clone()
                } else {
                    secondary
                }
            } else {
                eligible.clone()
            };
            let auth_method_id = *rng.pick(&pool).ok_or_else(|| {
                LedgerError::Other(anyhow::anyhow!("no eligible authentication method for tier {tier}"))
            })?;

            let auth_result = match rng.pick_weighted(&RESULT_WEIGHTS) {
                0 => AuthResult::Success,
                1 => AuthResult::Failed,
                2 => AuthResult::Expired,
                _ => AuthResult::Cancelled,
            };
            let failure_reason = NameGenerator::generate_failure_reason(rng, auth_result);

            if i > 0 {
                timestamp += Duration::seconds(rng.range_inclusive(5, 120));
            }

            out.push(AuthenticationAttempt {
                log_id: ids.next_id(SequenceKind::AuthLog)?,
                transaction_id: txn.transaction_id,
                auth_method_id,
                auth_result,
                failure_reason,
                auth_timestamp: timestamp,
            });
        }
        Ok(out)
    }
}

/// Tier eligibility narrowed by customer type. Falls back to the base
/// tier's own methods if filtering empties the list.
pub fn eligible_methods(tier: SecurityTier, customer_type: CustomerType) -> Vec<AuthMethodId> {
    let filtered: Vec<AuthMethodId> = auth_catalog::eligible_for_tier(tier)
        .into_iter()
        .filter(|m| auth_catalog::permitted_for_customer(*m, tier, customer_type))
        .collect();
    if filtered.is_empty() {
        auth_catalog::TIER_A_METHODS.to_vec()
    } else {
        filtered
    }
}

/// Second-factor methods for two-step tier D, after customer filtering.
pub fn secondary_methods(tier: SecurityTier, customer_type: CustomerType) -> Vec<AuthMethodId> {
    TIER_D_SECONDARY
        .iter()
        .copied()
        .filter(|m| auth_catalog::permitted_for_customer(*m, tier, customer_type))
        .collect()
}
