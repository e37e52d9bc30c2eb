//! Authentication attempts per security tier.
//!
//! Tiers A and B always get one attempt. Tiers C and D may get two, and a
//! second tier D attempt uses a second-factor method. Organizations never
//! authenticate with biometrics below tier C.

mod common;

use chrono::NaiveDate;
use common::customer;
use ledger_synth_core::{
    auth_catalog::{AuthMethodCatalog, BIOMETRIC, TIER_D_METHODS, TIER_D_SECONDARY},
    auth_log_generator::{eligible_methods, secondary_methods, AuthLogGenerator},
    config::GeneratorConfig,
    engine::LedgerEngine,
    model::{
        AuthResult, CustomerType, EntitySnapshot, PaymentTransaction, SecurityTier,
        TransactionStatus, TransactionType,
    },
    policy::SecurityTierPolicy,
    rng::{RngBank, StreamSlot},
    sequence::SequenceBook,
};
use rust_decimal::Decimal;

fn snapshot() -> EntitySnapshot {
    EntitySnapshot {
        customers: vec![
            customer(1, CustomerType::Individual),
            customer(2, CustomerType::Organization),
        ],
        ..EntitySnapshot::default()
    }
}

fn txn(transaction_id: i64, customer_id: i64, tier: SecurityTier) -> PaymentTransaction {
    let transaction_date = NaiveDate::from_ymd_opt(2025, 1, 10)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .expect("valid date");
    PaymentTransaction {
        transaction_id,
        from_account_id: 1,
        to_account_internal_id: None,
        to_account_external_id: None,
        customer_id,
        transaction_type: TransactionType::PaymentGoodsServices,
        amount: Decimal::new(150_000_00, 2),
        security_level: tier,
        description: "payment_goods_services on 2025-01-10 09:30:00".into(),
        transaction_date,
        status: TransactionStatus::Completed,
        device_id: 1,
        is_suspicious: false,
    }
}

fn generator() -> AuthLogGenerator {
    AuthLogGenerator::new(&snapshot(), &AuthMethodCatalog::standard()).expect("complete catalog")
}

#[test]
fn weak_tiers_get_exactly_one_attempt() {
    let gen = generator();
    let mut rng = RngBank::new(1).for_stream(StreamSlot::Authentication);
    let mut ids = SequenceBook::default();
    for i in 0..400 {
        for tier in [SecurityTier::A, SecurityTier::B] {
            let attempts = gen
                .attempts_for(&txn(i, 1 + i % 2, tier), &mut rng, &mut ids)
                .expect("attempts");
            assert_eq!(attempts.len(), 1, "tier {tier} produced {} attempts", attempts.len());
        }
    }
}

#[test]
fn strong_tiers_sometimes_get_two_attempts() {
    let gen = generator();
    let mut rng = RngBank::new(2).for_stream(StreamSlot::Authentication);
    let mut ids = SequenceBook::default();
    for tier in [SecurityTier::C, SecurityTier::D] {
        let counts: Vec<usize> = (0..400)
            .map(|i| {
                gen.attempts_for(&txn(i, 1, tier), &mut rng, &mut ids)
                    .expect("attempts")
                    .len()
            })
            .collect();
        assert!(counts.iter().all(|n| *n == 1 || *n == 2));
        assert!(counts.contains(&1) && counts.contains(&2), "tier {tier} never varied");
    }
}

#[test]
fn tier_d_second_attempt_uses_a_second_factor() {
    let gen = generator();
    let mut rng = RngBank::new(3).for_stream(StreamSlot::Authentication);
    let mut ids = SequenceBook::default();
    let mut seen = 0;
    for i in 0..400 {
        let customer_id = 1 + i % 2;
        let attempts = gen
            .attempts_for(&txn(i, customer_id, SecurityTier::D), &mut rng, &mut ids)
            .expect("attempts");
        assert!(TIER_D_METHODS.contains(&attempts[0].auth_method_id));
        if let Some(second) = attempts.get(1) {
            seen += 1;
            assert!(
                TIER_D_SECONDARY.contains(&second.auth_method_id),
                "second factor {} outside the secondary set",
                second.auth_method_id
            );
        }
    }
    assert!(seen > 0);
}

#[test]
fn organizations_never_use_biometrics_below_tier_c() {
    let gen = generator();
    let mut rng = RngBank::new(4).for_stream(StreamSlot::Authentication);
    let mut ids = SequenceBook::default();
    for i in 0..600 {
        for tier in [SecurityTier::A, SecurityTier::B] {
            for attempt in gen
                .attempts_for(&txn(i, 2, tier), &mut rng, &mut ids)
                .expect("attempts")
            {
                assert_ne!(attempt.auth_method_id, BIOMETRIC, "organization used biometric at tier {tier}");
            }
        }
    }
    assert!(!eligible_methods(SecurityTier::B, CustomerType::Organization).contains(&BIOMETRIC));
    assert!(eligible_methods(SecurityTier::B, CustomerType::Individual).contains(&BIOMETRIC));
    assert!(eligible_methods(SecurityTier::D, CustomerType::Organization).contains(&BIOMETRIC));
    assert_eq!(secondary_methods(SecurityTier::D, CustomerType::Organization), TIER_D_SECONDARY);
}

#[test]
fn failure_reason_present_only_on_failure() {
    let gen = generator();
    let mut rng = RngBank::new(5).for_stream(StreamSlot::Authentication);
    let mut ids = SequenceBook::default();
    let mut non_success = 0;
    for i in 0..1000 {
        for attempt in gen
            .attempts_for(&txn(i, 1, SecurityTier::C), &mut rng, &mut ids)
            .expect("attempts")
        {
            if attempt.auth_result == AuthResult::Success {
                assert!(attempt.failure_reason.is_empty());
            } else {
                non_success += 1;
                assert!(!attempt.failure_reason.is_empty(), "{:?} without a reason", attempt.auth_result);
            }
        }
    }
    assert!(non_success > 0);
}

#[test]
fn attempts_follow_their_transaction_in_time() {
    let gen = generator();
    let mut rng = RngBank::new(6).for_stream(StreamSlot::Authentication);
    let mut ids = SequenceBook::default();
    for i in 0..300 {
        let t = txn(i, 1, SecurityTier::C);
        let attempts = gen.attempts_for(&t, &mut rng, &mut ids).expect("attempts");
        let first = attempts[0].auth_timestamp;
        assert!(first >= t.transaction_date);
        assert!((first - t.transaction_date).num_seconds() <= 60);
        if let Some(second) = attempts.get(1) {
            let gap = (second.auth_timestamp - first).num_seconds();
            assert!((5..=120).contains(&gap), "second attempt {gap}s after the first");
        }
        assert!(attempts.iter().all(|a| a.transaction_id == t.transaction_id));
    }
}

#[test]
fn engine_logs_follow_the_transaction_tier() {
    let config = GeneratorConfig {
        security_tier: SecurityTierPolicy::AmountBanded,
        ..GeneratorConfig::default_test()
    };
    let g = LedgerEngine::new("auth-banded".into(), 9, config)
        .generate(&AuthMethodCatalog::standard(), &mut SequenceBook::default())
        .expect("generate");

    assert!(g.auth_logs.len() >= g.report.produced());
    for t in &g.report.transactions {
        assert_eq!(t.security_level, SecurityTierPolicy::AmountBanded.tier_for(t.amount));
        let n = g.auth_logs.iter().filter(|a| a.transaction_id == t.transaction_id).count();
        if t.security_level.is_strong() {
            assert!(n == 1 || n == 2);
        } else {
            assert_eq!(n, 1, "tier {} transaction {} has {n} attempts", t.security_level, t.transaction_id);
        }
    }
}
