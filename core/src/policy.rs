//! Versioned generation policies.
//!
//! Two revisions of the generator shipped with different status and
//! suspicious-flag weights. Both are kept as named presets; a run picks
//! one and holds it fixed.

use crate::model::{SecurityTier, TransactionStatus, TransactionType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category weights in `TransactionType::ALL` order.
pub const CATEGORY_WEIGHTS: [f64; 9] = [0.20, 0.20, 0.15, 0.10, 0.15, 0.10, 0.05, 0.03, 0.07];

/// Amounts above this are "high value" for the suspicious-flag draw.
pub const HIGH_VALUE_THRESHOLD: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyPreset {
    /// completed 0.80, suspicious 0.2 above 1B else 0.1
    #[default]
    Current,
    /// completed 0.70, suspicious 0.3 above 1B else 0.05
    Legacy,
}

impl PolicyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Legacy => "legacy",
        }
    }
}

impl std::str::FromStr for PolicyPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(Self::Current),
            "legacy" => Ok(Self::Legacy),
            other => Err(format!("unknown policy preset '{other}'")),
        }
    }
}

/// The weights a transaction run draws from.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPolicy {
    pub preset: PolicyPreset,
    pub category_weights: [f64; 9],
    /// pending / completed / failed / cancelled
    pub status_weights: [f64; 4],
    pub suspicious_high_value: f64,
    pub suspicious_default: f64,
}

impl TransactionPolicy {
    pub fn preset(preset: PolicyPreset) -> Self {
        let (status_weights, suspicious_high_value, suspicious_default) = match preset {
            PolicyPreset::Current => ([0.10, 0.80, 0.05, 0.05], 0.2, 0.1),
            PolicyPreset::Legacy => ([0.20, 0.70, 0.05, 0.05], 0.3, 0.05),
        };
        Self {
            preset,
            category_weights: CATEGORY_WEIGHTS,
            status_weights,
            suspicious_high_value,
            suspicious_default,
        }
    }

    pub fn category_at(index: usize) -> TransactionType {
        TransactionType::ALL[index]
    }

    pub fn status_at(index: usize) -> TransactionStatus {
        [
            TransactionStatus::Pending,
            TransactionStatus::Completed,
            TransactionStatus::Failed,
            TransactionStatus::Cancelled,
        ][index]
    }

    /// Probability that a transaction is flagged suspicious. Inquiries never are.
    pub fn suspicious_probability(&self, category: TransactionType, amount: Decimal) -> f64 {
        if category == TransactionType::Inquiry {
            0.0
        } else if amount > HIGH_VALUE_THRESHOLD {
            self.suspicious_high_value
        } else {
            self.suspicious_default
        }
    }
}

/// How the security tier of a new transaction is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SecurityTierPolicy {
    /// Every transaction carries the same tier.
    Fixed { tier: SecurityTier },
    /// < 10M → A, < 100M → B, < 1B → C, otherwise D.
    AmountBanded,
}

impl Default for SecurityTierPolicy {
    fn default() -> Self {
        Self::Fixed {
            tier: SecurityTier::A,
        }
    }
}

impl SecurityTierPolicy {
    pub fn tier_for(&self, amount: Decimal) -> SecurityTier {
        match self {
            Self::Fixed { tier } => *tier,
            Self::AmountBanded => {
                if amount < Decimal::from(10_000_000) {
                    SecurityTier::A
                } else if amount < Decimal::from(100_000_000) {
                    SecurityTier::B
                } else if amount < Decimal::from(1_000_000_000) {
                    SecurityTier::C
                } else {
                    SecurityTier::D
                }
            }
        }
    }
}
