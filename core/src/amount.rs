//! Tiered amount distribution keyed off the source account's current balance.
//!
//! Draws happen in integer minor units (hundredths) and are converted to
//! two-decimal amounts, so every produced value is representable in a
//! NUMERIC(15,2) column.

use crate::rng::StreamRng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Smallest representable positive amount, in minor units.
pub const MIN_MINOR: i64 = 1;

/// Ceiling of the last-resort draw: 1,000,000.00.
pub const LAST_RESORT_CEILING_MINOR: i64 = 100_000_000;

/// Boundary-hugging values injected to exercise downstream thresholds.
pub const EDGE_CASE_MINOR: [i64; 10] = [
    1,                     // 0.01
    999_999_999,           // 9,999,999.99
    1_000_000_000,         // 10,000,000.00
    1_000_000_001,         // 10,000,000.01
    9_999_999_999,         // 99,999,999.99
    10_000_000_000,        // 100,000,000.00
    99_999_999_999,        // 999,999,999.99
    100_000_000_000,       // 1,000,000,000.00
    100_000_000_001,       // 1,000,000,000.01
    999_999_999_999,       // 9,999,999,999.99
];

/// A balance-weighted tier: [lower, upper) in minor units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountTier {
    pub lower_minor: i64,
    pub upper_minor: i64,
    pub weight: f64,
}

pub const TIERS: [AmountTier; 4] = [
    AmountTier { lower_minor: 1_000_000, upper_minor: 1_000_000_000, weight: 0.30 },
    AmountTier { lower_minor: 1_000_000_000, upper_minor: 10_000_000_000, weight: 0.40 },
    AmountTier { lower_minor: 10_000_000_000, upper_minor: 50_000_000_000, weight: 0.20 },
    AmountTier { lower_minor: 50_000_000_000, upper_minor: 100_000_000_000, weight: 0.05 },
];

/// Which branch produced an amount. Useful for distribution tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountSource {
    EdgeCase,
    Tier(usize),
    LastResort,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountDraw {
    pub amount: Decimal,
    pub source: AmountSource,
}

pub struct AmountSampler {
    edge_case_weight: f64,
}

impl AmountSampler {
    pub fn new(edge_case_weight: f64) -> Self {
        Self { edge_case_weight }
    }

    /// Draw an amount no larger than `balance`.
    ///
    /// Returns a zero amount when the balance cannot cover even the
    /// smallest representable value; the caller treats that as a
    /// non-positive amount and retries the slot.
    pub fn draw(&self, balance: Decimal, rng: &mut StreamRng) -> AmountDraw {
        let balance_minor = to_minor_floor(balance);

        if rng.chance(self.edge_case_weight) {
            if let Some(&edge) = rng.pick(&EDGE_CASE_MINOR) {
                if edge <= balance_minor {
                    return AmountDraw {
                        amount: from_minor(edge),
                        source: AmountSource::EdgeCase,
                    };
                }
            }
        }

        self.draw_tiered(balance_minor, rng)
    }

    fn draw_tiered(&self, balance_minor: i64, rng: &mut StreamRng) -> AmountDraw {
        let weights: Vec<f64> = TIERS.iter().map(|t| t.weight).collect();
        let index = rng.pick_weighted(&weights);
        let tier = TIERS[index];
        let upper = (tier.upper_minor - 1).min(balance_minor);
        if upper >= tier.lower_minor {
            return AmountDraw {
                amount: from_minor(rng.range_inclusive(tier.lower_minor, upper)),
                source: AmountSource::Tier(index),
            };
        }
        self.draw_last_resort(balance_minor, rng)
    }

    fn draw_last_resort(&self, balance_minor: i64, rng: &mut StreamRng) -> AmountDraw {
        let ceiling = balance_minor.min(LAST_RESORT_CEILING_MINOR);
        let minor = if ceiling >= MIN_MINOR {
            rng.range_inclusive(MIN_MINOR, ceiling)
        } else {
            0
        };
        AmountDraw {
            amount: from_minor(minor),
            source: AmountSource::LastResort,
        }
    }
}

/// Whole hundredths in `value`, rounded toward zero. Negative balances map to
/// a negative count, which no draw can satisfy.
pub fn to_minor_floor(value: Decimal) -> i64 {
    let scaled = (value * Decimal::ONE_HUNDRED).trunc();
    scaled
        .to_i64()
        .unwrap_or(if value.is_sign_negative() { i64::MIN } else { i64::MAX })
}

pub fn from_minor(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, StreamSlot};

    fn rng(seed: u64) -> StreamRng {
        RngBank::new(seed).for_stream(StreamSlot::Transaction)
    }

    #[test]
    fn draws_never_exceed_balance() {
        let sampler = AmountSampler::new(0.5);
        let mut r = rng(1);
        for balance in ["0.50", "500.00", "12345.67", "250000000.00", "9000000000.00"] {
            let balance: Decimal = balance.parse().unwrap();
            for _ in 0..500 {
                let draw = sampler.draw(balance, &mut r);
                assert!(draw.amount <= balance, "{} > {balance}", draw.amount);
                assert!(draw.amount > Decimal::ZERO);
            }
        }
    }

    #[test]
    fn small_balance_falls_back_to_last_resort() {
        let sampler = AmountSampler::new(0.0);
        let mut r = rng(2);
        let balance: Decimal = "500.00".parse().unwrap();
        for _ in 0..200 {
            let draw = sampler.draw(balance, &mut r);
            assert_eq!(draw.source, AmountSource::LastResort);
            assert!(draw.amount <= balance);
        }
    }

    #[test]
    fn empty_balance_yields_zero() {
        let sampler = AmountSampler::new(0.05);
        let mut r = rng(3);
        let draw = sampler.draw(Decimal::ZERO, &mut r);
        assert_eq!(draw.amount, Decimal::ZERO);
    }

    #[test]
    fn edge_case_weight_one_hits_edges_when_affordable() {
        let sampler = AmountSampler::new(1.0);
        let mut r = rng(4);
        let huge: Decimal = "99999999999.99".parse().unwrap();
        for _ in 0..100 {
            let draw = sampler.draw(huge, &mut r);
            assert_eq!(draw.source, AmountSource::EdgeCase);
            assert!(EDGE_CASE_MINOR.contains(&to_minor_floor(draw.amount)));
        }
    }

    #[test]
    fn tier_upper_bound_is_clamped_to_balance() {
        let sampler = AmountSampler::new(0.0);
        let mut r = rng(5);
        // 20M: tier 0 fully drawable, tier 1 clamped, tiers 2 and 3 fall back.
        let balance: Decimal = "20000000.00".parse().unwrap();
        for _ in 0..500 {
            let draw = sampler.draw(balance, &mut r);
            match draw.source {
                AmountSource::Tier(i) => assert!(i <= 1),
                AmountSource::LastResort => {
                    assert!(draw.amount <= from_minor(LAST_RESORT_CEILING_MINOR))
                }
                AmountSource::EdgeCase => panic!("edge weight is zero"),
            }
            assert!(draw.amount <= balance);
        }
    }

    #[test]
    fn minor_unit_conversion_truncates() {
        assert_eq!(to_minor_floor("12.349".parse().unwrap()), 1234);
        assert_eq!(from_minor(1234).to_string(), "12.34");
    }
}
