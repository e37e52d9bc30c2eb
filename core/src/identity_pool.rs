//! Identity Pool: format-valid identifiers, unique within one run.
//!
//! The pool owns its own random stream and its uniqueness sets. It is
//! created fresh for every run and dropped with it, so a repeated run
//! with the same seed never collides with identifiers it has not issued.

use crate::{
    error::{LedgerError, LedgerResult},
    rng::StreamRng,
};
use std::collections::HashSet;

pub const PHONE_PREFIXES: [&str; 7] = ["090", "091", "093", "094", "096", "097", "098"];
pub const INTERNAL_ACCOUNT_PREFIX: &str = "TIMO";

/// Collision retries before a draw is declared exhausted.
const MAX_DRAW_ATTEMPTS: u32 = 1_000;

pub struct IdentityPool {
    rng: StreamRng,
    national_ids: HashSet<String>,
    tax_codes: HashSet<String>,
    phone_numbers: HashSet<String>,
    account_numbers: HashSet<String>,
    device_identifiers: HashSet<String>,
}

impl IdentityPool {
    pub fn new(rng: StreamRng) -> Self {
        Self {
            rng,
            national_ids: HashSet::new(),
            tax_codes: HashSet::new(),
            phone_numbers: HashSet::new(),
            account_numbers: HashSet::new(),
            device_identifiers: HashSet::new(),
        }
    }

    /// 12-digit citizen id (CCCD).
    pub fn national_id(&mut self) -> LedgerResult<String> {
        let rng = &mut self.rng;
        draw_unique(&mut self.national_ids, "national id", || digits(rng, 12))
    }

    /// 10-digit tax code.
    pub fn tax_code(&mut self) -> LedgerResult<String> {
        let rng = &mut self.rng;
        draw_unique(&mut self.tax_codes, "tax code", || digits(rng, 10))
    }

    /// 10-digit mobile number on a known carrier prefix.
    pub fn phone_number(&mut self) -> LedgerResult<String> {
        let rng = &mut self.rng;
        draw_unique(&mut self.phone_numbers, "phone number", || {
            let prefix = rng.pick(&PHONE_PREFIXES).copied().unwrap_or("090");
            format!("{prefix}{}", digits(rng, 7))
        })
    }

    /// Internal account number: prefix plus 16 digits, no leading zero.
    pub fn account_number(&mut self) -> LedgerResult<String> {
        let rng = &mut self.rng;
        draw_unique(&mut self.account_numbers, "account number", || {
            let lead = rng.range_inclusive(1, 9);
            format!("{INTERNAL_ACCOUNT_PREFIX}{lead}{}", digits(rng, 15))
        })
    }

    /// Other-bank account number: bank code plus 10 digits.
    pub fn external_account_number(&mut self, bank_code: &str) -> LedgerResult<String> {
        let rng = &mut self.rng;
        draw_unique(&mut self.account_numbers, "external account number", || {
            format!("{bank_code}{}", digits(rng, 10))
        })
    }

    /// UUID v4 layout built from stream bytes, so it replays with the seed.
    pub fn device_identifier(&mut self) -> LedgerResult<String> {
        let rng = &mut self.rng;
        draw_unique(&mut self.device_identifiers, "device identifier", || {
            let mut bytes = [0u8; 16];
            rng.fill_bytes(&mut bytes);
            uuid::Builder::from_random_bytes(bytes)
                .into_uuid()
                .to_string()
        })
    }

    /// Total identifiers issued so far (test helper).
    pub fn issued(&self) -> usize {
        self.national_ids.len()
            + self.tax_codes.len()
            + self.phone_numbers.len()
            + self.account_numbers.len()
            + self.device_identifiers.len()
    }
}

fn digits(rng: &mut StreamRng, len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'0' + rng.next_u64_below(10) as u8))
        .collect()
}

fn draw_unique(
    seen: &mut HashSet<String>,
    kind: &'static str,
    mut draw: impl FnMut() -> String,
) -> LedgerResult<String> {
    for _ in 0..MAX_DRAW_ATTEMPTS {
        let candidate = draw();
        if seen.insert(candidate.clone()) {
            return Ok(candidate);
        }
    }
    Err(LedgerError::IdentifierSpaceExhausted {
        kind,
        attempts: MAX_DRAW_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, StreamSlot};

    fn pool(seed: u64) -> IdentityPool {
        IdentityPool::new(RngBank::new(seed).for_stream(StreamSlot::Identity))
    }

    #[test]
    fn formats_are_valid() {
        let mut p = pool(11);
        let cccd = p.national_id().unwrap();
        assert_eq!(cccd.len(), 12);
        assert!(cccd.chars().all(|c| c.is_ascii_digit()));

        let tax = p.tax_code().unwrap();
        assert_eq!(tax.len(), 10);
        assert!(tax.chars().all(|c| c.is_ascii_digit()));

        let phone = p.phone_number().unwrap();
        assert_eq!(phone.len(), 10);
        assert!(PHONE_PREFIXES.contains(&&phone[..3]));

        let acct = p.account_number().unwrap();
        assert!(acct.starts_with("TIMO"));
        assert_eq!(acct.len(), 20);
        assert_ne!(&acct[4..5], "0");

        let ext = p.external_account_number("VCB").unwrap();
        assert!(ext.starts_with("VCB"));
        assert_eq!(ext.len(), 13);

        let device = p.device_identifier().unwrap();
        let parsed = uuid::Uuid::parse_str(&device).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn draws_are_unique_within_a_run() {
        let mut p = pool(3);
        let mut seen = HashSet::new();
        for _ in 0..2_000 {
            assert!(seen.insert(p.phone_number().unwrap()));
        }
    }

    #[test]
    fn tiny_space_reports_exhaustion() {
        let mut p = pool(5);
        // A one-character code plus zero-width digit space cannot issue twice.
        let mut seen = HashSet::new();
        let first = draw_unique(&mut seen, "fixed", || "X".to_string()).unwrap();
        assert_eq!(first, "X");
        let err = draw_unique(&mut seen, "fixed", || "X".to_string()).unwrap_err();
        assert!(matches!(err, LedgerError::IdentifierSpaceExhausted { kind: "fixed", .. }));
        // The pool itself is untouched by the helper.
        assert_eq!(p.issued(), 0);
        p.tax_code().unwrap();
        assert_eq!(p.issued(), 1);
    }

    #[test]
    fn fresh_pools_with_same_seed_replay() {
        let mut a = pool(99);
        let mut b = pool(99);
        assert_eq!(a.national_id().unwrap(), b.national_id().unwrap());
        assert_eq!(a.device_identifier().unwrap(), b.device_identifier().unwrap());
    }
}
