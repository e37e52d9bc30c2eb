//! Authentication method catalog and tier eligibility tables.
//!
//! The catalog rows live in the `authentication_method` table (seeded by
//! migrations/002_auth_methods.sql). The tier tables below reference them
//! by id; a run refuses to start when any referenced id is missing.

use crate::{
    error::{LedgerError, LedgerResult},
    model::{CustomerType, SecurityTier},
    types::AuthMethodId,
};
use serde::{Deserialize, Serialize};

pub const PIN_CODE: AuthMethodId = 13;
pub const BIOMETRIC: AuthMethodId = 8;

pub const TIER_A_METHODS: &[AuthMethodId] = &[PIN_CODE];
pub const TIER_B_METHODS: &[AuthMethodId] = &[1, 2, 3, 4, 6, 11, 12];
pub const TIER_C_METHODS: &[AuthMethodId] = &[5, 7, BIOMETRIC, 9, 10];
pub const TIER_D_METHODS: &[AuthMethodId] = &[BIOMETRIC, 10];
/// Second factor for two-step tier D authentication.
pub const TIER_D_SECONDARY: &[AuthMethodId] = &[5, 7, 9];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthMethod {
    pub auth_id: AuthMethodId,
    pub method_type: String,
    pub method_name: String,
    pub security_level: SecurityTier,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthMethodCatalog {
    methods: Vec<AuthMethod>,
}

impl AuthMethodCatalog {
    pub fn new(methods: Vec<AuthMethod>) -> Self {
        Self { methods }
    }

    /// The thirteen canonical methods, identical to the migration seed.
    pub fn standard() -> Self {
        use SecurityTier::*;
        let rows: [(AuthMethodId, &str, &str, SecurityTier, &str); 13] = [
            (1, "sms_otp", "SMS OTP", B, "One-time code delivered by SMS"),
            (2, "email_otp", "Email OTP", B, "One-time code delivered by email"),
            (3, "voice_otp", "Voice OTP", B, "One-time code read out by voice call"),
            (4, "soft_otp_basic", "Soft OTP Basic", B, "App-generated code without device binding"),
            (5, "soft_otp_advanced", "Soft OTP Advanced", C, "App-generated code bound to a registered device"),
            (6, "token_otp_basic", "Token OTP Basic", B, "Hardware token code"),
            (7, "token_otp_advanced", "Token OTP Advanced", C, "Hardware token with transaction signing"),
            (8, "biometric", "Biometric", D, "Face or fingerprint match against enrolled data"),
            (9, "fido", "FIDO", C, "FIDO2 security key or platform authenticator"),
            (10, "digital_signature", "Digital Signature", D, "PKI digital signature"),
            (11, "two_channel", "Two-Channel", B, "Confirmation on a second channel"),
            (12, "matrix_card", "Matrix Card", B, "Grid card challenge"),
            (13, "pin", "PIN Code", A, "Static PIN"),
        ];
        Self::new(
            rows.iter()
                .map(|(id, ty, name, level, desc)| AuthMethod {
                    auth_id: *id,
                    method_type: ty.to_string(),
                    method_name: name.to_string(),
                    security_level: *level,
                    description: desc.to_string(),
                })
                .collect(),
        )
    }

    pub fn methods(&self) -> &[AuthMethod] {
        &self.methods
    }

    pub fn contains(&self, id: AuthMethodId) -> bool {
        self.methods.iter().any(|m| m.auth_id == id)
    }

    /// Fails if any id referenced by the tier tables is absent.
    pub fn verify(&self) -> LedgerResult<()> {
        let mut missing: Vec<AuthMethodId> = referenced_ids()
            .into_iter()
            .filter(|id| !self.contains(*id))
            .collect();
        missing.sort_unstable();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::AuthCatalogIncomplete { missing })
        }
    }
}

fn referenced_ids() -> Vec<AuthMethodId> {
    let mut ids = union(&[
        TIER_A_METHODS,
        TIER_B_METHODS,
        TIER_C_METHODS,
        TIER_D_METHODS,
        TIER_D_SECONDARY,
    ]);
    ids.sort_unstable();
    ids
}

/// Order-preserving union without duplicates.
fn union(sets: &[&[AuthMethodId]]) -> Vec<AuthMethodId> {
    let mut out = Vec::new();
    for set in sets {
        for id in *set {
            if !out.contains(id) {
                out.push(*id);
            }
        }
    }
    out
}

/// Methods eligible for a transaction of `tier`, before customer filtering.
/// A weaker tier accepts every stronger method.
pub fn eligible_for_tier(tier: SecurityTier) -> Vec<AuthMethodId> {
    match tier {
        SecurityTier::A => union(&[
            TIER_A_METHODS,
            TIER_B_METHODS,
            TIER_C_METHODS,
            TIER_D_METHODS,
            TIER_D_SECONDARY,
        ]),
        SecurityTier::B => union(&[TIER_B_METHODS, TIER_C_METHODS, TIER_D_METHODS, TIER_D_SECONDARY]),
        SecurityTier::C => union(&[TIER_C_METHODS, TIER_D_METHODS, TIER_D_SECONDARY]),
        SecurityTier::D => TIER_D_METHODS.to_vec(),
    }
}

/// Organizations may not use biometrics below tier C.
pub fn permitted_for_customer(
    method: AuthMethodId,
    tier: SecurityTier,
    customer_type: CustomerType,
) -> bool {
    !(customer_type == CustomerType::Organization && method == BIOMETRIC && !tier.is_strong())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_is_complete() {
        assert!(AuthMethodCatalog::standard().verify().is_ok());
    }

    #[test]
    fn missing_method_is_reported() {
        let methods = AuthMethodCatalog::standard()
            .methods()
            .iter()
            .filter(|m| m.auth_id != 9)
            .cloned()
            .collect();
        let err = AuthMethodCatalog::new(methods).verify().unwrap_err();
        match err {
            LedgerError::AuthCatalogIncomplete { missing } => assert_eq!(missing, vec![9]),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn tier_a_accepts_every_method_once() {
        let a = eligible_for_tier(SecurityTier::A);
        assert_eq!(a.len(), 13);
        assert!(a.contains(&PIN_CODE));
        assert!(!eligible_for_tier(SecurityTier::B).contains(&PIN_CODE));
        assert_eq!(eligible_for_tier(SecurityTier::D), vec![BIOMETRIC, 10]);
    }

    #[test]
    fn organizations_lose_biometric_below_tier_c() {
        let org = CustomerType::Organization;
        assert!(!permitted_for_customer(BIOMETRIC, SecurityTier::A, org));
        assert!(!permitted_for_customer(BIOMETRIC, SecurityTier::B, org));
        assert!(permitted_for_customer(BIOMETRIC, SecurityTier::C, org));
        assert!(permitted_for_customer(BIOMETRIC, SecurityTier::D, org));
        assert!(permitted_for_customer(BIOMETRIC, SecurityTier::A, CustomerType::Individual));
    }
}
