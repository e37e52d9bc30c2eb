use crate::{
    error::{LedgerError, LedgerResult},
    policy::{PolicyPreset, SecurityTierPolicy, TransactionPolicy},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Reference time used when `as_of` is unset, as `%Y-%m-%d %H:%M:%S`.
pub const DEFAULT_AS_OF: &str = "2025-01-01 00:00:00";

/// One other bank to populate with external customers and accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankConfig {
    pub bank_code: String,
    pub bank_name: String,
    pub is_domestic: bool,
}

impl BankConfig {
    fn new(code: &str, name: &str, is_domestic: bool) -> Self {
        Self {
            bank_code: code.into(),
            bank_name: name.into(),
            is_domestic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    // ── Transaction stream ─────────────────────────────
    pub transaction_count: usize,
    pub max_retries: u32,
    pub policy: PolicyPreset,
    pub security_tier: SecurityTierPolicy,
    pub edge_case_weight: f64,
    /// Reference "now" for timestamp jitter. None falls back to
    /// `DEFAULT_AS_OF`; the wall clock is only used when a caller sets it here.
    pub as_of: Option<NaiveDateTime>,

    // ── Entity factory ─────────────────────────────────
    pub customers: usize,
    pub max_accounts_per_customer: u32,
    pub max_devices_per_customer: u32,
    pub banks: Vec<BankConfig>,
    pub external_customers_per_domestic_bank: usize,
    pub external_customers_per_international_bank: usize,
    pub max_external_accounts_per_customer: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            transaction_count: 150,
            max_retries: 3,
            policy: PolicyPreset::Current,
            security_tier: SecurityTierPolicy::default(),
            edge_case_weight: 0.05,
            as_of: None,
            customers: 50,
            max_accounts_per_customer: 2,
            max_devices_per_customer: 2,
            banks: vec![
                BankConfig::new("VCB", "Vietcombank", true),
                BankConfig::new("TCB", "Techcombank", true),
                BankConfig::new("BIDV", "BIDV", true),
                BankConfig::new("ACB", "Asia Commercial Bank", true),
                BankConfig::new("MBB", "Military Bank", true),
                BankConfig::new("HSBC", "HSBC", false),
                BankConfig::new("CITI", "Citibank", false),
            ],
            external_customers_per_domestic_bank: 60,
            external_customers_per_international_bank: 30,
            max_external_accounts_per_customer: 2,
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    /// In tests, use GeneratorConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: GeneratorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Small population with a pinned reference time.
    pub fn default_test() -> Self {
        Self {
            transaction_count: 200,
            customers: 30,
            banks: vec![
                BankConfig::new("VCB", "Vietcombank", true),
                BankConfig::new("HSBC", "HSBC", false),
            ],
            external_customers_per_domestic_bank: 6,
            external_customers_per_international_bank: 3,
            as_of: chrono::NaiveDate::from_ymd_opt(2025, 1, 15)
                .and_then(|d| d.and_hms_opt(12, 0, 0)),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.max_retries == 0 {
            return Err(LedgerError::InvalidConfig(
                "max_retries must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.edge_case_weight) {
            return Err(LedgerError::InvalidConfig(format!(
                "edge_case_weight {} outside [0, 1]",
                self.edge_case_weight
            )));
        }
        if self.max_accounts_per_customer == 0
            || self.max_devices_per_customer == 0
            || self.max_external_accounts_per_customer == 0
        {
            return Err(LedgerError::InvalidConfig(
                "per-customer maxima must be at least 1".into(),
            ));
        }
        for bank in &self.banks {
            if bank.bank_code.is_empty() || !bank.bank_code.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(LedgerError::InvalidConfig(format!(
                    "bank code '{}' must be non-empty ASCII alphanumeric",
                    bank.bank_code
                )));
            }
        }
        Ok(())
    }

    pub fn transaction_policy(&self) -> TransactionPolicy {
        TransactionPolicy::preset(self.policy)
    }

    /// The pinned reference time, or `DEFAULT_AS_OF` when unset. Never
    /// reads the clock, so a seed alone fixes every timestamp.
    pub fn reference_time(&self) -> NaiveDateTime {
        self.as_of.unwrap_or_else(|| {
            NaiveDateTime::parse_from_str(DEFAULT_AS_OF, "%Y-%m-%d %H:%M:%S").unwrap_or_default()
        })
    }
}
