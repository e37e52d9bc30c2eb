//! Ledger data model: entities, transactions and authentication attempts.
//!
//! Enum string forms are the persisted column values and must match the
//! CHECK constraints in migrations/001_ledger.sql.

use crate::types::{
    AccountId, AuthLogId, AuthMethodId, BankId, CustomerId, DeviceId, ExternalAccountId,
    ExternalCustomerId, TransactionId,
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generates `as_str`, `Display`, `FromStr` and `ALL` for a string-backed enum.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($name), other)),
                }
            }
        }
    };
}

// ── Customers ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    Individual,
    Organization,
}

string_enum!(CustomerType {
    Individual => "individual",
    Organization => "organization",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    Active,
    Inactive,
    Suspended,
}

string_enum!(CustomerStatus {
    Active => "active",
    Inactive => "inactive",
    Suspended => "suspended",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub customer_type: CustomerType,
    pub cccd_number: Option<String>,
    pub tax_code: String,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: String,
    pub email: Option<String>,
    pub address: String,
    pub status: CustomerStatus,
}

// ── Bank accounts ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Savings,
    Checking,
    Ewallet,
}

string_enum!(AccountType {
    Savings => "savings",
    Checking => "checking",
    Ewallet => "ewallet",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Inactive,
    Frozen,
}

string_enum!(AccountStatus {
    Active => "active",
    Inactive => "inactive",
    Frozen => "frozen",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    pub account_id: AccountId,
    pub customer_id: CustomerId,
    pub account_number: String,
    pub account_type: AccountType,
    pub balance: Decimal,
    pub status: AccountStatus,
}

impl BankAccount {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

// ── Devices ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Mobile,
    Computer,
    Tablet,
}

string_enum!(DeviceType {
    Mobile => "mobile",
    Computer => "computer",
    Tablet => "tablet",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Active,
    Blocked,
    Suspicious,
}

string_enum!(DeviceStatus {
    Active => "active",
    Blocked => "blocked",
    Suspicious => "suspicious",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub device_id: DeviceId,
    pub customer_id: CustomerId,
    pub device_type: DeviceType,
    pub device_identifier: String,
    pub os_info: String,
    /// Consumed by downstream risk rules only.
    pub is_trusted: bool,
    pub status: DeviceStatus,
}

impl Device {
    pub fn is_active(&self) -> bool {
        self.status == DeviceStatus::Active
    }
}

// ── Other banks ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub bank_id: BankId,
    pub bank_code: String,
    pub bank_name: String,
    pub is_domestic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalCustomer {
    pub customer_id: ExternalCustomerId,
    pub bank_id: BankId,
    pub cccd_number: String,
    pub full_name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalAccount {
    pub account_id: ExternalAccountId,
    pub customer_id: ExternalCustomerId,
    pub account_number: String,
    pub balance: Decimal,
}

// ── Payment transactions ──────────────────────────────────────────

/// The nine transaction categories, in weight-table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    TransferSameBankSameOwner,
    TransferSameBankDiffOwner,
    TransferInterbankDomestic,
    TransferInterbankInternational,
    PaymentGoodsServices,
    EwalletTopup,
    EwalletWithdrawal,
    Inquiry,
    EwalletTransfer,
}

string_enum!(TransactionType {
    TransferSameBankSameOwner => "transfer_same_bank_same_owner",
    TransferSameBankDiffOwner => "transfer_same_bank_diff_owner",
    TransferInterbankDomestic => "transfer_interbank_domestic",
    TransferInterbankInternational => "transfer_interbank_international",
    PaymentGoodsServices => "payment_goods_services",
    EwalletTopup => "ewallet_topup",
    EwalletWithdrawal => "ewallet_withdrawal",
    Inquiry => "inquiry",
    EwalletTransfer => "ewallet_transfer",
});

impl TransactionType {
    /// Categories whose counterparty is an other-bank account.
    pub fn targets_external(&self) -> bool {
        matches!(
            self,
            Self::TransferInterbankDomestic
                | Self::TransferInterbankInternational
                | Self::EwalletTransfer
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

string_enum!(TransactionStatus {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
    Cancelled => "cancelled",
});

/// Security tiers, weakest requirement (A) to strongest (D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SecurityTier {
    A,
    B,
    C,
    D,
}

string_enum!(SecurityTier {
    A => "A",
    B => "B",
    C => "C",
    D => "D",
});

impl SecurityTier {
    /// Tiers C and D count as strong authentication.
    pub fn is_strong(&self) -> bool {
        matches!(self, Self::C | Self::D)
    }
}

/// Where the money goes. Exactly one variant per transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "account_id", rename_all = "snake_case")]
pub enum Destination {
    Internal(AccountId),
    External(ExternalAccountId),
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub transaction_id: TransactionId,
    pub from_account_id: AccountId,
    pub to_account_internal_id: Option<AccountId>,
    pub to_account_external_id: Option<ExternalAccountId>,
    pub customer_id: CustomerId,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub security_level: SecurityTier,
    pub description: String,
    pub transaction_date: NaiveDateTime,
    pub status: TransactionStatus,
    pub device_id: DeviceId,
    pub is_suspicious: bool,
}

impl PaymentTransaction {
    pub fn destination(&self) -> Destination {
        match (self.to_account_internal_id, self.to_account_external_id) {
            (Some(id), _) => Destination::Internal(id),
            (None, Some(id)) => Destination::External(id),
            (None, None) => Destination::None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

// ── Authentication ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthResult {
    Success,
    Failed,
    Expired,
    Cancelled,
}

string_enum!(AuthResult {
    Success => "success",
    Failed => "failed",
    Expired => "expired",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticationAttempt {
    pub log_id: AuthLogId,
    pub transaction_id: TransactionId,
    pub auth_method_id: AuthMethodId,
    pub auth_result: AuthResult,
    /// Empty on success.
    pub failure_reason: String,
    pub auth_timestamp: NaiveDateTime,
}

// ── Snapshot handed to the generators ─────────────────────────────

/// Read-only entity lists supplied by the entity factory or the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub customers: Vec<Customer>,
    pub accounts: Vec<BankAccount>,
    pub devices: Vec<Device>,
    pub banks: Vec<Bank>,
    pub external_customers: Vec<ExternalCustomer>,
    pub external_accounts: Vec<ExternalAccount>,
}

impl EntitySnapshot {
    pub fn active_accounts(&self) -> impl Iterator<Item = &BankAccount> {
        self.accounts.iter().filter(|a| a.is_active())
    }

    pub fn active_devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(|d| d.is_active())
    }
}
