//! Shared primitive types used across the entire generator.

/// Identifier of one generation run.
pub type RunId = String;

pub type CustomerId = i64;
pub type AccountId = i64;
pub type DeviceId = i64;
pub type BankId = i64;
pub type ExternalCustomerId = i64;
pub type ExternalAccountId = i64;
pub type TransactionId = i64;
pub type AuthLogId = i64;

/// Authentication method ids fit a SMALLINT column.
pub type AuthMethodId = i16;
