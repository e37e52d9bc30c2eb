//! Hand-built entity fixtures shared by the integration tests.
#![allow(dead_code)]

use chrono::NaiveDate;
use ledger_synth_core::{
    config::GeneratorConfig,
    model::{
        AccountStatus, AccountType, BankAccount, Customer, CustomerStatus, CustomerType, Device,
        DeviceStatus, DeviceType, EntitySnapshot, ExternalAccount,
    },
    transaction_generator::TransactionSettings,
};
use rust_decimal::Decimal;

pub fn customer(customer_id: i64, customer_type: CustomerType) -> Customer {
    Customer {
        customer_id,
        customer_type,
        cccd_number: (customer_type == CustomerType::Individual)
            .then(|| format!("{:012}", customer_id)),
        tax_code: format!("{:010}", customer_id),
        full_name: format!("Customer {customer_id}"),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1),
        phone_number: format!("090{:07}", customer_id),
        email: None,
        address: "1 Test Street".into(),
        status: CustomerStatus::Active,
    }
}

pub fn account(account_id: i64, customer_id: i64, balance: Decimal) -> BankAccount {
    BankAccount {
        account_id,
        customer_id,
        account_number: format!("TIMO1{:015}", account_id),
        account_type: AccountType::Checking,
        balance,
        status: AccountStatus::Active,
    }
}

pub fn device(device_id: i64, customer_id: i64) -> Device {
    Device {
        device_id,
        customer_id,
        device_type: DeviceType::Mobile,
        device_identifier: format!("device-{device_id}"),
        os_info: "Android 12".into(),
        is_trusted: true,
        status: DeviceStatus::Active,
    }
}

pub fn external_account(account_id: i64, balance: Decimal) -> ExternalAccount {
    ExternalAccount {
        account_id,
        customer_id: 1,
        account_number: format!("VCB{:010}", account_id),
        balance,
    }
}

/// Whole-unit decimal with two fractional digits.
pub fn vnd(units: i64) -> Decimal {
    Decimal::new(units * 100, 2)
}

/// One customer holding two active accounts, one device, no other banks.
pub fn single_owner_two_accounts() -> EntitySnapshot {
    EntitySnapshot {
        customers: vec![customer(1, CustomerType::Individual)],
        accounts: vec![account(1, 1, vnd(500_000_000)), account(2, 1, vnd(300_000_000))],
        devices: vec![device(1, 1)],
        ..EntitySnapshot::default()
    }
}

pub fn settings() -> TransactionSettings {
    TransactionSettings::from_config(&GeneratorConfig::default_test())
}
