//! Entity Factory: customers, accounts, devices and other-bank reference data.
//!
//! Every identifier comes from the identity pool (formatted values) or the
//! sequence source (record ids). Each entity kind draws from its own stream
//! so widening one population never reshuffles another.

use crate::{
    amount::from_minor,
    config::GeneratorConfig,
    error::LedgerResult,
    identity_pool::IdentityPool,
    model::{
        AccountStatus, AccountType, Bank, BankAccount, Customer, CustomerStatus, CustomerType,
        Device, DeviceStatus, DeviceType, EntitySnapshot, ExternalAccount, ExternalCustomer,
    },
    name_generator::NameGenerator,
    rng::{RngBank, StreamRng, StreamSlot},
    sequence::{IdSequence, SequenceKind},
};
use chrono::NaiveDate;

/// Upper bound of seeded balances: 1,000,000,000.00 in minor units.
pub const MAX_SEED_BALANCE_MINOR: i64 = 100_000_000_000;

const OS_INFO: [&str; 10] = [
    "Android 12", "iOS 16", "Windows 11", "macOS Ventura", "Windows 10",
    "iOS 15", "Android 11", "macOS Big Sur", "Windows 7", "Android 10",
];

pub struct EntityFactory<'a> {
    config: &'a GeneratorConfig,
    customer_rng: StreamRng,
    account_rng: StreamRng,
    device_rng: StreamRng,
    external_rng: StreamRng,
}

impl<'a> EntityFactory<'a> {
    pub fn new(config: &'a GeneratorConfig, rng_bank: &RngBank) -> Self {
        Self {
            config,
            customer_rng: rng_bank.for_stream(StreamSlot::Customer),
            account_rng: rng_bank.for_stream(StreamSlot::Account),
            device_rng: rng_bank.for_stream(StreamSlot::Device),
            external_rng: rng_bank.for_stream(StreamSlot::ExternalBank),
        }
    }

    /// Build the full entity population for one run.
    pub fn build(
        &mut self,
        pool: &mut IdentityPool,
        ids: &mut dyn IdSequence,
    ) -> LedgerResult<EntitySnapshot> {
        let customers = self.customers(pool, ids)?;
        let accounts = self.accounts(&customers, pool, ids)?;
        let devices = self.devices(&customers, pool, ids)?;
        let banks = self.banks(ids)?;
        let external_customers = self.external_customers(&banks, pool, ids)?;
        let external_accounts = self.external_accounts(&banks, &external_customers, pool, ids)?;

        log::info!(
            "entities: {} customers, {} accounts, {} devices, {} banks, {} external accounts",
            customers.len(),
            accounts.len(),
            devices.len(),
            banks.len(),
            external_accounts.len()
        );

        Ok(EntitySnapshot {
            customers,
            accounts,
            devices,
            banks,
            external_customers,
            external_accounts,
        })
    }

    pub fn customers(
        &mut self,
        pool: &mut IdentityPool,
        ids: &mut dyn IdSequence,
    ) -> LedgerResult<Vec<Customer>> {
        let rng = &mut self.customer_rng;
        let mut customers = Vec::with_capacity(self.config.customers);

        for _ in 0..self.config.customers {
            let customer_type = if rng.pick_weighted(&[90.0, 10.0]) == 0 {
                CustomerType::Individual
            } else {
                CustomerType::Organization
            };
            let is_individual = customer_type == CustomerType::Individual;

            let cccd_number = if is_individual {
                Some(pool.national_id()?)
            } else {
                None
            };
            let tax_code = pool.tax_code()?;
            let full_name = if is_individual {
                NameGenerator::generate_full_name(rng)
            } else {
                NameGenerator::generate_company_name(rng)
            };
            let date_of_birth = if is_individual {
                random_date(rng, (1980, 1, 1), (2005, 1, 1))
            } else {
                None
            };
            let phone_number = pool.phone_number()?;
            let email = if rng.chance(0.5) {
                Some(NameGenerator::generate_email(rng, &full_name))
            } else {
                None
            };
            let address = NameGenerator::generate_address(rng);
            let status = match rng.pick_weighted(&[95.0, 3.0, 2.0]) {
                0 => CustomerStatus::Active,
                1 => CustomerStatus::Inactive,
                _ => CustomerStatus::Suspended,
            };

            customers.push(Customer {
                customer_id: ids.next_id(SequenceKind::Customer)?,
                customer_type,
                cccd_number,
                tax_code,
                full_name,
                date_of_birth,
                phone_number,
                email,
                address,
                status,
            });
        }
        Ok(customers)
    }

    pub fn accounts(
        &mut self,
        customers: &[Customer],
        pool: &mut IdentityPool,
        ids: &mut dyn IdSequence,
    ) -> LedgerResult<Vec<BankAccount>> {
        let rng = &mut self.account_rng;
        let mut accounts = Vec::new();

        for customer in customers {
            let count = rng.range_inclusive(1, self.config.max_accounts_per_customer as i64);
            for _ in 0..count {
                let account_type = match rng.pick_weighted(&[40.0, 30.0, 30.0]) {
                    0 => AccountType::Savings,
                    1 => AccountType::Checking,
                    _ => AccountType::Ewallet,
                };
                let balance = from_minor(rng.range_inclusive(0, MAX_SEED_BALANCE_MINOR));
                let status = match rng.pick_weighted(&[95.0, 3.0, 2.0]) {
                    0 => AccountStatus::Active,
                    1 => AccountStatus::Inactive,
                    _ => AccountStatus::Frozen,
                };
                accounts.push(BankAccount {
                    account_id: ids.next_id(SequenceKind::BankAccount)?,
                    customer_id: customer.customer_id,
                    account_number: pool.account_number()?,
                    account_type,
                    balance,
                    status,
                });
            }
        }
        Ok(accounts)
    }

    pub fn devices(
        &mut self,
        customers: &[Customer],
        pool: &mut IdentityPool,
        ids: &mut dyn IdSequence,
    ) -> LedgerResult<Vec<Device>> {
        let rng = &mut self.device_rng;
        let mut devices = Vec::new();

        for customer in customers {
            let count = rng.range_inclusive(1, self.config.max_devices_per_customer as i64);
            for _ in 0..count {
                let device_type = rng
                    .pick(DeviceType::ALL)
                    .copied()
                    .unwrap_or(DeviceType::Mobile);
                let os_info = rng.pick(&OS_INFO).copied().unwrap_or("Android 12");
                let is_trusted = rng.pick_weighted(&[95.0, 5.0]) == 0;
                let status = match rng.pick_weighted(&[95.0, 3.0, 2.0]) {
                    0 => DeviceStatus::Active,
                    1 => DeviceStatus::Blocked,
                    _ => DeviceStatus::Suspicious,
                };
                devices.push(Device {
                    device_id: ids.next_id(SequenceKind::Device)?,
                    customer_id: customer.customer_id,
                    device_type,
                    device_identifier: pool.device_identifier()?,
                    os_info: os_info.to_string(),
                    is_trusted,
                    status,
                });
            }
        }
        Ok(devices)
    }

    pub fn banks(&mut self, ids: &mut dyn IdSequence) -> LedgerResult<Vec<Bank>> {
        self.config
            .banks
            .iter()
            .map(|b| {
                Ok(Bank {
                    bank_id: ids.next_id(SequenceKind::Bank)?,
                    bank_code: b.bank_code.clone(),
                    bank_name: b.bank_name.clone(),
                    is_domestic: b.is_domestic,
                })
            })
            .collect()
    }

    /// Domestic banks get more customers than international ones.
    pub fn external_customers(
        &mut self,
        banks: &[Bank],
        pool: &mut IdentityPool,
        ids: &mut dyn IdSequence,
    ) -> LedgerResult<Vec<ExternalCustomer>> {
        let rng = &mut self.external_rng;
        let mut customers = Vec::new();

        for bank in banks {
            let count = if bank.is_domestic {
                self.config.external_customers_per_domestic_bank
            } else {
                self.config.external_customers_per_international_bank
            };
            for _ in 0..count {
                customers.push(ExternalCustomer {
                    customer_id: ids.next_id(SequenceKind::ExternalCustomer)?,
                    bank_id: bank.bank_id,
                    cccd_number: pool.national_id()?,
                    full_name: NameGenerator::generate_full_name(rng),
                    phone_number: pool.phone_number()?,
                });
            }
        }
        Ok(customers)
    }

    pub fn external_accounts(
        &mut self,
        banks: &[Bank],
        customers: &[ExternalCustomer],
        pool: &mut IdentityPool,
        ids: &mut dyn IdSequence,
    ) -> LedgerResult<Vec<ExternalAccount>> {
        let rng = &mut self.external_rng;
        let mut accounts = Vec::new();

        for customer in customers {
            let Some(bank) = banks.iter().find(|b| b.bank_id == customer.bank_id) else {
                continue;
            };
            let count =
                rng.range_inclusive(1, self.config.max_external_accounts_per_customer as i64);
            for _ in 0..count {
                accounts.push(ExternalAccount {
                    account_id: ids.next_id(SequenceKind::ExternalAccount)?,
                    customer_id: customer.customer_id,
                    account_number: pool.external_account_number(&bank.bank_code)?,
                    balance: from_minor(rng.range_inclusive(0, MAX_SEED_BALANCE_MINOR)),
                });
            }
        }
        Ok(accounts)
    }
}

/// Uniform calendar day in [start, end]. None only for invalid bounds.
fn random_date(
    rng: &mut StreamRng,
    start: (i32, u32, u32),
    end: (i32, u32, u32),
) -> Option<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(start.0, start.1, start.2)?;
    let end = NaiveDate::from_ymd_opt(end.0, end.1, end.2)?;
    let span = (end - start).num_days();
    if span < 0 {
        return None;
    }
    start.checked_add_signed(chrono::Duration::days(rng.range_inclusive(0, span)))
}
