use super::{parse_column, parse_date, SimStore, DATE_FORMAT};
use crate::{
    error::LedgerResult,
    model::{Bank, BankAccount, Customer, Device, EntitySnapshot, ExternalAccount, ExternalCustomer},
};
use rusqlite::params;

impl SimStore {
    // ── Entities ──────────────────────────────────────────────────

    /// Insert every entity of a snapshot. Callers wanting atomicity wrap
    /// this in `persist_run`.
    pub fn insert_entities(&self, run_id: &str, snapshot: &EntitySnapshot) -> LedgerResult<()> {
        for b in &snapshot.banks {
            self.insert_bank(run_id, b)?;
        }
        for c in &snapshot.customers {
            self.insert_customer(run_id, c)?;
        }
        for a in &snapshot.accounts {
            self.insert_account(run_id, a)?;
        }
        for d in &snapshot.devices {
            self.insert_device(run_id, d)?;
        }
        for c in &snapshot.external_customers {
            self.insert_external_customer(run_id, c)?;
        }
        for a in &snapshot.external_accounts {
            self.insert_external_account(run_id, a)?;
        }
        Ok(())
    }

    pub fn insert_bank(&self, run_id: &str, b: &Bank) -> LedgerResult<()> {
        self.conn.execute(
            "INSERT INTO bank (bank_id, run_id, bank_code, bank_name, is_domestic)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![b.bank_id, run_id, b.bank_code, b.bank_name, b.is_domestic],
        )?;
        Ok(())
    }

    pub fn insert_customer(&self, run_id: &str, c: &Customer) -> LedgerResult<()> {
        self.conn.execute(
            "INSERT INTO customer (
                customer_id, run_id, customer_type, cccd_number, tax_code, full_name,
                date_of_birth, phone_number, email, address, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                c.customer_id,
                run_id,
                c.customer_type.as_str(),
                c.cccd_number,
                c.tax_code,
                c.full_name,
                c.date_of_birth.map(|d| d.format(DATE_FORMAT).to_string()),
                c.phone_number,
                c.email,
                c.address,
                c.status.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn insert_account(&self, run_id: &str, a: &BankAccount) -> LedgerResult<()> {
        self.conn.execute(
            "INSERT INTO bank_account (account_id, run_id, customer_id, account_number, account_type, balance, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                a.account_id,
                run_id,
                a.customer_id,
                a.account_number,
                a.account_type.as_str(),
                a.balance.to_string(),
                a.status.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn insert_device(&self, run_id: &str, d: &Device) -> LedgerResult<()> {
        self.conn.execute(
            "INSERT INTO device (device_id, run_id, customer_id, device_type, device_identifier, os_info, is_trusted, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                d.device_id,
                run_id,
                d.customer_id,
                d.device_type.as_str(),
                d.device_identifier,
                d.os_info,
                d.is_trusted,
                d.status.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn insert_external_customer(&self, run_id: &str, c: &ExternalCustomer) -> LedgerResult<()> {
        self.conn.execute(
            "INSERT INTO other_bank_customer (customer_id, run_id, bank_id, cccd_number, full_name, phone_number)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![c.customer_id, run_id, c.bank_id, c.cccd_number, c.full_name, c.phone_number],
        )?;
        Ok(())
    }

    pub fn insert_external_account(&self, run_id: &str, a: &ExternalAccount) -> LedgerResult<()> {
        self.conn.execute(
            "INSERT INTO other_bank_account (account_id, run_id, customer_id, account_number, balance)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![a.account_id, run_id, a.customer_id, a.account_number, a.balance.to_string()],
        )?;
        Ok(())
    }

    /// Read back the entity population written for `run_id`, ordered by id.
    pub fn load_entities(&self, run_id: &str) -> LedgerResult<EntitySnapshot> {
        Ok(EntitySnapshot {
            customers: self.customers(run_id)?,
            accounts: self.accounts(run_id)?,
            devices: self.devices(run_id)?,
            banks: self.banks(run_id)?,
            external_customers: self.external_customers(run_id)?,
            external_accounts: self.external_accounts(run_id)?,
        })
    }

    pub fn customers(&self, run_id: &str) -> LedgerResult<Vec<Customer>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, customer_type, cccd_number, tax_code, full_name,
                    date_of_birth, phone_number, email, address, status
             FROM customer WHERE run_id = ?1 ORDER BY customer_id ASC",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(Customer {
                customer_id: row.get(0)?,
                customer_type: parse_column(1, row.get(1)?)?,
                cccd_number: row.get(2)?,
                tax_code: row.get(3)?,
                full_name: row.get(4)?,
                date_of_birth: parse_date(5, row.get(5)?)?,
                phone_number: row.get(6)?,
                email: row.get(7)?,
                address: row.get(8)?,
                status: parse_column(9, row.get(9)?)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn accounts(&self, run_id: &str) -> LedgerResult<Vec<BankAccount>> {
        let mut stmt = self.conn.prepare(
            "SELECT account_id, customer_id, account_number, account_type, balance, status
             FROM bank_account WHERE run_id = ?1 ORDER BY account_id ASC",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(BankAccount {
                account_id: row.get(0)?,
                customer_id: row.get(1)?,
                account_number: row.get(2)?,
                account_type: parse_column(3, row.get(3)?)?,
                balance: parse_column(4, row.get(4)?)?,
                status: parse_column(5, row.get(5)?)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn devices(&self, run_id: &str) -> LedgerResult<Vec<Device>> {
        let mut stmt = self.conn.prepare(
            "SELECT device_id, customer_id, device_type, device_identifier, os_info, is_trusted, status
             FROM device WHERE run_id = ?1 ORDER BY device_id ASC",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(Device {
                device_id: row.get(0)?,
                customer_id: row.get(1)?,
                device_type: parse_column(2, row.get(2)?)?,
                device_identifier: row.get(3)?,
                os_info: row.get(4)?,
                is_trusted: row.get::<_, i32>(5)? != 0,
                status: parse_column(6, row.get(6)?)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn banks(&self, run_id: &str) -> LedgerResult<Vec<Bank>> {
        let mut stmt = self.conn.prepare(
            "SELECT bank_id, bank_code, bank_name, is_domestic
             FROM bank WHERE run_id = ?1 ORDER BY bank_id ASC",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(Bank {
                bank_id: row.get(0)?,
                bank_code: row.get(1)?,
                bank_name: row.get(2)?,
                is_domestic: row.get::<_, i32>(3)? != 0,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn external_customers(&self, run_id: &str) -> LedgerResult<Vec<ExternalCustomer>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, bank_id, cccd_number, full_name, phone_number
             FROM other_bank_customer WHERE run_id = ?1 ORDER BY customer_id ASC",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(ExternalCustomer {
                customer_id: row.get(0)?,
                bank_id: row.get(1)?,
                cccd_number: row.get(2)?,
                full_name: row.get(3)?,
                phone_number: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn external_accounts(&self, run_id: &str) -> LedgerResult<Vec<ExternalAccount>> {
        let mut stmt = self.conn.prepare(
            "SELECT account_id, customer_id, account_number, balance
             FROM other_bank_account WHERE run_id = ?1 ORDER BY account_id ASC",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(ExternalAccount {
                account_id: row.get(0)?,
                customer_id: row.get(1)?,
                account_number: row.get(2)?,
                balance: parse_column(3, row.get(3)?)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
