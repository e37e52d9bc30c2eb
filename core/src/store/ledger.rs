use super::{parse_column, parse_datetime, SimStore, DATETIME_FORMAT};
use crate::{
    engine::GeneratedLedger,
    error::LedgerResult,
    ledger_state::LedgerState,
    model::{AuthenticationAttempt, PaymentTransaction},
    types::{AccountId, ExternalAccountId},
};
use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;

const SCHEMA_VERSION: &str = "ledger-1";

impl SimStore {
    // ── Run persistence ───────────────────────────────────────────

    /// Write a finished run in a single SQLite transaction: run row,
    /// entities, transactions, authentication attempts, final balances.
    /// Nothing is visible unless every insert succeeds.
    pub fn persist_run(&self, run_id: &str, seed: u64, generated: &GeneratedLedger) -> LedgerResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        self.insert_run(run_id, seed, SCHEMA_VERSION)?;
        self.insert_entities(run_id, &generated.entities)?;
        self.save_transactions(run_id, &generated.report.transactions)?;
        self.save_auth_logs(run_id, &generated.auth_logs)?;
        self.write_back_balances(run_id, &generated.ledger)?;
        tx.commit()?;
        log::debug!(
            "persisted run {}: {} transactions, {} auth logs",
            run_id,
            generated.report.transactions.len(),
            generated.auth_logs.len()
        );
        Ok(())
    }

    // ── Transactions ──────────────────────────────────────────────

    pub fn save_transactions(&self, run_id: &str, txns: &[PaymentTransaction]) -> LedgerResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO payment_transaction (
                transaction_id, run_id, from_account_id, to_account_internal_id,
                to_account_external_id, customer_id, transaction_type, amount,
                security_level, description, transaction_date, status, device_id, is_suspicious
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )?;
        for t in txns {
            stmt.execute(params![
                t.transaction_id,
                run_id,
                t.from_account_id,
                t.to_account_internal_id,
                t.to_account_external_id,
                t.customer_id,
                t.transaction_type.as_str(),
                t.amount.to_string(),
                t.security_level.as_str(),
                t.description,
                t.transaction_date.format(DATETIME_FORMAT).to_string(),
                t.status.as_str(),
                t.device_id,
                t.is_suspicious,
            ])?;
        }
        Ok(())
    }

    pub fn transactions(&self, run_id: &str) -> LedgerResult<Vec<PaymentTransaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT transaction_id, from_account_id, to_account_internal_id, to_account_external_id,
                    customer_id, transaction_type, amount, security_level, description,
                    transaction_date, status, device_id, is_suspicious
             FROM payment_transaction WHERE run_id = ?1 ORDER BY transaction_id ASC",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(PaymentTransaction {
                transaction_id: row.get(0)?,
                from_account_id: row.get(1)?,
                to_account_internal_id: row.get(2)?,
                to_account_external_id: row.get(3)?,
                customer_id: row.get(4)?,
                transaction_type: parse_column(5, row.get(5)?)?,
                amount: parse_column(6, row.get(6)?)?,
                security_level: parse_column(7, row.get(7)?)?,
                description: row.get(8)?,
                transaction_date: parse_datetime(9, row.get(9)?)?,
                status: parse_column(10, row.get(10)?)?,
                device_id: row.get(11)?,
                is_suspicious: row.get::<_, i32>(12)? != 0,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn transaction_count(&self, run_id: &str) -> LedgerResult<usize> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM payment_transaction WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    // ── Authentication log ────────────────────────────────────────

    pub fn save_auth_logs(&self, run_id: &str, logs: &[AuthenticationAttempt]) -> LedgerResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO authentication_log (
                log_id, run_id, transaction_id, auth_method_id, auth_result, failure_reason, auth_timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for a in logs {
            stmt.execute(params![
                a.log_id,
                run_id,
                a.transaction_id,
                a.auth_method_id,
                a.auth_result.as_str(),
                a.failure_reason,
                a.auth_timestamp.format(DATETIME_FORMAT).to_string(),
            ])?;
        }
        Ok(())
    }

    pub fn auth_logs(&self, run_id: &str) -> LedgerResult<Vec<AuthenticationAttempt>> {
        let mut stmt = self.conn.prepare(
            "SELECT log_id, transaction_id, auth_method_id, auth_result, failure_reason, auth_timestamp
             FROM authentication_log WHERE run_id = ?1 ORDER BY log_id ASC",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(AuthenticationAttempt {
                log_id: row.get(0)?,
                transaction_id: row.get(1)?,
                auth_method_id: row.get(2)?,
                auth_result: parse_column(3, row.get(3)?)?,
                failure_reason: row.get(4)?,
                auth_timestamp: parse_datetime(5, row.get(5)?)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn auth_log_count(&self, run_id: &str) -> LedgerResult<usize> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM authentication_log WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    // ── Balances ──────────────────────────────────────────────────

    /// Overwrite stored balances with the final Ledger State. Accounts the
    /// ledger never tracked (inactive, frozen) keep their seeded balance.
    pub fn write_back_balances(&self, run_id: &str, ledger: &LedgerState) -> LedgerResult<()> {
        {
            let mut stmt = self.conn.prepare_cached(
                "UPDATE bank_account SET balance = ?1 WHERE run_id = ?2 AND account_id = ?3",
            )?;
            for (account_id, balance) in ledger.internal_balances() {
                stmt.execute(params![balance.to_string(), run_id, account_id])?;
            }
        }
        let mut stmt = self.conn.prepare_cached(
            "UPDATE other_bank_account SET balance = ?1 WHERE run_id = ?2 AND account_id = ?3",
        )?;
        for (account_id, balance) in ledger.external_balances() {
            stmt.execute(params![balance.to_string(), run_id, account_id])?;
        }
        Ok(())
    }

    pub fn account_balance(&self, run_id: &str, account_id: AccountId) -> LedgerResult<Option<Decimal>> {
        let text: Option<String> = self
            .conn
            .query_row(
                "SELECT balance FROM bank_account WHERE run_id = ?1 AND account_id = ?2",
                params![run_id, account_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(text.map(|t| parse_column(0, t)).transpose()?)
    }

    pub fn external_account_balance(
        &self,
        run_id: &str,
        account_id: ExternalAccountId,
    ) -> LedgerResult<Option<Decimal>> {
        let text: Option<String> = self
            .conn
            .query_row(
                "SELECT balance FROM other_bank_account WHERE run_id = ?1 AND account_id = ?2",
                params![run_id, account_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(text.map(|t| parse_column(0, t)).transpose()?)
    }
}
