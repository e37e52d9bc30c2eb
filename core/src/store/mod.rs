//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Generators work on in-memory values; a run is written in one
//! transaction after generation finishes, or not at all.

use crate::{
    auth_catalog::{AuthMethod, AuthMethodCatalog},
    error::LedgerResult,
    sequence::{SequenceBook, SequenceKind},
};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, types::Type, Connection};
use std::str::FromStr;

mod entities;
mod ledger;

pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SimStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl SimStore {
    pub fn open(path: &str) -> LedgerResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> LedgerResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Apply all schema migrations in order. Safe to call repeatedly.
    pub fn migrate(&self) -> LedgerResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_ledger.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_auth_methods.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str) -> LedgerResult<()> {
        let started_at = chrono::Local::now()
            .naive_local()
            .format(DATETIME_FORMAT)
            .to_string();
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, seed as i64, version, started_at],
        )?;
        Ok(())
    }

    pub fn run_seed(&self, run_id: &str) -> LedgerResult<Option<u64>> {
        use rusqlite::OptionalExtension;
        let seed: Option<i64> = self
            .conn
            .query_row(
                "SELECT seed FROM run WHERE run_id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(seed.map(|s| s as u64))
    }

    // ── Authentication methods ─────────────────────────────────

    pub fn auth_methods(&self) -> LedgerResult<AuthMethodCatalog> {
        let mut stmt = self.conn.prepare(
            "SELECT auth_id, method_type, method_name, security_level, description
             FROM authentication_method ORDER BY auth_id ASC",
        )?;
        let methods = stmt
            .query_map([], |row| {
                Ok(AuthMethod {
                    auth_id: row.get(0)?,
                    method_type: row.get(1)?,
                    method_name: row.get(2)?,
                    security_level: parse_column(3, row.get(3)?)?,
                    description: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AuthMethodCatalog::new(methods))
    }

    /// Remove a catalog row. Only meaningful before any log references it.
    pub fn delete_auth_method(&self, auth_id: i16) -> LedgerResult<bool> {
        let n = self.conn.execute(
            "DELETE FROM authentication_method WHERE auth_id = ?1",
            params![auth_id],
        )?;
        Ok(n > 0)
    }

    // ── Sequences ──────────────────────────────────────────────

    /// Sequences continue past the highest id already stored, across runs.
    pub fn sequence_book(&self) -> LedgerResult<SequenceBook> {
        let mut book = SequenceBook::default();
        for kind in SequenceKind::ALL {
            let (table, column) = sequence_source(kind);
            let max: i64 = self.conn.query_row(
                &format!("SELECT COALESCE(MAX({column}), 0) FROM {table}"),
                [],
                |row| row.get(0),
            )?;
            book.advance_past(kind, max);
        }
        Ok(book)
    }
}

fn sequence_source(kind: SequenceKind) -> (&'static str, &'static str) {
    match kind {
        SequenceKind::Bank => ("bank", "bank_id"),
        SequenceKind::Customer => ("customer", "customer_id"),
        SequenceKind::BankAccount => ("bank_account", "account_id"),
        SequenceKind::Device => ("device", "device_id"),
        SequenceKind::ExternalCustomer => ("other_bank_customer", "customer_id"),
        SequenceKind::ExternalAccount => ("other_bank_account", "account_id"),
        SequenceKind::Transaction => ("payment_transaction", "transaction_id"),
        SequenceKind::AuthLog => ("authentication_log", "log_id"),
    }
}

// ── Column conversion ──────────────────────────────────────────

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

/// Parse a TEXT column through `FromStr` (enums, decimal amounts).
pub(crate) fn parse_column<T>(idx: usize, text: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    text.parse::<T>()
        .map_err(|e| conversion_error(idx, format!("{e}: '{text}'")))
}

pub(crate) fn parse_datetime(idx: usize, text: String) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT)
        .map_err(|e| conversion_error(idx, format!("{e}: '{text}'")))
}

pub(crate) fn parse_date(idx: usize, text: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    text.map(|t| {
        NaiveDate::parse_from_str(&t, DATE_FORMAT)
            .map_err(|e| conversion_error(idx, format!("{e}: '{t}'")))
    })
    .transpose()
}
