//! Synthetic ledger generation for a simulated digital bank.
//!
//! One run builds customers, accounts, devices and other-bank reference
//! data, generates balance-consistent payment transactions against an
//! in-memory ledger, attaches authentication attempts, and optionally
//! writes the whole result to SQLite in one transaction.

pub mod amount;
pub mod auth_catalog;
pub mod auth_log_generator;
pub mod config;
pub mod engine;
pub mod entity_factory;
pub mod error;
pub mod identity_pool;
pub mod ledger_state;
pub mod model;
pub mod name_generator;
pub mod policy;
pub mod rng;
pub mod sequence;
pub mod store;
pub mod transaction_generator;
pub mod types;
