//! Append-only transaction ledger and balance projection.
//!
//! This module implements the financial source of truth:
//! - Transaction kinds and the balances they fold into
//! - The append-only store with per-member atomicity
//! - Balance projection and ledger reconciliation
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod store;
pub mod transaction;

#[cfg(test)]
mod store_props;

pub use balance::{project, BalanceSet};
pub use error::LedgerError;
pub use store::{LedgerStore, MemberSnapshot};
pub use transaction::{AppendInput, BalanceKind, Transaction, TransactionKind};
