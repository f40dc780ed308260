//! Ledger error types for validation, invariant, and state errors.

use rust_decimal::Decimal;
use sacco_shared::types::MemberId;
use sacco_shared::ErrorClass;
use thiserror::Error;

use super::transaction::{BalanceKind, TransactionKind};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Amount is not a valid movement for this entry kind.
    #[error("Invalid amount {amount} for {kind} entry")]
    InvalidAmount {
        /// The entry kind being appended.
        kind: TransactionKind,
        /// The offending amount.
        amount: Decimal,
    },

    /// Reference number already used for this member and entry kind.
    #[error("Duplicate reference number {reference}")]
    DuplicateReference {
        /// The colliding reference number.
        reference: String,
    },

    /// Entry date precedes the member's latest ledger entry.
    #[error("Entry date {attempted} precedes latest ledger date {latest}")]
    BackdatedEntry {
        /// The member's latest ledger date.
        latest: chrono::NaiveDate,
        /// The attempted entry date.
        attempted: chrono::NaiveDate,
    },

    // ========== Invariant Violations ==========
    /// The entry would drive a balance negative.
    #[error("Insufficient {kind} balance: have {balance}, need {amount}")]
    InsufficientBalance {
        /// The balance the entry draws on.
        kind: BalanceKind,
        /// The current balance.
        balance: Decimal,
        /// The attempted movement.
        amount: Decimal,
    },

    /// A disbursement was attempted while a loan is still outstanding.
    #[error("Member {0} already has an open loan")]
    OpenLoanExists(MemberId),

    /// A cached balance diverged from ledger replay.
    #[error("{kind} balance mismatch for member {member_id}: cached {cached}, replayed {replayed}")]
    BalanceMismatch {
        /// The member whose ledger failed reconciliation.
        member_id: MemberId,
        /// The diverging balance.
        kind: BalanceKind,
        /// The cached running value.
        cached: Decimal,
        /// The value recomputed from history.
        replayed: Decimal,
    },

    /// A stored `balance_after` snapshot does not match its running fold.
    #[error("Snapshot chain broken for member {member_id} at sequence {seq}: stored {stored}, expected {expected}")]
    SnapshotChainBroken {
        /// The member whose ledger failed reconciliation.
        member_id: MemberId,
        /// Sequence number of the inconsistent entry.
        seq: u64,
        /// The stored snapshot.
        stored: Decimal,
        /// The recomputed running balance.
        expected: Decimal,
    },

    // ========== Data Integrity Faults ==========
    /// A member carries loan balance without loan terms on record.
    #[error("Member {0} has loan balance but no loan terms on record")]
    MissingLoanTerms(MemberId),

    // ========== Concurrency Errors ==========
    /// The member record changed since it was read.
    #[error("Version conflict for member {member_id}: expected {expected}, found {actual}")]
    VersionConflict {
        /// The member being updated.
        member_id: MemberId,
        /// The version the caller read.
        expected: u64,
        /// The version found at commit.
        actual: u64,
    },

    // ========== Lookup Errors ==========
    /// Member not found.
    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    /// Member id already registered.
    #[error("Member already registered: {0}")]
    MemberAlreadyRegistered(MemberId),
}

impl LedgerError {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidAmount { .. }
            | Self::DuplicateReference { .. }
            | Self::BackdatedEntry { .. } => ErrorClass::Validation,
            Self::InsufficientBalance { .. }
            | Self::OpenLoanExists(_)
            | Self::BalanceMismatch { .. }
            | Self::SnapshotChainBroken { .. }
            | Self::MemberAlreadyRegistered(_) => ErrorClass::Invariant,
            Self::MissingLoanTerms(_) => ErrorClass::IntegrityFault,
            Self::VersionConflict { .. } => ErrorClass::Conflict,
            Self::MemberNotFound(_) => ErrorClass::NotFound,
        }
    }

    /// Returns the error code for operator surfaces.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::DuplicateReference { .. } => "DUPLICATE_REFERENCE",
            Self::BackdatedEntry { .. } => "BACKDATED_ENTRY",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::OpenLoanExists(_) => "OPEN_LOAN_EXISTS",
            Self::BalanceMismatch { .. } => "BALANCE_MISMATCH",
            Self::SnapshotChainBroken { .. } => "SNAPSHOT_CHAIN_BROKEN",
            Self::MissingLoanTerms(_) => "MISSING_LOAN_TERMS",
            Self::VersionConflict { .. } => "VERSION_CONFLICT",
            Self::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            Self::MemberAlreadyRegistered(_) => "MEMBER_ALREADY_REGISTERED",
        }
    }

    /// Returns true if the failed operation is safe to retry as a whole.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.class().is_retryable()
    }
}
