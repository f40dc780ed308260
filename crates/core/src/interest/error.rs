//! Accrual engine error types.

use sacco_shared::types::MemberId;
use sacco_shared::ErrorClass;
use thiserror::Error;

use crate::ledger::LedgerError;

/// Errors that can occur while accruing interest for one member.
#[derive(Debug, Error)]
pub enum AccrualError {
    /// The member carries loan balance but no loan terms on record.
    ///
    /// The engine never fabricates a start date; the member is skipped
    /// and the fault surfaced to an operator.
    #[error("Member {0} has loan balance but no loan terms on record")]
    MissingLoanTerms(MemberId),

    /// Per-member retries were exhausted without winning the version
    /// race.
    #[error("Gave up accruing for member {member_id} after {attempts} attempts")]
    RetriesExhausted {
        /// The member whose accrual kept conflicting.
        member_id: MemberId,
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// A ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl AccrualError {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::MissingLoanTerms(_) => ErrorClass::IntegrityFault,
            Self::RetriesExhausted { .. } => ErrorClass::Conflict,
            Self::Ledger(inner) => inner.class(),
        }
    }

    /// Returns the error code for operator surfaces.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingLoanTerms(_) => "MISSING_LOAN_TERMS",
            Self::RetriesExhausted { .. } => "ACCRUAL_RETRIES_EXHAUSTED",
            Self::Ledger(inner) => inner.error_code(),
        }
    }
}
