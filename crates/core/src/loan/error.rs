//! Loan workflow error types.

use rust_decimal::Decimal;
use sacco_shared::types::LoanApplicationId;
use sacco_shared::ErrorClass;
use thiserror::Error;

use super::eligibility::IneligibilityReason;
use super::types::LoanStatus;
use crate::identity::Role;
use crate::ledger::LedgerError;

/// Errors that can occur during loan workflow operations.
#[derive(Debug, Error)]
pub enum LoanError {
    /// Application not found.
    #[error("Loan application not found: {0}")]
    ApplicationNotFound(LoanApplicationId),

    /// Attempted an invalid status transition.
    #[error("Invalid loan application transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: LoanStatus,
        /// The attempted target status.
        to: LoanStatus,
    },

    /// The member failed one or more eligibility rules.
    #[error("Member is not eligible: {}", format_reasons(.0))]
    Ineligible(Vec<IneligibilityReason>),

    /// The requested amount is not a valid principal.
    #[error("Invalid loan amount: {0}")]
    InvalidAmount(Decimal),

    /// The requested duration must be at least one month.
    #[error("Loan duration must be at least one month")]
    InvalidDuration,

    /// The loan purpose is blank.
    #[error("Loan purpose is required")]
    PurposeRequired,

    /// Review notes are required but missing or blank.
    #[error("Review notes are required")]
    ReviewNotesRequired,

    /// The acting role may not perform this operation.
    #[error("Role {0} may not review or disburse loans")]
    Forbidden(Role),

    /// A ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

fn format_reasons(reasons: &[IneligibilityReason]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LoanError {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::ApplicationNotFound(_) => ErrorClass::NotFound,
            Self::InvalidTransition { .. } => ErrorClass::Invariant,
            Self::Ineligible(_)
            | Self::InvalidAmount(_)
            | Self::InvalidDuration
            | Self::PurposeRequired
            | Self::ReviewNotesRequired => ErrorClass::Validation,
            Self::Forbidden(_) => ErrorClass::Forbidden,
            Self::Ledger(inner) => inner.class(),
        }
    }

    /// Returns the error code for operator surfaces.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ApplicationNotFound(_) => "LOAN_APPLICATION_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Ineligible(_) => "MEMBER_INELIGIBLE",
            Self::InvalidAmount(_) => "INVALID_LOAN_AMOUNT",
            Self::InvalidDuration => "INVALID_LOAN_DURATION",
            Self::PurposeRequired => "LOAN_PURPOSE_REQUIRED",
            Self::ReviewNotesRequired => "REVIEW_NOTES_REQUIRED",
            Self::Forbidden(_) => "LOAN_FORBIDDEN",
            Self::Ledger(inner) => inner.error_code(),
        }
    }

    /// Returns true if the failed operation is safe to retry as a whole.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.class().is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sacco_shared::types::MemberId;

    #[test]
    fn ineligible_lists_every_reason() {
        let err = LoanError::Ineligible(vec![
            IneligibilityReason::MembershipTooRecent {
                age_months: 3,
                required_months: 6,
            },
            IneligibilityReason::AmountExceedsCap {
                requested: dec!(200000),
                cap: dec!(100000),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("membership age 3 months"));
        assert!(msg.contains("exceeds the cap"));
        assert_eq!(err.class(), ErrorClass::Validation);
    }

    #[test]
    fn version_conflicts_bubble_up_retryable() {
        let err = LoanError::from(LedgerError::VersionConflict {
            member_id: MemberId::new(),
            expected: 1,
            actual: 2,
        });
        assert!(err.is_retryable());
        assert_eq!(err.class(), ErrorClass::Conflict);
    }

    #[test]
    fn transition_error_names_both_states() {
        let err = LoanError::InvalidTransition {
            from: LoanStatus::Disbursed,
            to: LoanStatus::Approved,
        };
        assert!(err.to_string().contains("disbursed"));
        assert!(err.to_string().contains("approved"));
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
    }
}
