//! Membership workflow error types.

use sacco_shared::types::{MemberId, MembershipApplicationId};
use sacco_shared::ErrorClass;
use thiserror::Error;

use super::types::ApplicationStatus;
use crate::identity::Role;
use crate::ledger::LedgerError;

/// Errors that can occur during membership operations.
#[derive(Debug, Error)]
pub enum MembershipError {
    /// Application not found.
    #[error("Membership application not found: {0}")]
    ApplicationNotFound(MembershipApplicationId),

    /// Attempted an invalid status transition.
    #[error("Invalid membership application transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: ApplicationStatus,
        /// The attempted target status.
        to: ApplicationStatus,
    },

    /// Applicant name is blank.
    #[error("Applicant name is required")]
    ApplicantNameRequired,

    /// The two guarantors are the same member.
    #[error("Guarantors must be two distinct members")]
    GuarantorsNotDistinct,

    /// A guarantor does not exist.
    #[error("Guarantor not found: {0}")]
    GuarantorNotFound(MemberId),

    /// A guarantor is no longer an active member.
    #[error("Guarantor {0} is not an active member")]
    GuarantorNotActive(MemberId),

    /// A guarantor belongs to a different society.
    #[error("Guarantor {0} does not belong to the target society")]
    GuarantorSocietyMismatch(MemberId),

    /// Review notes are required but missing or blank.
    #[error("Review notes are required")]
    ReviewNotesRequired,

    /// An override grant needs a stated reason.
    #[error("Override reason is required")]
    OverrideReasonRequired,

    /// The acting role may not perform this operation.
    #[error("Role {0} may not perform membership reviews")]
    Forbidden(Role),

    /// A ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl MembershipError {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::ApplicationNotFound(_) => ErrorClass::NotFound,
            Self::InvalidTransition { .. } => ErrorClass::Invariant,
            Self::ApplicantNameRequired
            | Self::GuarantorsNotDistinct
            | Self::GuarantorNotFound(_)
            | Self::GuarantorNotActive(_)
            | Self::GuarantorSocietyMismatch(_)
            | Self::ReviewNotesRequired
            | Self::OverrideReasonRequired => ErrorClass::Validation,
            Self::Forbidden(_) => ErrorClass::Forbidden,
            Self::Ledger(inner) => inner.class(),
        }
    }

    /// Returns the error code for operator surfaces.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ApplicationNotFound(_) => "APPLICATION_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ApplicantNameRequired => "APPLICANT_NAME_REQUIRED",
            Self::GuarantorsNotDistinct => "GUARANTORS_NOT_DISTINCT",
            Self::GuarantorNotFound(_) => "GUARANTOR_NOT_FOUND",
            Self::GuarantorNotActive(_) => "GUARANTOR_NOT_ACTIVE",
            Self::GuarantorSocietyMismatch(_) => "GUARANTOR_SOCIETY_MISMATCH",
            Self::ReviewNotesRequired => "REVIEW_NOTES_REQUIRED",
            Self::OverrideReasonRequired => "OVERRIDE_REASON_REQUIRED",
            Self::Forbidden(_) => "MEMBERSHIP_FORBIDDEN",
            Self::Ledger(inner) => inner.error_code(),
        }
    }
}
