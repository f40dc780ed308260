//! Loan application domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sacco_shared::types::{LoanApplicationId, MemberId, UserId};
use serde::{Deserialize, Serialize};

/// Loan application status.
///
/// Valid transitions: Pending -> Approved -> Disbursed, and
/// Pending -> Rejected. No transition is reversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// Awaiting review.
    Pending,
    /// Approved, awaiting disbursement.
    Approved,
    /// Rejected with review notes.
    Rejected,
    /// Principal paid out; loan terms frozen on the member.
    Disbursed,
}

impl LoanStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Disbursed => "disbursed",
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Disbursed)
    }

    /// Returns true if this application still occupies the member's
    /// single in-flight workflow slot.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An application for a loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanApplication {
    /// Unique identifier.
    pub id: LoanApplicationId,
    /// The applying member.
    pub member_id: MemberId,
    /// Requested principal.
    pub amount: Decimal,
    /// Stated purpose of the loan.
    pub purpose: String,
    /// Requested repayment duration in months.
    pub duration_months: u32,
    /// Current status.
    pub status: LoanStatus,
    /// When the application was submitted.
    pub submitted_at: DateTime<Utc>,
    /// When the application was reviewed; set only on terminal review.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer; set only on terminal review.
    pub reviewed_by: Option<UserId>,
    /// Reviewer's notes; required on rejection.
    pub review_notes: Option<String>,
    /// When the loan was disbursed; set iff status is Disbursed.
    pub disbursed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_and_in_flight_states() {
        assert!(LoanStatus::Pending.is_in_flight());
        assert!(LoanStatus::Approved.is_in_flight());
        assert!(!LoanStatus::Rejected.is_in_flight());
        assert!(!LoanStatus::Disbursed.is_in_flight());

        assert!(!LoanStatus::Pending.is_terminal());
        assert!(!LoanStatus::Approved.is_terminal());
        assert!(LoanStatus::Rejected.is_terminal());
        assert!(LoanStatus::Disbursed.is_terminal());
    }

    #[test]
    fn status_display() {
        assert_eq!(LoanStatus::Disbursed.to_string(), "disbursed");
        assert_eq!(LoanStatus::Approved.to_string(), "approved");
    }
}
