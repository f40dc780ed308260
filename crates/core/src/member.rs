//! Member aggregate.
//!
//! A member is created by membership-application approval and never
//! hard-deleted; `status` transitions to inactive/suspended instead.
//! Balances are not stored here: they are derived from the member's
//! ledger (see `ledger::balance`). What lives on the member record is
//! identity, lifecycle status, and the loan terms frozen at
//! disbursement time.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sacco_shared::types::{MemberId, SocietyId, UserId};
use serde::{Deserialize, Serialize};

use crate::period::months_between;

/// Lifecycle status of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Member in good standing; may transact and apply for loans.
    Active,
    /// Member who left or lapsed; retained for the audit trail.
    Inactive,
    /// Member barred by an administrator.
    Suspended,
}

impl MemberStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Loan terms frozen when a loan is disbursed.
///
/// Later settings edits never touch these; the rate a member pays is the
/// rate that was current when their loan was disbursed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Date the loan was disbursed; anchor for accrual anniversaries.
    pub start_date: NaiveDate,
    /// Agreed repayment duration in months.
    pub duration_months: u32,
    /// Frozen monthly interest rate, in percent.
    pub monthly_rate: Decimal,
    /// Flat-estimate monthly repayment amount.
    pub monthly_payment: Decimal,
    /// Watermark: last date through which interest has been charged.
    pub last_interest_calculation_date: NaiveDate,
}

/// An admin-granted bypass of the minimum-membership-age loan rule.
///
/// Never a bare boolean: the grant records who, when, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideGrant {
    /// Administrator who granted the override.
    pub granted_by: UserId,
    /// Stated justification for the override.
    pub reason: String,
    /// When the override was granted.
    pub granted_at: DateTime<Utc>,
}

/// A society member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier.
    pub id: MemberId,
    /// Society this member belongs to.
    pub society_id: SocietyId,
    /// Sequential member number within the society.
    pub member_number: u32,
    /// Member's full name.
    pub full_name: String,
    /// Lifecycle status.
    pub status: MemberStatus,
    /// Date the membership was approved.
    pub date_joined: NaiveDate,
    /// Terms of the currently open loan, if any.
    pub loan: Option<LoanTerms>,
    /// Admin bypass of the minimum-membership-age loan rule, if granted.
    pub loan_eligibility_override: Option<OverrideGrant>,
}

impl Member {
    /// Returns true if the member may transact.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    /// Whole months of membership as of the given date.
    #[must_use]
    pub fn membership_age_months(&self, as_of: NaiveDate) -> u32 {
        months_between(self.date_joined, as_of)
    }
}
