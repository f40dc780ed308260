//! Membership application domain types.

use chrono::{DateTime, Utc};
use sacco_shared::types::{MemberId, MembershipApplicationId, SocietyId, UserId};
use serde::{Deserialize, Serialize};

/// Membership application status.
///
/// Valid transitions: Pending -> Approved, Pending -> Rejected. Both
/// terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Awaiting review.
    Pending,
    /// Approved; a member record was created.
    Approved,
    /// Rejected with review notes.
    Rejected,
}

impl ApplicationStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An application to join a society.
///
/// Guarantor validity is enforced at approval, not submission, because
/// guarantor status can change between the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipApplication {
    /// Unique identifier.
    pub id: MembershipApplicationId,
    /// The society applied to.
    pub society_id: SocietyId,
    /// Applicant's full name.
    pub applicant_name: String,
    /// First guarantor; must be an active member of the society.
    pub guarantor1: MemberId,
    /// Second guarantor; must differ from the first.
    pub guarantor2: MemberId,
    /// Current status.
    pub status: ApplicationStatus,
    /// When the application was submitted.
    pub submitted_at: DateTime<Utc>,
    /// When the application was reviewed; set only on terminal transition.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer; set only on terminal transition.
    pub reviewed_by: Option<UserId>,
    /// Reviewer's notes; required on rejection.
    pub review_notes: Option<String>,
    /// The member created by approval, if any.
    pub member_id: Option<MemberId>,
}
