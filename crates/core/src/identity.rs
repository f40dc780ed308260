//! Acting-user identity and role gating.
//!
//! The core trusts the `(user id, role)` pair supplied by the caller;
//! authentication is the job of an external collaborator. Roles gate
//! which workflow transitions are callable.

use sacco_shared::types::UserId;
use serde::{Deserialize, Serialize};

/// Role of an acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// An ordinary society member.
    Member,
    /// Society administrator.
    Admin,
    /// Platform-level administrator.
    SuperAdmin,
}

impl Role {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "member" => Some(Self::Member),
            "admin" => Some(Self::Admin),
            "super_admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Returns true if this role can approve or reject membership and
    /// loan applications.
    #[must_use]
    pub const fn can_review_applications(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Returns true if this role can disburse approved loans.
    #[must_use]
    pub const fn can_disburse(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Returns true if this role can record settings changes.
    #[must_use]
    pub const fn can_update_settings(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Returns true if this role can grant a loan-eligibility override
    /// or change a member's status.
    #[must_use]
    pub const fn can_administer_members(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The acting user attached to an operation.
///
/// Supplied by the caller across the identity boundary; recorded as
/// `processed_by` on ledger entries the actor creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user's id.
    pub user_id: UserId,
    /// The acting user's role.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}
