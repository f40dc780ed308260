//! Society settings snapshots.
//!
//! Engines never read ambient configuration: every call that needs
//! settings receives an immutable [`Settings`] snapshot. Changes are
//! recorded append-only with author and timestamp; they never alter
//! already-posted transactions or a disbursed loan's frozen rate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sacco_shared::types::UserId;
use sacco_shared::ErrorClass;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;

use crate::identity::Actor;

/// Immutable settings snapshot consumed by the engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base monthly loan interest rate, in percent.
    pub loan_interest_rate: Decimal,
    /// Standard loan term; the rate doubles for accruals past it.
    pub standard_loan_term_months: u32,
    /// Minimum whole months of membership before a loan application.
    pub new_member_loan_eligibility_months: u32,
    /// Maximum loan amount as a multiple of shares + savings.
    pub loan_to_shares_savings_ratio: Decimal,
    /// When this snapshot was recorded.
    pub last_updated: DateTime<Utc>,
    /// Who recorded this snapshot.
    pub updated_by: UserId,
}

/// The tunable values of a settings change, before audit stamping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsDraft {
    /// Base monthly loan interest rate, in percent.
    pub loan_interest_rate: Decimal,
    /// Standard loan term in months.
    pub standard_loan_term_months: u32,
    /// Minimum whole months of membership before a loan application.
    pub new_member_loan_eligibility_months: u32,
    /// Maximum loan amount as a multiple of shares + savings.
    pub loan_to_shares_savings_ratio: Decimal,
}

/// Errors raised when recording a settings change.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The acting role may not record settings changes.
    #[error("Role {0} may not update settings")]
    Forbidden(crate::identity::Role),

    /// The interest rate must be positive.
    #[error("Loan interest rate must be positive, got {0}")]
    InvalidRate(Decimal),

    /// The loan-to-collateral ratio must be positive.
    #[error("Loan-to-shares/savings ratio must be positive, got {0}")]
    InvalidRatio(Decimal),

    /// The standard term must be at least one month.
    #[error("Standard loan term must be at least one month")]
    InvalidTerm,
}

impl SettingsError {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Forbidden(_) => ErrorClass::Forbidden,
            Self::InvalidRate(_) | Self::InvalidRatio(_) | Self::InvalidTerm => {
                ErrorClass::Validation
            }
        }
    }

    /// Returns the error code for operator surfaces.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "SETTINGS_FORBIDDEN",
            Self::InvalidRate(_) => "INVALID_INTEREST_RATE",
            Self::InvalidRatio(_) => "INVALID_LOAN_RATIO",
            Self::InvalidTerm => "INVALID_LOAN_TERM",
        }
    }
}

/// Append-only log of settings snapshots; the current settings are the
/// last recorded entry.
#[derive(Debug)]
pub struct SettingsLog {
    entries: RwLock<Vec<Settings>>,
}

impl SettingsLog {
    /// Creates a log seeded with an initial snapshot.
    #[must_use]
    pub fn new(initial: Settings) -> Self {
        Self {
            entries: RwLock::new(vec![initial]),
        }
    }

    /// Records a settings change.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Forbidden` unless the actor is an admin,
    /// or a validation error for out-of-range values. Nothing is
    /// appended on failure.
    pub fn record(
        &self,
        actor: &Actor,
        draft: SettingsDraft,
        now: DateTime<Utc>,
    ) -> Result<Settings, SettingsError> {
        if !actor.role.can_update_settings() {
            return Err(SettingsError::Forbidden(actor.role));
        }
        if draft.loan_interest_rate <= Decimal::ZERO {
            return Err(SettingsError::InvalidRate(draft.loan_interest_rate));
        }
        if draft.loan_to_shares_savings_ratio <= Decimal::ZERO {
            return Err(SettingsError::InvalidRatio(draft.loan_to_shares_savings_ratio));
        }
        if draft.standard_loan_term_months == 0 {
            return Err(SettingsError::InvalidTerm);
        }

        let snapshot = Settings {
            loan_interest_rate: draft.loan_interest_rate,
            standard_loan_term_months: draft.standard_loan_term_months,
            new_member_loan_eligibility_months: draft.new_member_loan_eligibility_months,
            loan_to_shares_savings_ratio: draft.loan_to_shares_savings_ratio,
            last_updated: now,
            updated_by: actor.user_id,
        };
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.push(snapshot.clone());
        tracing::debug!(updated_by = %actor.user_id, "settings change recorded");
        Ok(snapshot)
    }

    /// Returns the current settings snapshot.
    #[must_use]
    pub fn current(&self) -> Settings {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .last()
            .cloned()
            .expect("settings log is never empty")
    }

    /// Returns the full change history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Settings> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}
