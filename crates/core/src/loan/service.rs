//! Loan application workflow.
//!
//! Transitions: pending -> approved -> disbursed, pending -> rejected.
//! Eligibility gates both submission and approval; approval re-runs the
//! full evaluation because balances and status may have changed since
//! the application was submitted.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use sacco_shared::types::money::{is_valid_amount, round_minor_unit};
use sacco_shared::types::{LoanApplicationId, MemberId, TransactionId};

use super::eligibility::{evaluate, EligibilityReport};
use super::error::LoanError;
use super::types::{LoanApplication, LoanStatus};
use crate::identity::Actor;
use crate::ledger::LedgerStore;
use crate::member::LoanTerms;
use crate::settings::Settings;

/// Flat-rate estimate of the monthly repayment, frozen at disbursement:
/// principal divided over the term plus one month's interest on the
/// full principal, rounded half-up to the minor unit.
#[must_use]
pub fn monthly_payment_estimate(
    principal: Decimal,
    duration_months: u32,
    monthly_rate: Decimal,
) -> Decimal {
    let principal_share = principal / Decimal::from(duration_months.max(1));
    let interest_share = principal * monthly_rate / Decimal::from(100);
    round_minor_unit(principal_share + interest_share)
}

/// Manages the loan application lifecycle.
#[derive(Debug)]
pub struct LoanService {
    ledger: Arc<LedgerStore>,
    applications: DashMap<LoanApplicationId, LoanApplication>,
}

impl LoanService {
    /// Creates a service backed by the given ledger store.
    #[must_use]
    pub fn new(ledger: Arc<LedgerStore>) -> Self {
        Self {
            ledger,
            applications: DashMap::new(),
        }
    }

    /// Evaluates loan eligibility for a member without touching state.
    ///
    /// # Errors
    ///
    /// Returns a ledger error if the member does not exist.
    pub fn check_eligibility(
        &self,
        member_id: MemberId,
        requested_amount: Decimal,
        settings: &Settings,
        as_of: NaiveDate,
    ) -> Result<EligibilityReport, LoanError> {
        let snapshot = self.ledger.snapshot(member_id)?;
        Ok(evaluate(
            &snapshot.member,
            &snapshot.balances,
            settings,
            requested_amount,
            self.in_flight_for(member_id, None),
            as_of,
        ))
    }

    /// Submits a loan application.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed request, or
    /// `Ineligible` carrying every failing rule.
    pub fn submit(
        &self,
        member_id: MemberId,
        amount: Decimal,
        purpose: &str,
        duration_months: u32,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Result<LoanApplicationId, LoanError> {
        if !is_valid_amount(amount) {
            return Err(LoanError::InvalidAmount(amount));
        }
        if duration_months == 0 {
            return Err(LoanError::InvalidDuration);
        }
        if purpose.trim().is_empty() {
            return Err(LoanError::PurposeRequired);
        }

        let report = self.check_eligibility(member_id, amount, settings, now.date_naive())?;
        if !report.eligible {
            return Err(LoanError::Ineligible(report.reasons));
        }

        let id = LoanApplicationId::new();
        self.applications.insert(
            id,
            LoanApplication {
                id,
                member_id,
                amount,
                purpose: purpose.trim().to_string(),
                duration_months,
                status: LoanStatus::Pending,
                submitted_at: now,
                reviewed_at: None,
                reviewed_by: None,
                review_notes: None,
                disbursed_at: None,
            },
        );
        tracing::debug!(application_id = %id, %member_id, "loan application submitted");
        Ok(id)
    }

    /// Returns an application by id.
    pub fn application(&self, id: LoanApplicationId) -> Result<LoanApplication, LoanError> {
        self.applications
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or(LoanError::ApplicationNotFound(id))
    }

    /// Approves a pending application.
    ///
    /// Eligibility is re-evaluated against current balances and status;
    /// the result from submission time is never trusted.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admin actors, `InvalidTransition`
    /// unless pending, or `Ineligible` with every failing rule.
    pub fn approve(
        &self,
        actor: &Actor,
        id: LoanApplicationId,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Result<(), LoanError> {
        if !actor.role.can_review_applications() {
            return Err(LoanError::Forbidden(actor.role));
        }
        // Evaluate outside the entry guard: the in-flight scan walks
        // the application map and must not run while an entry is held.
        let application = self.application(id)?;
        if application.status != LoanStatus::Pending {
            return Err(LoanError::InvalidTransition {
                from: application.status,
                to: LoanStatus::Approved,
            });
        }

        let snapshot = self.ledger.snapshot(application.member_id)?;
        let report = evaluate(
            &snapshot.member,
            &snapshot.balances,
            settings,
            application.amount,
            self.in_flight_for(application.member_id, Some(id)),
            now.date_naive(),
        );
        if !report.eligible {
            return Err(LoanError::Ineligible(report.reasons));
        }

        let mut entry = self
            .applications
            .get_mut(&id)
            .ok_or(LoanError::ApplicationNotFound(id))?;
        if entry.status != LoanStatus::Pending {
            // Lost a race with a concurrent review.
            return Err(LoanError::InvalidTransition {
                from: entry.status,
                to: LoanStatus::Approved,
            });
        }
        entry.status = LoanStatus::Approved;
        entry.reviewed_at = Some(now);
        entry.reviewed_by = Some(actor.user_id);
        tracing::info!(application_id = %id, "loan application approved");
        Ok(())
    }

    /// Rejects a pending application. Review notes are required.
    ///
    /// # Errors
    ///
    /// Returns `ReviewNotesRequired` for blank notes, `Forbidden` for
    /// non-admin actors, or `InvalidTransition` unless pending.
    pub fn reject(
        &self,
        actor: &Actor,
        id: LoanApplicationId,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<(), LoanError> {
        if !actor.role.can_review_applications() {
            return Err(LoanError::Forbidden(actor.role));
        }
        if notes.trim().is_empty() {
            return Err(LoanError::ReviewNotesRequired);
        }
        let mut application = self
            .applications
            .get_mut(&id)
            .ok_or(LoanError::ApplicationNotFound(id))?;
        if application.status != LoanStatus::Pending {
            return Err(LoanError::InvalidTransition {
                from: application.status,
                to: LoanStatus::Rejected,
            });
        }

        application.status = LoanStatus::Rejected;
        application.reviewed_at = Some(now);
        application.reviewed_by = Some(actor.user_id);
        application.review_notes = Some(notes.trim().to_string());
        tracing::info!(application_id = %id, "loan application rejected");
        Ok(())
    }

    /// Disburses an approved loan.
    ///
    /// Posts exactly one disbursement entry, freezes the loan terms
    /// from the current settings snapshot on the member record, and
    /// initializes the accrual watermark, all as one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admin actors, `InvalidTransition`
    /// unless approved, or a ledger error; the application stays
    /// approved if the ledger write fails.
    pub fn disburse(
        &self,
        actor: &Actor,
        id: LoanApplicationId,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Result<TransactionId, LoanError> {
        if !actor.role.can_disburse() {
            return Err(LoanError::Forbidden(actor.role));
        }
        let mut application = self
            .applications
            .get_mut(&id)
            .ok_or(LoanError::ApplicationNotFound(id))?;
        if application.status != LoanStatus::Approved {
            return Err(LoanError::InvalidTransition {
                from: application.status,
                to: LoanStatus::Disbursed,
            });
        }

        let start_date = now.date_naive();
        let terms = LoanTerms {
            start_date,
            duration_months: application.duration_months,
            monthly_rate: settings.loan_interest_rate,
            monthly_payment: monthly_payment_estimate(
                application.amount,
                application.duration_months,
                settings.loan_interest_rate,
            ),
            last_interest_calculation_date: start_date,
        };
        let transaction_id = self.ledger.post_disbursement(
            application.member_id,
            id,
            application.amount,
            terms,
            start_date,
            actor.user_id,
            None,
        )?;

        application.status = LoanStatus::Disbursed;
        application.disbursed_at = Some(now);
        tracing::info!(
            application_id = %id,
            member_id = %application.member_id,
            amount = %application.amount,
            "loan disbursed"
        );
        Ok(transaction_id)
    }

    /// Returns the member's in-flight application, if any, excluding
    /// the one under review.
    fn in_flight_for(
        &self,
        member_id: MemberId,
        exclude: Option<LoanApplicationId>,
    ) -> Option<LoanApplicationId> {
        self.applications
            .iter()
            .filter(|entry| entry.member_id == member_id && entry.status.is_in_flight())
            .map(|entry| entry.id)
            .find(|id| Some(*id) != exclude)
    }
}
