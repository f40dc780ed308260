//! Monthly interest accrual engine.
//!
//! The only scheduled actor in the system. For every member with an
//! open loan it posts one interest charge per whole calendar month
//! elapsed since the accrual watermark, then advances the watermark.
//! The watermark, not a history scan, is what makes re-runs no-ops: a
//! crash mid-run resumes exactly where the last posted charge left off.
//!
//! Rate escalation: a charge for month `k` of the loan uses the frozen
//! monthly rate while `k` is within the standard term, and double that
//! rate once `k` exceeds it. The doubling is a function of loan-elapsed
//! time alone; repayments never reset it.

use std::sync::Arc;

use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::Decimal;
use sacco_shared::config::AccrualConfig;
use sacco_shared::types::money::round_minor_unit;
use sacco_shared::types::MemberId;

use super::error::AccrualError;
use crate::ledger::LedgerStore;
use crate::period::{add_months_clamped, months_between};
use crate::settings::Settings;

/// The effective monthly rate for the charge covering loan month
/// `month_index` (1-based).
#[must_use]
pub fn effective_rate(base_rate: Decimal, month_index: u32, standard_term_months: u32) -> Decimal {
    if month_index > standard_term_months {
        base_rate * Decimal::TWO
    } else {
        base_rate
    }
}

/// One member the sweep could not accrue for.
#[derive(Debug)]
pub struct MemberFault {
    /// The affected member.
    pub member_id: MemberId,
    /// Why the member was skipped.
    pub error: AccrualError,
}

/// Outcome of one accrual sweep.
#[derive(Debug, Default)]
pub struct AccrualRunReport {
    /// Members with open loans considered by the sweep.
    pub members_swept: usize,
    /// Interest charges posted across all members.
    pub charges_posted: usize,
    /// Version races retried within the sweep.
    pub conflicts_retried: usize,
    /// Members skipped with an error.
    pub faults: Vec<MemberFault>,
}

impl AccrualRunReport {
    /// Returns true if every member was processed without faults.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Outcome of accruing one member.
struct MemberOutcome {
    member_id: MemberId,
    result: Result<usize, AccrualError>,
    retries: u32,
}

/// Time-driven engine that posts monthly interest charges.
#[derive(Debug)]
pub struct AccrualEngine {
    ledger: Arc<LedgerStore>,
    config: AccrualConfig,
}

impl AccrualEngine {
    /// Creates an engine with default configuration.
    #[must_use]
    pub fn new(ledger: Arc<LedgerStore>) -> Self {
        Self::with_config(ledger, AccrualConfig::default())
    }

    /// Creates an engine with explicit configuration.
    #[must_use]
    pub fn with_config(ledger: Arc<LedgerStore>, config: AccrualConfig) -> Self {
        Self { ledger, config }
    }

    /// Runs one accrual sweep as of the given date.
    ///
    /// Safe to re-invoke at any time, including after a crash mid-run:
    /// members already charged through `today` are no-ops. Work is
    /// parallel across members and serialized per member.
    pub fn run(&self, settings: &Settings, today: NaiveDate) -> AccrualRunReport {
        let members = self.ledger.members_with_open_loans();
        let members_swept = members.len();

        let outcomes: Vec<MemberOutcome> = if self.config.parallel {
            members
                .into_par_iter()
                .map(|member_id| self.accrue_member(member_id, settings, today))
                .collect()
        } else {
            members
                .into_iter()
                .map(|member_id| self.accrue_member(member_id, settings, today))
                .collect()
        };

        let mut report = AccrualRunReport {
            members_swept,
            ..AccrualRunReport::default()
        };
        for outcome in outcomes {
            report.conflicts_retried += outcome.retries as usize;
            match outcome.result {
                Ok(posted) => report.charges_posted += posted,
                Err(error) => {
                    tracing::warn!(
                        member_id = %outcome.member_id,
                        code = error.error_code(),
                        %error,
                        "accrual skipped member"
                    );
                    report.faults.push(MemberFault {
                        member_id: outcome.member_id,
                        error,
                    });
                }
            }
        }
        tracing::info!(
            members_swept = report.members_swept,
            charges_posted = report.charges_posted,
            faults = report.faults.len(),
            "accrual sweep finished"
        );
        report
    }

    /// Accrues one member, retrying bounded times on version races.
    fn accrue_member(
        &self,
        member_id: MemberId,
        settings: &Settings,
        today: NaiveDate,
    ) -> MemberOutcome {
        let mut retries = 0;
        loop {
            match self.try_accrue(member_id, settings, today) {
                Err(error) if error.class().is_retryable() => {
                    if retries >= self.config.max_retries {
                        return MemberOutcome {
                            member_id,
                            result: Err(AccrualError::RetriesExhausted {
                                member_id,
                                attempts: retries + 1,
                            }),
                            retries,
                        };
                    }
                    retries += 1;
                }
                result => {
                    return MemberOutcome {
                        member_id,
                        result,
                        retries,
                    }
                }
            }
        }
    }

    /// One accrual attempt for one member.
    fn try_accrue(
        &self,
        member_id: MemberId,
        settings: &Settings,
        today: NaiveDate,
    ) -> Result<usize, AccrualError> {
        let snapshot = self.ledger.snapshot(member_id)?;
        if snapshot.balances.loan <= Decimal::ZERO {
            // Repaid since the sweep listed this member.
            return Ok(0);
        }
        let Some(loan) = snapshot.member.loan else {
            return Err(AccrualError::MissingLoanTerms(member_id));
        };

        let anchor = loan.start_date;
        let months_charged = months_between(anchor, loan.last_interest_calculation_date);
        let months_due = months_between(anchor, today);
        if months_due <= months_charged {
            return Ok(0);
        }

        let mut version = snapshot.version;
        let mut posted = 0;
        for month_index in (months_charged + 1)..=months_due {
            let rate = effective_rate(
                loan.monthly_rate,
                month_index,
                settings.standard_loan_term_months,
            );
            let charge = round_minor_unit(snapshot.balances.loan * rate / Decimal::ONE_HUNDRED);
            if charge.is_zero() {
                // A balance too small to bear a chargeable amount; the
                // watermark stays put and the month stays covered by
                // the next nonzero posting.
                continue;
            }
            let watermark = add_months_clamped(anchor, month_index);
            self.ledger
                .post_interest_charge(member_id, charge, today, watermark, version)?;
            version += 1;
            posted += 1;
        }
        Ok(posted)
    }
}
