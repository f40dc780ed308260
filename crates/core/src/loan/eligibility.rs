//! Loan eligibility rules.
//!
//! A pure rules engine: no store access, no side effects. All failing
//! rules are reported together so the caller can present the member a
//! complete explanation rather than the first failure found.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sacco_shared::types::LoanApplicationId;
use serde::{Deserialize, Serialize};

use crate::ledger::BalanceSet;
use crate::member::{Member, MemberStatus};
use crate::settings::Settings;

/// A single failed eligibility rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum IneligibilityReason {
    /// The member has not been in the society long enough.
    MembershipTooRecent {
        /// Whole months of membership at evaluation time.
        age_months: u32,
        /// Required months from settings.
        required_months: u32,
    },
    /// The requested amount exceeds the collateral-based cap.
    AmountExceedsCap {
        /// The requested principal.
        requested: Decimal,
        /// The maximum allowed: ratio x (shares + savings).
        cap: Decimal,
    },
    /// The member is not active.
    MemberNotActive {
        /// The member's current status.
        status: MemberStatus,
    },
    /// The member still owes on an earlier loan.
    OutstandingLoan {
        /// The remaining loan balance.
        balance: Decimal,
    },
    /// Another loan workflow is already in flight.
    ApplicationInFlight {
        /// The competing application.
        application_id: LoanApplicationId,
    },
}

impl std::fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MembershipTooRecent {
                age_months,
                required_months,
            } => write!(
                f,
                "membership age {age_months} months is below the required {required_months}"
            ),
            Self::AmountExceedsCap { requested, cap } => {
                write!(f, "requested {requested} exceeds the cap of {cap}")
            }
            Self::MemberNotActive { status } => {
                write!(f, "member status is {status}, not active")
            }
            Self::OutstandingLoan { balance } => {
                write!(f, "an earlier loan still has {balance} outstanding")
            }
            Self::ApplicationInFlight { application_id } => {
                write!(f, "loan application {application_id} is already in flight")
            }
        }
    }
}

/// The outcome of an eligibility evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityReport {
    /// True when every rule passed.
    pub eligible: bool,
    /// Every rule that failed, in evaluation order.
    pub reasons: Vec<IneligibilityReason>,
}

/// Evaluates whether a member may take the requested loan.
///
/// The admin override waives only the membership-age rule; every other
/// rule applies regardless.
#[must_use]
pub fn evaluate(
    member: &Member,
    balances: &BalanceSet,
    settings: &Settings,
    requested_amount: Decimal,
    in_flight: Option<LoanApplicationId>,
    as_of: NaiveDate,
) -> EligibilityReport {
    let mut reasons = Vec::new();

    let age_months = member.membership_age_months(as_of);
    if member.loan_eligibility_override.is_none()
        && age_months < settings.new_member_loan_eligibility_months
    {
        reasons.push(IneligibilityReason::MembershipTooRecent {
            age_months,
            required_months: settings.new_member_loan_eligibility_months,
        });
    }

    let cap = settings.loan_to_shares_savings_ratio * balances.collateral();
    if requested_amount > cap {
        reasons.push(IneligibilityReason::AmountExceedsCap {
            requested: requested_amount,
            cap,
        });
    }

    if !member.is_active() {
        reasons.push(IneligibilityReason::MemberNotActive {
            status: member.status,
        });
    }

    if balances.loan > Decimal::ZERO {
        reasons.push(IneligibilityReason::OutstandingLoan {
            balance: balances.loan,
        });
    }

    if let Some(application_id) = in_flight {
        reasons.push(IneligibilityReason::ApplicationInFlight { application_id });
    }

    EligibilityReport {
        eligible: reasons.is_empty(),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use sacco_shared::types::{MemberId, SocietyId, UserId};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn settings() -> Settings {
        Settings {
            loan_interest_rate: dec!(1.5),
            standard_loan_term_months: 12,
            new_member_loan_eligibility_months: 6,
            loan_to_shares_savings_ratio: dec!(2),
            last_updated: Utc::now(),
            updated_by: UserId::new(),
        }
    }

    fn member(joined: NaiveDate) -> Member {
        Member {
            id: MemberId::new(),
            society_id: SocietyId::new(),
            member_number: 1,
            full_name: "Tunde Alabi".to_string(),
            status: MemberStatus::Active,
            date_joined: joined,
            loan: None,
            loan_eligibility_override: None,
        }
    }

    fn balances(shares: Decimal, savings: Decimal) -> BalanceSet {
        BalanceSet {
            shares,
            savings,
            ..BalanceSet::zero()
        }
    }

    #[test]
    fn new_member_is_ineligible_until_the_window_passes() {
        // Joined 3 months ago with a 6-month window.
        let member = member(d(2025, 3, 1));
        let report = evaluate(
            &member,
            &balances(dec!(100000), dec!(100000)),
            &settings(),
            dec!(50000),
            None,
            d(2025, 6, 1),
        );
        assert!(!report.eligible);
        assert_eq!(
            report.reasons,
            vec![IneligibilityReason::MembershipTooRecent {
                age_months: 3,
                required_months: 6,
            }]
        );
    }

    #[test]
    fn override_waives_only_the_age_rule() {
        let mut member = member(d(2025, 3, 1));
        member.loan_eligibility_override = Some(crate::member::OverrideGrant {
            granted_by: UserId::new(),
            reason: "Transfer from sister society".to_string(),
            granted_at: Utc::now(),
        });
        let report = evaluate(
            &member,
            &balances(dec!(25000), dec!(25000)),
            &settings(),
            // Above the 100,000 cap: override must not waive this.
            dec!(200000),
            None,
            d(2025, 6, 1),
        );
        assert!(!report.eligible);
        assert_eq!(
            report.reasons,
            vec![IneligibilityReason::AmountExceedsCap {
                requested: dec!(200000),
                cap: dec!(100000),
            }]
        );
    }

    #[test]
    fn cap_is_ratio_times_shares_plus_savings() {
        let member = member(d(2024, 1, 1));
        // 2 x (30,000 + 20,000) = 100,000 cap.
        let report = evaluate(
            &member,
            &balances(dec!(30000), dec!(20000)),
            &settings(),
            dec!(100000),
            None,
            d(2025, 6, 1),
        );
        assert!(report.eligible);

        let report = evaluate(
            &member,
            &balances(dec!(30000), dec!(20000)),
            &settings(),
            dec!(100000.01),
            None,
            d(2025, 6, 1),
        );
        assert!(!report.eligible);
    }

    #[test]
    fn all_failing_rules_are_reported_together() {
        let mut member = member(d(2025, 5, 1));
        member.status = MemberStatus::Suspended;
        let mut balance_set = balances(dec!(10000), dec!(15000));
        balance_set.loan = dec!(40000);
        let in_flight = LoanApplicationId::new();

        let report = evaluate(
            &member,
            &balance_set,
            &settings(),
            dec!(200000),
            Some(in_flight),
            d(2025, 6, 1),
        );

        assert!(!report.eligible);
        assert_eq!(report.reasons.len(), 5);
        assert!(matches!(
            report.reasons[0],
            IneligibilityReason::MembershipTooRecent { .. }
        ));
        assert!(matches!(
            report.reasons[1],
            IneligibilityReason::AmountExceedsCap { .. }
        ));
        assert!(matches!(
            report.reasons[2],
            IneligibilityReason::MemberNotActive { .. }
        ));
        assert!(matches!(
            report.reasons[3],
            IneligibilityReason::OutstandingLoan { .. }
        ));
        assert!(matches!(
            report.reasons[4],
            IneligibilityReason::ApplicationInFlight { .. }
        ));
    }

    #[test]
    fn reasons_render_for_presentation() {
        let reason = IneligibilityReason::AmountExceedsCap {
            requested: dec!(200000),
            cap: dec!(100000),
        };
        assert_eq!(
            reason.to_string(),
            "requested 200000 exceeds the cap of 100000"
        );
    }

    #[test]
    fn evaluation_has_no_side_effects() {
        let member = member(d(2024, 1, 1));
        let balance_set = balances(dec!(50000), dec!(50000));
        let before = balance_set;
        let _ = evaluate(
            &member,
            &balance_set,
            &settings(),
            dec!(10000),
            None,
            d(2025, 6, 1),
        );
        assert_eq!(balance_set, before);
    }
}
