//! Property-based tests for the accrual engine.
//!
//! - Idempotency: repeated runs for the same period never double-post.
//! - Reconciliation: accrual output always survives ledger replay.
//! - Escalation boundary: the doubled rate starts exactly one month
//!   after the standard term ends.

use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use sacco_shared::config::AccrualConfig;
use sacco_shared::types::{LoanApplicationId, MemberId, SocietyId, UserId};

use super::engine::{effective_rate, AccrualEngine};
use crate::ledger::{LedgerStore, TransactionKind};
use crate::member::{LoanTerms, Member, MemberStatus};
use crate::period::add_months_clamped;
use crate::settings::Settings;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn settings(standard_term: u32) -> Settings {
    Settings {
        loan_interest_rate: Decimal::new(15, 1),
        standard_loan_term_months: standard_term,
        new_member_loan_eligibility_months: 6,
        loan_to_shares_savings_ratio: Decimal::TWO,
        last_updated: chrono::Utc::now(),
        updated_by: UserId::new(),
    }
}

fn store_with_loan(principal: Decimal, start: NaiveDate) -> (Arc<LedgerStore>, MemberId) {
    let ledger = Arc::new(LedgerStore::new());
    let member = Member {
        id: MemberId::new(),
        society_id: SocietyId::new(),
        member_number: 1,
        full_name: "Borrower".to_string(),
        status: MemberStatus::Active,
        date_joined: d(2022, 1, 1),
        loan: None,
        loan_eligibility_override: None,
    };
    let member_id = ledger.register_member(member).unwrap();
    let terms = LoanTerms {
        start_date: start,
        duration_months: 12,
        monthly_rate: Decimal::new(15, 1),
        monthly_payment: Decimal::ZERO,
        last_interest_calculation_date: start,
    };
    ledger
        .post_disbursement(
            member_id,
            LoanApplicationId::new(),
            principal,
            terms,
            start,
            UserId::new(),
            None,
        )
        .unwrap();
    (ledger, member_id)
}

fn engine(ledger: &Arc<LedgerStore>) -> AccrualEngine {
    AccrualEngine::with_config(
        Arc::clone(ledger),
        AccrualConfig {
            max_retries: 3,
            parallel: false,
        },
    )
}

/// Strategy for loan principals between 1,000.00 and 500,000.00.
fn principal_strategy() -> impl Strategy<Value = Decimal> {
    (100_000i64..50_000_000i64).prop_map(|minor| Decimal::new(minor, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Running the engine N extra times at the same instant posts
    /// exactly the charges of the first run and nothing more.
    #[test]
    fn prop_accrual_is_idempotent(
        principal in principal_strategy(),
        elapsed_months in 1u32..24,
        extra_runs in 1usize..4,
    ) {
        let start = d(2024, 3, 10);
        let (ledger, member_id) = store_with_loan(principal, start);
        let engine = engine(&ledger);
        let cfg = settings(12);
        let today = add_months_clamped(start, elapsed_months);

        let first = engine.run(&cfg, today);
        prop_assert!(first.is_clean());
        prop_assert_eq!(first.charges_posted, elapsed_months as usize);

        for _ in 0..extra_runs {
            let rerun = engine.run(&cfg, today);
            prop_assert!(rerun.is_clean());
            prop_assert_eq!(rerun.charges_posted, 0);
        }

        let charges = ledger
            .transactions_for(member_id)
            .unwrap()
            .into_iter()
            .filter(|tx| tx.kind == TransactionKind::InterestCharge)
            .count();
        prop_assert_eq!(charges, elapsed_months as usize);
    }

    /// Whatever the engine posts, the cached balances still equal a
    /// from-scratch ledger replay.
    #[test]
    fn prop_accrual_output_survives_replay(
        principal in principal_strategy(),
        elapsed_months in 0u32..30,
    ) {
        let start = d(2024, 1, 31);
        let (ledger, member_id) = store_with_loan(principal, start);
        let today = add_months_clamped(start, elapsed_months);

        engine(&ledger).run(&settings(12), today);
        prop_assert!(ledger.verify(member_id).is_ok());
    }

    /// Interest accrues in two flat bands: the base rate through the
    /// standard term, double thereafter, regardless of when the engine
    /// happens to run.
    #[test]
    fn prop_escalation_boundary_is_exact(
        standard_term in 1u32..24,
        months_past_term in 1u32..12,
    ) {
        let start = d(2023, 6, 15);
        let principal = Decimal::new(10_000_000, 2); // 100,000.00
        let (ledger, member_id) = store_with_loan(principal, start);
        let cfg = settings(standard_term);
        let total_months = standard_term + months_past_term;

        engine(&ledger).run(&cfg, add_months_clamped(start, total_months));

        let charges: Vec<Decimal> = ledger
            .transactions_for(member_id)
            .unwrap()
            .into_iter()
            .filter(|tx| tx.kind == TransactionKind::InterestCharge)
            .map(|tx| tx.amount)
            .collect();
        prop_assert_eq!(charges.len(), total_months as usize);

        let base_charge = Decimal::new(150_000, 2); // 1,500.00
        for (index, charge) in charges.iter().enumerate() {
            let month = index as u32 + 1;
            let expected = if month > standard_term {
                base_charge * Decimal::TWO
            } else {
                base_charge
            };
            prop_assert_eq!(*charge, expected, "month {}", month);
        }
    }

    /// The effective-rate rule itself: base within the term, exactly
    /// double after it, for any rate.
    #[test]
    fn prop_effective_rate_bands(
        rate_minor in 1i64..1_000,
        term in 1u32..60,
        month in 1u32..120,
    ) {
        let base = Decimal::new(rate_minor, 2);
        let effective = effective_rate(base, month, term);
        if month > term {
            prop_assert_eq!(effective, base * Decimal::TWO);
        } else {
            prop_assert_eq!(effective, base);
        }
    }
}
