//! Property-based tests for the ledger store.
//!
//! - Replay equivalence: balances maintained incrementally always equal
//!   the fold recomputed from history alone.
//! - Snapshot chain consistency: every stored `balance_after` equals the
//!   running balance of its kind.
//! - Failed appends leave the ledger untouched.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use sacco_shared::types::{MemberId, SocietyId};

use super::balance::project;
use super::store::LedgerStore;
use super::transaction::{AppendInput, TransactionKind};
use crate::member::{Member, MemberStatus};

/// Strategy for money-moving entry kinds.
fn monetary_kind() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![
        Just(TransactionKind::SharesDeposit),
        Just(TransactionKind::SharesWithdrawal),
        Just(TransactionKind::SavingsDeposit),
        Just(TransactionKind::SavingsWithdrawal),
        Just(TransactionKind::LoanDisbursement),
        Just(TransactionKind::LoanPayment),
        Just(TransactionKind::InterestCharge),
        Just(TransactionKind::InterestPayment),
        Just(TransactionKind::DuesPayment),
    ]
}

/// Strategy for positive minor-unit amounts (0.01 to 10,000.00).
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|minor| Decimal::new(minor, 2))
}

fn attempts_strategy(max_len: usize) -> impl Strategy<Value = Vec<(TransactionKind, Decimal)>> {
    prop::collection::vec((monetary_kind(), amount_strategy()), 1..=max_len)
}

fn seeded_store() -> (LedgerStore, MemberId) {
    let store = LedgerStore::new();
    let member = Member {
        id: MemberId::new(),
        society_id: SocietyId::new(),
        member_number: 1,
        full_name: "Property Holder".to_string(),
        status: MemberStatus::Active,
        date_joined: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        loan: None,
        loan_eligibility_override: None,
    };
    let id = store.register_member(member).unwrap();
    (store, id)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any sequence of append attempts, the cached balances always
    /// equal a from-scratch replay, whether individual appends
    /// succeeded or were rejected.
    #[test]
    fn prop_replay_equals_incremental(attempts in attempts_strategy(30)) {
        let (store, id) = seeded_store();
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        for (kind, amount) in attempts {
            // Rejected appends (overdraws) are part of the property:
            // they must not disturb the fold.
            let _ = store.append(
                &AppendInput {
                    member_id: id,
                    kind,
                    amount,
                    date,
                    reference_number: None,
                    processed_by: None,
                },
                None,
            );
        }

        let cached = store.current_balances(id).unwrap();
        let replayed = project(id, &store.transactions_for(id).unwrap()).unwrap();
        prop_assert_eq!(cached, replayed);
        prop_assert!(store.verify(id).is_ok());
    }

    /// Balances never go negative, for any attempt sequence.
    #[test]
    fn prop_balances_never_negative(attempts in attempts_strategy(30)) {
        let (store, id) = seeded_store();
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        for (kind, amount) in attempts {
            let _ = store.append(
                &AppendInput {
                    member_id: id,
                    kind,
                    amount,
                    date,
                    reference_number: None,
                    processed_by: None,
                },
                None,
            );
        }

        let balances = store.current_balances(id).unwrap();
        prop_assert!(balances.shares >= Decimal::ZERO);
        prop_assert!(balances.savings >= Decimal::ZERO);
        prop_assert!(balances.loan >= Decimal::ZERO);
        prop_assert!(balances.interest >= Decimal::ZERO);
        prop_assert!(balances.dues >= Decimal::ZERO);
    }

    /// A rejected append leaves ledger length and balances unchanged.
    #[test]
    fn prop_failed_append_changes_nothing(amount in amount_strategy()) {
        let (store, id) = seeded_store();
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        // Withdrawal from an empty balance must fail.
        let before_len = store.transactions_for(id).unwrap().len();
        let before_balances = store.current_balances(id).unwrap();
        let result = store.append(
            &AppendInput {
                member_id: id,
                kind: TransactionKind::SavingsWithdrawal,
                amount,
                date,
                reference_number: None,
                processed_by: None,
            },
            None,
        );

        prop_assert!(result.is_err());
        prop_assert_eq!(store.transactions_for(id).unwrap().len(), before_len);
        prop_assert_eq!(store.current_balances(id).unwrap(), before_balances);
    }

    /// Sequence numbers are contiguous from 1 over successful appends.
    #[test]
    fn prop_sequence_contiguous(attempts in attempts_strategy(30)) {
        let (store, id) = seeded_store();
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        for (kind, amount) in attempts {
            let _ = store.append(
                &AppendInput {
                    member_id: id,
                    kind,
                    amount,
                    date,
                    reference_number: None,
                    processed_by: None,
                },
                None,
            );
        }

        let history = store.transactions_for(id).unwrap();
        for (index, tx) in history.iter().enumerate() {
            prop_assert_eq!(tx.seq, index as u64 + 1);
        }
    }
}
