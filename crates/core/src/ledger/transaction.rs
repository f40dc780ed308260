//! Ledger transaction domain types.
//!
//! Every balance movement in the system is one of the closed set of
//! [`TransactionKind`]s below. A kind names both the balance it touches
//! and the direction it moves it, so the fold that produces balances is
//! derivable from the record alone.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sacco_shared::types::{MemberId, TransactionId, UserId};
use serde::{Deserialize, Serialize};

/// The five per-member balances tracked by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceKind {
    /// Share capital.
    Shares,
    /// Ordinary savings.
    Savings,
    /// Outstanding loan principal.
    Loan,
    /// Accrued, unpaid interest.
    Interest,
    /// Society dues paid to date.
    Dues,
}

impl BalanceKind {
    /// Returns the string representation of the balance kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Shares => "shares",
            Self::Savings => "savings",
            Self::Loan => "loan",
            Self::Interest => "interest",
            Self::Dues => "dues",
        }
    }
}

impl std::fmt::Display for BalanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Purchase of share capital.
    SharesDeposit,
    /// Withdrawal of share capital.
    SharesWithdrawal,
    /// Savings deposit.
    SavingsDeposit,
    /// Savings withdrawal.
    SavingsWithdrawal,
    /// Loan principal paid out to the member.
    LoanDisbursement,
    /// Repayment against loan principal.
    LoanPayment,
    /// Monthly interest charged on an open loan.
    InterestCharge,
    /// Payment against accrued interest.
    InterestPayment,
    /// Society dues payment.
    DuesPayment,
    /// Zero-amount audit marker for a profile edit.
    ProfileUpdate,
}

impl TransactionKind {
    /// The balance this entry kind folds into, if any.
    #[must_use]
    pub const fn affected_balance(&self) -> Option<BalanceKind> {
        match self {
            Self::SharesDeposit | Self::SharesWithdrawal => Some(BalanceKind::Shares),
            Self::SavingsDeposit | Self::SavingsWithdrawal => Some(BalanceKind::Savings),
            Self::LoanDisbursement | Self::LoanPayment => Some(BalanceKind::Loan),
            Self::InterestCharge | Self::InterestPayment => Some(BalanceKind::Interest),
            Self::DuesPayment => Some(BalanceKind::Dues),
            Self::ProfileUpdate => None,
        }
    }

    /// Returns true if this kind increases its balance.
    #[must_use]
    pub const fn is_increase(&self) -> bool {
        matches!(
            self,
            Self::SharesDeposit
                | Self::SavingsDeposit
                | Self::LoanDisbursement
                | Self::InterestCharge
                | Self::DuesPayment
        )
    }

    /// Returns true if this kind moves money at all.
    #[must_use]
    pub const fn moves_money(&self) -> bool {
        !matches!(self, Self::ProfileUpdate)
    }

    /// The signed contribution of an entry of this kind to its balance.
    #[must_use]
    pub fn signed_amount(&self, amount: Decimal) -> Decimal {
        if self.is_increase() { amount } else { -amount }
    }

    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SharesDeposit => "shares_deposit",
            Self::SharesWithdrawal => "shares_withdrawal",
            Self::SavingsDeposit => "savings_deposit",
            Self::SavingsWithdrawal => "savings_withdrawal",
            Self::LoanDisbursement => "loan_disbursement",
            Self::LoanPayment => "loan_payment",
            Self::InterestCharge => "interest_charge",
            Self::InterestPayment => "interest_payment",
            Self::DuesPayment => "dues_payment",
            Self::ProfileUpdate => "profile_update",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable ledger entry.
///
/// Entries are appended, never updated or deleted, and are totally
/// ordered per member by `(date, seq)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// The member whose ledger this entry belongs to.
    pub member_id: MemberId,
    /// Entry classification.
    pub kind: TransactionKind,
    /// Unsigned amount moved; zero only for profile-update markers.
    pub amount: Decimal,
    /// Posting date.
    pub date: NaiveDate,
    /// Per-member insertion sequence, starting at 1.
    pub seq: u64,
    /// Snapshot of the affected balance immediately after this entry.
    pub balance_after: Decimal,
    /// Optional external reference, unique per member and kind.
    pub reference_number: Option<String>,
    /// The acting user who performed the operation, when identified.
    pub processed_by: Option<UserId>,
}

/// Input for appending a money-moving ledger entry.
#[derive(Debug, Clone)]
pub struct AppendInput {
    /// The member whose ledger to append to.
    pub member_id: MemberId,
    /// Entry classification.
    pub kind: TransactionKind,
    /// Unsigned amount to move.
    pub amount: Decimal,
    /// Posting date.
    pub date: NaiveDate,
    /// Optional external reference, unique per member and kind.
    pub reference_number: Option<String>,
    /// The acting user performing the operation, when identified.
    pub processed_by: Option<UserId>,
}
