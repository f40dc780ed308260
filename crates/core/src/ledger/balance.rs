//! Balance projection.
//!
//! Balances are the running fold of signed transaction amounts by kind,
//! in ledger order. The store keeps an incrementally maintained
//! [`BalanceSet`] per member as an optimization; [`project`] recomputes
//! the same fold from history alone so the cache can always be checked
//! against the ledger.

use rust_decimal::Decimal;
use sacco_shared::types::MemberId;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::transaction::{BalanceKind, Transaction, TransactionKind};

/// The five balances of a member at a point in the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSet {
    /// Share capital.
    pub shares: Decimal,
    /// Ordinary savings.
    pub savings: Decimal,
    /// Outstanding loan principal.
    pub loan: Decimal,
    /// Accrued, unpaid interest.
    pub interest: Decimal,
    /// Society dues paid to date.
    pub dues: Decimal,
}

impl BalanceSet {
    /// All-zero balances (a new member's ledger head).
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Returns the balance for a kind.
    #[must_use]
    pub const fn get(&self, kind: BalanceKind) -> Decimal {
        match kind {
            BalanceKind::Shares => self.shares,
            BalanceKind::Savings => self.savings,
            BalanceKind::Loan => self.loan,
            BalanceKind::Interest => self.interest,
            BalanceKind::Dues => self.dues,
        }
    }

    fn get_mut(&mut self, kind: BalanceKind) -> &mut Decimal {
        match kind {
            BalanceKind::Shares => &mut self.shares,
            BalanceKind::Savings => &mut self.savings,
            BalanceKind::Loan => &mut self.loan,
            BalanceKind::Interest => &mut self.interest,
            BalanceKind::Dues => &mut self.dues,
        }
    }

    /// Combined shares + savings, the collateral base for loan caps.
    #[must_use]
    pub fn collateral(&self) -> Decimal {
        self.shares + self.savings
    }

    /// Applies one entry to the set, returning the affected balance
    /// after the movement (zero for non-monetary markers).
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InsufficientBalance` if the movement would
    /// drive its balance negative; the set is unchanged on error.
    pub fn apply(
        &mut self,
        kind: TransactionKind,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        let Some(balance_kind) = kind.affected_balance() else {
            return Ok(Decimal::ZERO);
        };
        let current = self.get(balance_kind);
        let next = current + kind.signed_amount(amount);
        if next < Decimal::ZERO {
            return Err(LedgerError::InsufficientBalance {
                kind: balance_kind,
                balance: current,
                amount,
            });
        }
        *self.get_mut(balance_kind) = next;
        Ok(next)
    }
}

/// Replays a member's transactions from scratch.
///
/// Validates the `balance_after` snapshot chain while folding: every
/// stored snapshot must equal the running balance of its kind at that
/// point in the ledger.
///
/// # Errors
///
/// Returns `LedgerError::SnapshotChainBroken` on the first inconsistent
/// snapshot, or `LedgerError::InsufficientBalance` if history itself
/// would drive a balance negative (which an append should have made
/// impossible).
pub fn project(
    member_id: MemberId,
    transactions: &[Transaction],
) -> Result<BalanceSet, LedgerError> {
    let mut balances = BalanceSet::zero();
    for tx in transactions {
        let after = balances.apply(tx.kind, tx.amount)?;
        if after != tx.balance_after {
            return Err(LedgerError::SnapshotChainBroken {
                member_id,
                seq: tx.seq,
                stored: tx.balance_after,
                expected: after,
            });
        }
    }
    Ok(balances)
}
