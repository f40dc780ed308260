//! Append-only ledger store.
//!
//! Append is the only mutation primitive; there is no update or delete.
//! Each member's account lives behind its own map entry, so every
//! read-balance-then-append unit executes under that member's exclusive
//! entry guard: atomic-or-nothing, serialized per member, concurrent
//! across members. Workflow callers that read before writing pass the
//! version they read; a mismatch at commit is a retryable conflict.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use sacco_shared::types::money::is_valid_amount;
use sacco_shared::types::{LoanApplicationId, MemberId, TransactionId, UserId};

use super::balance::{project, BalanceSet};
use super::error::LedgerError;
use super::transaction::{AppendInput, BalanceKind, Transaction, TransactionKind};
use crate::member::{LoanTerms, Member};

/// A consistent read of one member's account.
#[derive(Debug, Clone)]
pub struct MemberSnapshot {
    /// The member record.
    pub member: Member,
    /// Current balances.
    pub balances: BalanceSet,
    /// Version to pass back when committing a dependent write.
    pub version: u64,
}

/// One member's ledger and derived state, guarded by its map entry.
#[derive(Debug)]
struct MemberAccount {
    member: Member,
    transactions: Vec<Transaction>,
    balances: BalanceSet,
    used_references: HashSet<(TransactionKind, String)>,
    version: u64,
}

impl MemberAccount {
    fn latest_date(&self) -> Option<NaiveDate> {
        self.transactions.last().map(|tx| tx.date)
    }
}

/// Durable, append-only record of transactions per member; source of
/// truth for balances.
#[derive(Debug)]
pub struct LedgerStore {
    accounts: DashMap<MemberId, MemberAccount>,
    next_member_number: AtomicU32,
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            next_member_number: AtomicU32::new(1),
        }
    }

    /// Allocates the next sequential member number.
    pub(crate) fn allocate_member_number(&self) -> u32 {
        self.next_member_number.fetch_add(1, Ordering::Relaxed)
    }

    /// Registers a member with a zero-balance ledger head.
    ///
    /// The normal path here is membership-application approval; direct
    /// registration exists for bootstrapping existing societies.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MemberAlreadyRegistered` if the id exists.
    pub fn register_member(&self, member: Member) -> Result<MemberId, LedgerError> {
        let member_id = member.id;
        match self.accounts.entry(member_id) {
            Entry::Occupied(_) => Err(LedgerError::MemberAlreadyRegistered(member_id)),
            Entry::Vacant(slot) => {
                slot.insert(MemberAccount {
                    member,
                    transactions: Vec::new(),
                    balances: BalanceSet::zero(),
                    used_references: HashSet::new(),
                    version: 0,
                });
                tracing::debug!(%member_id, "member registered");
                Ok(member_id)
            }
        }
    }

    /// Appends a ledger entry and updates the member's balances
    /// atomically.
    ///
    /// # Errors
    ///
    /// Validation errors (`InvalidAmount`, `DuplicateReference`,
    /// `BackdatedEntry`) and invariant violations
    /// (`InsufficientBalance`) leave the ledger unchanged.
    /// `VersionConflict` is returned when `expected_version` no longer
    /// matches and is safe to retry.
    pub fn append(
        &self,
        input: &AppendInput,
        expected_version: Option<u64>,
    ) -> Result<TransactionId, LedgerError> {
        Self::validate_amount(input.kind, input.amount)?;
        let mut account = self
            .accounts
            .get_mut(&input.member_id)
            .ok_or(LedgerError::MemberNotFound(input.member_id))?;
        Self::check_version(&account, input.member_id, expected_version)?;
        Self::append_locked(
            &mut account,
            input.member_id,
            input.kind,
            input.amount,
            input.date,
            input.reference_number.clone(),
            input.processed_by,
        )
    }

    /// Posts a loan disbursement and freezes the loan terms on the
    /// member record, as one atomic unit.
    ///
    /// The application id becomes the entry's reference number, so a
    /// second disbursement of the same application fails with
    /// `DuplicateReference` even across retries.
    pub(crate) fn post_disbursement(
        &self,
        member_id: MemberId,
        application_id: LoanApplicationId,
        amount: Decimal,
        terms: LoanTerms,
        date: NaiveDate,
        processed_by: UserId,
        expected_version: Option<u64>,
    ) -> Result<TransactionId, LedgerError> {
        Self::validate_amount(TransactionKind::LoanDisbursement, amount)?;
        let mut account = self
            .accounts
            .get_mut(&member_id)
            .ok_or(LedgerError::MemberNotFound(member_id))?;
        Self::check_version(&account, member_id, expected_version)?;
        if account.balances.loan > Decimal::ZERO {
            return Err(LedgerError::OpenLoanExists(member_id));
        }
        let id = Self::append_locked(
            &mut account,
            member_id,
            TransactionKind::LoanDisbursement,
            amount,
            date,
            Some(application_id.to_string()),
            Some(processed_by),
        )?;
        account.member.loan = Some(terms);
        Ok(id)
    }

    /// Posts one monthly interest charge and advances the accrual
    /// watermark, as one atomic unit.
    ///
    /// The entry is dated on the posting date; the period it covers is
    /// identified by the watermark, which is what makes re-runs no-ops.
    pub(crate) fn post_interest_charge(
        &self,
        member_id: MemberId,
        amount: Decimal,
        date: NaiveDate,
        new_watermark: NaiveDate,
        expected_version: u64,
    ) -> Result<TransactionId, LedgerError> {
        Self::validate_amount(TransactionKind::InterestCharge, amount)?;
        let mut account = self
            .accounts
            .get_mut(&member_id)
            .ok_or(LedgerError::MemberNotFound(member_id))?;
        Self::check_version(&account, member_id, Some(expected_version))?;
        if account.member.loan.is_none() {
            return Err(LedgerError::MissingLoanTerms(member_id));
        }
        let id = Self::append_locked(
            &mut account,
            member_id,
            TransactionKind::InterestCharge,
            amount,
            date,
            None,
            None,
        )?;
        if let Some(loan) = account.member.loan.as_mut() {
            loan.last_interest_calculation_date = new_watermark;
        }
        Ok(id)
    }

    /// Appends a zero-amount profile-update marker and applies the edit
    /// to the member record atomically.
    pub(crate) fn record_profile_update(
        &self,
        member_id: MemberId,
        new_full_name: Option<String>,
        date: NaiveDate,
        processed_by: UserId,
    ) -> Result<TransactionId, LedgerError> {
        let mut account = self
            .accounts
            .get_mut(&member_id)
            .ok_or(LedgerError::MemberNotFound(member_id))?;
        let id = Self::append_locked(
            &mut account,
            member_id,
            TransactionKind::ProfileUpdate,
            Decimal::ZERO,
            date,
            None,
            Some(processed_by),
        )?;
        if let Some(name) = new_full_name {
            account.member.full_name = name;
        }
        Ok(id)
    }

    /// Applies a non-ledger member mutation (status change, override
    /// grant) under the member's entry guard, bumping the version.
    pub(crate) fn update_member(
        &self,
        member_id: MemberId,
        update: impl FnOnce(&mut Member),
    ) -> Result<(), LedgerError> {
        let mut account = self
            .accounts
            .get_mut(&member_id)
            .ok_or(LedgerError::MemberNotFound(member_id))?;
        update(&mut account.member);
        account.version += 1;
        Ok(())
    }

    /// Returns a consistent snapshot of a member's account.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MemberNotFound` for unknown members.
    pub fn snapshot(&self, member_id: MemberId) -> Result<MemberSnapshot, LedgerError> {
        let account = self
            .accounts
            .get(&member_id)
            .ok_or(LedgerError::MemberNotFound(member_id))?;
        Ok(MemberSnapshot {
            member: account.member.clone(),
            balances: account.balances,
            version: account.version,
        })
    }

    /// Returns a member's current balances.
    pub fn current_balances(&self, member_id: MemberId) -> Result<BalanceSet, LedgerError> {
        Ok(self.snapshot(member_id)?.balances)
    }

    /// Returns a member's full transaction history in ledger order.
    pub fn transactions_for(&self, member_id: MemberId) -> Result<Vec<Transaction>, LedgerError> {
        let account = self
            .accounts
            .get(&member_id)
            .ok_or(LedgerError::MemberNotFound(member_id))?;
        Ok(account.transactions.clone())
    }

    /// Returns a member's transactions within an inclusive date range,
    /// in ledger order. `None` bounds are open.
    pub fn statement(
        &self,
        member_id: MemberId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let account = self
            .accounts
            .get(&member_id)
            .ok_or(LedgerError::MemberNotFound(member_id))?;
        Ok(account
            .transactions
            .iter()
            .filter(|tx| from.is_none_or(|f| tx.date >= f) && to.is_none_or(|t| tx.date <= t))
            .cloned()
            .collect())
    }

    /// Reconciles a member's cached balances against a full replay.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::BalanceMismatch` naming the diverging
    /// balance, or `LedgerError::SnapshotChainBroken` if a stored
    /// snapshot disagrees with the fold.
    pub fn verify(&self, member_id: MemberId) -> Result<(), LedgerError> {
        let account = self
            .accounts
            .get(&member_id)
            .ok_or(LedgerError::MemberNotFound(member_id))?;
        let replayed = project(member_id, &account.transactions)?;
        for kind in [
            BalanceKind::Shares,
            BalanceKind::Savings,
            BalanceKind::Loan,
            BalanceKind::Interest,
            BalanceKind::Dues,
        ] {
            let cached = account.balances.get(kind);
            let fresh = replayed.get(kind);
            if cached != fresh {
                return Err(LedgerError::BalanceMismatch {
                    member_id,
                    kind,
                    cached,
                    replayed: fresh,
                });
            }
        }
        Ok(())
    }

    /// Returns the ids of all members with outstanding loan balance.
    #[must_use]
    pub fn members_with_open_loans(&self) -> Vec<MemberId> {
        self.accounts
            .iter()
            .filter(|entry| entry.balances.loan > Decimal::ZERO)
            .map(|entry| *entry.key())
            .collect()
    }

    /// Number of registered members.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.accounts.len()
    }

    fn validate_amount(kind: TransactionKind, amount: Decimal) -> Result<(), LedgerError> {
        let valid = if kind.moves_money() {
            is_valid_amount(amount)
        } else {
            amount == Decimal::ZERO
        };
        if valid {
            Ok(())
        } else {
            Err(LedgerError::InvalidAmount { kind, amount })
        }
    }

    fn check_version(
        account: &MemberAccount,
        member_id: MemberId,
        expected: Option<u64>,
    ) -> Result<(), LedgerError> {
        match expected {
            Some(expected) if expected != account.version => Err(LedgerError::VersionConflict {
                member_id,
                expected,
                actual: account.version,
            }),
            _ => Ok(()),
        }
    }

    fn append_locked(
        account: &mut MemberAccount,
        member_id: MemberId,
        kind: TransactionKind,
        amount: Decimal,
        date: NaiveDate,
        reference_number: Option<String>,
        processed_by: Option<UserId>,
    ) -> Result<TransactionId, LedgerError> {
        if let Some(latest) = account.latest_date()
            && date < latest
        {
            return Err(LedgerError::BackdatedEntry {
                latest,
                attempted: date,
            });
        }
        if let Some(reference) = &reference_number
            && account.used_references.contains(&(kind, reference.clone()))
        {
            return Err(LedgerError::DuplicateReference {
                reference: reference.clone(),
            });
        }

        let balance_after = account.balances.apply(kind, amount)?;
        let id = TransactionId::new();
        let seq = account.transactions.len() as u64 + 1;
        account.transactions.push(Transaction {
            id,
            member_id,
            kind,
            amount,
            date,
            seq,
            balance_after,
            reference_number: reference_number.clone(),
            processed_by,
        });
        if let Some(reference) = reference_number {
            account.used_references.insert((kind, reference));
        }
        account.version += 1;
        tracing::debug!(%member_id, %kind, %amount, seq, "ledger entry appended");
        Ok(id)
    }
}
