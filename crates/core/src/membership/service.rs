//! Membership application workflow and member administration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sacco_shared::types::{MemberId, MembershipApplicationId, SocietyId};

use super::error::MembershipError;
use super::types::{ApplicationStatus, MembershipApplication};
use crate::identity::Actor;
use crate::ledger::LedgerStore;
use crate::member::{Member, MemberStatus, OverrideGrant};

/// Manages membership applications and admin operations on members.
///
/// Approval creates the member record and its zero-balance ledger head
/// as one unit; the application entry guard serializes concurrent
/// reviews of the same application.
#[derive(Debug)]
pub struct MembershipService {
    ledger: Arc<LedgerStore>,
    applications: DashMap<MembershipApplicationId, MembershipApplication>,
}

impl MembershipService {
    /// Creates a service backed by the given ledger store.
    #[must_use]
    pub fn new(ledger: Arc<LedgerStore>) -> Self {
        Self {
            ledger,
            applications: DashMap::new(),
        }
    }

    /// Submits a membership application.
    ///
    /// Only structural checks run here; guarantor status is rechecked
    /// at approval because it can change between submission and review.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank applicant name or
    /// non-distinct guarantors.
    pub fn submit(
        &self,
        society_id: SocietyId,
        applicant_name: &str,
        guarantor1: MemberId,
        guarantor2: MemberId,
        now: DateTime<Utc>,
    ) -> Result<MembershipApplicationId, MembershipError> {
        if applicant_name.trim().is_empty() {
            return Err(MembershipError::ApplicantNameRequired);
        }
        if guarantor1 == guarantor2 {
            return Err(MembershipError::GuarantorsNotDistinct);
        }

        let id = MembershipApplicationId::new();
        self.applications.insert(
            id,
            MembershipApplication {
                id,
                society_id,
                applicant_name: applicant_name.trim().to_string(),
                guarantor1,
                guarantor2,
                status: ApplicationStatus::Pending,
                submitted_at: now,
                reviewed_at: None,
                reviewed_by: None,
                review_notes: None,
                member_id: None,
            },
        );
        tracing::debug!(application_id = %id, "membership application submitted");
        Ok(id)
    }

    /// Returns an application by id.
    pub fn application(
        &self,
        id: MembershipApplicationId,
    ) -> Result<MembershipApplication, MembershipError> {
        self.applications
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or(MembershipError::ApplicationNotFound(id))
    }

    /// Approves a pending application, creating the member record and
    /// its zero-balance ledger head.
    ///
    /// Guarantors are validated now, not at submission: both must still
    /// be distinct, existing, active members of the target society.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admin actors, `InvalidTransition`
    /// when the application is already terminal, or a guarantor
    /// validation error. Nothing is written on failure.
    pub fn approve(
        &self,
        actor: &Actor,
        id: MembershipApplicationId,
        now: DateTime<Utc>,
    ) -> Result<MemberId, MembershipError> {
        if !actor.role.can_review_applications() {
            return Err(MembershipError::Forbidden(actor.role));
        }
        let mut application = self
            .applications
            .get_mut(&id)
            .ok_or(MembershipError::ApplicationNotFound(id))?;
        if application.status != ApplicationStatus::Pending {
            return Err(MembershipError::InvalidTransition {
                from: application.status,
                to: ApplicationStatus::Approved,
            });
        }

        self.check_guarantor(application.society_id, application.guarantor1)?;
        self.check_guarantor(application.society_id, application.guarantor2)?;

        let member = Member {
            id: MemberId::new(),
            society_id: application.society_id,
            member_number: self.ledger.allocate_member_number(),
            full_name: application.applicant_name.clone(),
            status: MemberStatus::Active,
            date_joined: now.date_naive(),
            loan: None,
            loan_eligibility_override: None,
        };
        let member_id = self.ledger.register_member(member)?;

        application.status = ApplicationStatus::Approved;
        application.reviewed_at = Some(now);
        application.reviewed_by = Some(actor.user_id);
        application.member_id = Some(member_id);
        tracing::info!(application_id = %id, %member_id, "membership application approved");
        Ok(member_id)
    }

    /// Rejects a pending application. Review notes are required.
    ///
    /// # Errors
    ///
    /// Returns `ReviewNotesRequired` for blank notes, `Forbidden` for
    /// non-admin actors, or `InvalidTransition` when already terminal.
    pub fn reject(
        &self,
        actor: &Actor,
        id: MembershipApplicationId,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<(), MembershipError> {
        if !actor.role.can_review_applications() {
            return Err(MembershipError::Forbidden(actor.role));
        }
        if notes.trim().is_empty() {
            return Err(MembershipError::ReviewNotesRequired);
        }
        let mut application = self
            .applications
            .get_mut(&id)
            .ok_or(MembershipError::ApplicationNotFound(id))?;
        if application.status != ApplicationStatus::Pending {
            return Err(MembershipError::InvalidTransition {
                from: application.status,
                to: ApplicationStatus::Rejected,
            });
        }

        application.status = ApplicationStatus::Rejected;
        application.reviewed_at = Some(now);
        application.reviewed_by = Some(actor.user_id);
        application.review_notes = Some(notes.trim().to_string());
        tracing::info!(application_id = %id, "membership application rejected");
        Ok(())
    }

    /// Changes a member's lifecycle status. Members are never deleted.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admin actors.
    pub fn set_member_status(
        &self,
        actor: &Actor,
        member_id: MemberId,
        status: MemberStatus,
    ) -> Result<(), MembershipError> {
        if !actor.role.can_administer_members() {
            return Err(MembershipError::Forbidden(actor.role));
        }
        self.ledger
            .update_member(member_id, |member| member.status = status)?;
        tracing::info!(%member_id, status = %status, "member status changed");
        Ok(())
    }

    /// Grants a loan-eligibility override with a recorded reason.
    ///
    /// # Errors
    ///
    /// Returns `OverrideReasonRequired` for a blank reason or
    /// `Forbidden` for non-admin actors.
    pub fn grant_loan_override(
        &self,
        actor: &Actor,
        member_id: MemberId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), MembershipError> {
        if !actor.role.can_administer_members() {
            return Err(MembershipError::Forbidden(actor.role));
        }
        if reason.trim().is_empty() {
            return Err(MembershipError::OverrideReasonRequired);
        }
        let grant = OverrideGrant {
            granted_by: actor.user_id,
            reason: reason.trim().to_string(),
            granted_at: now,
        };
        self.ledger
            .update_member(member_id, |member| {
                member.loan_eligibility_override = Some(grant);
            })?;
        tracing::info!(%member_id, "loan eligibility override granted");
        Ok(())
    }

    /// Renames a member, leaving a zero-amount audit entry in their
    /// ledger.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admin actors or a ledger error.
    pub fn update_member_name(
        &self,
        actor: &Actor,
        member_id: MemberId,
        full_name: &str,
        now: DateTime<Utc>,
    ) -> Result<(), MembershipError> {
        if !actor.role.can_administer_members() {
            return Err(MembershipError::Forbidden(actor.role));
        }
        if full_name.trim().is_empty() {
            return Err(MembershipError::ApplicantNameRequired);
        }
        self.ledger.record_profile_update(
            member_id,
            Some(full_name.trim().to_string()),
            now.date_naive(),
            actor.user_id,
        )?;
        Ok(())
    }

    fn check_guarantor(
        &self,
        society_id: SocietyId,
        guarantor: MemberId,
    ) -> Result<(), MembershipError> {
        let snapshot = self
            .ledger
            .snapshot(guarantor)
            .map_err(|_| MembershipError::GuarantorNotFound(guarantor))?;
        if snapshot.member.society_id != society_id {
            return Err(MembershipError::GuarantorSocietyMismatch(guarantor));
        }
        if !snapshot.member.is_active() {
            return Err(MembershipError::GuarantorNotActive(guarantor));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;
    use chrono::NaiveDate;
    use sacco_shared::types::UserId;

    fn admin() -> Actor {
        Actor::new(UserId::new(), Role::Admin)
    }

    fn seeded() -> (MembershipService, SocietyId, MemberId, MemberId) {
        let ledger = Arc::new(LedgerStore::new());
        let service = MembershipService::new(Arc::clone(&ledger));
        let society_id = SocietyId::new();
        let mut guarantors = Vec::new();
        for name in ["Chidi Okeke", "Amina Bello"] {
            let member = Member {
                id: MemberId::new(),
                society_id,
                member_number: ledger.allocate_member_number(),
                full_name: name.to_string(),
                status: MemberStatus::Active,
                date_joined: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
                loan: None,
                loan_eligibility_override: None,
            };
            guarantors.push(ledger.register_member(member).unwrap());
        }
        (service, society_id, guarantors[0], guarantors[1])
    }

    #[test]
    fn approval_creates_member_with_zero_balances() {
        let (service, society_id, g1, g2) = seeded();
        let id = service
            .submit(society_id, "Efe Dike", g1, g2, Utc::now())
            .unwrap();
        let member_id = service.approve(&admin(), id, Utc::now()).unwrap();

        let snapshot = service.ledger.snapshot(member_id).unwrap();
        assert!(snapshot.member.is_active());
        assert_eq!(snapshot.balances, crate::ledger::BalanceSet::zero());
        assert!(service.ledger.transactions_for(member_id).unwrap().is_empty());

        let application = service.application(id).unwrap();
        assert_eq!(application.status, ApplicationStatus::Approved);
        assert_eq!(application.member_id, Some(member_id));
        assert!(application.reviewed_at.is_some());
    }

    #[test]
    fn guarantors_must_be_distinct_at_submission() {
        let (service, society_id, g1, _) = seeded();
        let err = service
            .submit(society_id, "Efe Dike", g1, g1, Utc::now())
            .unwrap_err();
        assert!(matches!(err, MembershipError::GuarantorsNotDistinct));
    }

    #[test]
    fn guarantor_status_rechecked_at_approval() {
        let (service, society_id, g1, g2) = seeded();
        let id = service
            .submit(society_id, "Efe Dike", g1, g2, Utc::now())
            .unwrap();

        // Guarantor lapses between submission and review.
        service
            .set_member_status(&admin(), g2, MemberStatus::Suspended)
            .unwrap();

        let err = service.approve(&admin(), id, Utc::now()).unwrap_err();
        assert!(matches!(err, MembershipError::GuarantorNotActive(m) if m == g2));
        assert_eq!(
            service.application(id).unwrap().status,
            ApplicationStatus::Pending
        );
    }

    #[test]
    fn guarantor_from_another_society_rejected() {
        let (service, _, g1, g2) = seeded();
        let other_society = SocietyId::new();
        let id = service
            .submit(other_society, "Efe Dike", g1, g2, Utc::now())
            .unwrap();
        let err = service.approve(&admin(), id, Utc::now()).unwrap_err();
        assert!(matches!(err, MembershipError::GuarantorSocietyMismatch(_)));
    }

    #[test]
    fn unknown_guarantor_rejected_at_approval() {
        let (service, society_id, g1, _) = seeded();
        let ghost = MemberId::new();
        let id = service
            .submit(society_id, "Efe Dike", g1, ghost, Utc::now())
            .unwrap();
        let err = service.approve(&admin(), id, Utc::now()).unwrap_err();
        assert!(matches!(err, MembershipError::GuarantorNotFound(m) if m == ghost));
    }

    #[test]
    fn rejection_requires_notes_and_is_terminal() {
        let (service, society_id, g1, g2) = seeded();
        let id = service
            .submit(society_id, "Efe Dike", g1, g2, Utc::now())
            .unwrap();

        assert!(matches!(
            service.reject(&admin(), id, "   ", Utc::now()),
            Err(MembershipError::ReviewNotesRequired)
        ));

        service
            .reject(&admin(), id, "Incomplete documents", Utc::now())
            .unwrap();
        let application = service.application(id).unwrap();
        assert_eq!(application.status, ApplicationStatus::Rejected);
        assert_eq!(
            application.review_notes.as_deref(),
            Some("Incomplete documents")
        );

        // Terminal: cannot approve a rejected application.
        assert!(matches!(
            service.approve(&admin(), id, Utc::now()),
            Err(MembershipError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn members_cannot_review() {
        let (service, society_id, g1, g2) = seeded();
        let id = service
            .submit(society_id, "Efe Dike", g1, g2, Utc::now())
            .unwrap();
        let member_actor = Actor::new(UserId::new(), Role::Member);
        assert!(matches!(
            service.approve(&member_actor, id, Utc::now()),
            Err(MembershipError::Forbidden(Role::Member))
        ));
        assert!(matches!(
            service.reject(&member_actor, id, "notes", Utc::now()),
            Err(MembershipError::Forbidden(Role::Member))
        ));
    }

    #[test]
    fn override_grant_records_who_and_why() {
        let (service, _, g1, _) = seeded();
        let actor = admin();
        assert!(matches!(
            service.grant_loan_override(&actor, g1, "", Utc::now()),
            Err(MembershipError::OverrideReasonRequired)
        ));

        service
            .grant_loan_override(&actor, g1, "Long-standing transfer member", Utc::now())
            .unwrap();
        let grant = service
            .ledger
            .snapshot(g1)
            .unwrap()
            .member
            .loan_eligibility_override
            .unwrap();
        assert_eq!(grant.granted_by, actor.user_id);
        assert_eq!(grant.reason, "Long-standing transfer member");
    }

    #[test]
    fn rename_leaves_audit_entry() {
        let (service, _, g1, _) = seeded();
        service
            .update_member_name(&admin(), g1, "Chidi N. Okeke", Utc::now())
            .unwrap();

        let snapshot = service.ledger.snapshot(g1).unwrap();
        assert_eq!(snapshot.member.full_name, "Chidi N. Okeke");
        let history = service.ledger.transactions_for(g1).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, crate::ledger::TransactionKind::ProfileUpdate);
        assert_eq!(history[0].amount, rust_decimal::Decimal::ZERO);
    }
}
