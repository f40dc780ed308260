//! Membership application workflow.
//!
//! A two-state terminal machine: pending applications are approved
//! (creating the member and their zero-balance ledger head) or rejected
//! with notes. Guarantor validity is checked at approval time.

pub mod error;
pub mod service;
pub mod types;

pub use error::MembershipError;
pub use service::MembershipService;
pub use types::{ApplicationStatus, MembershipApplication};
