//! Loan application workflow and eligibility rules.
//!
//! # Modules
//!
//! - `types` - Application record and status machine
//! - `eligibility` - Pure rules engine returning all failing reasons
//! - `service` - Submission, review, and disbursement transitions
//! - `error` - Loan workflow error types

pub mod eligibility;
pub mod error;
pub mod service;
pub mod types;

pub use eligibility::{evaluate, EligibilityReport, IneligibilityReason};
pub use error::LoanError;
pub use service::{monthly_payment_estimate, LoanService};
pub use types::{LoanApplication, LoanStatus};
