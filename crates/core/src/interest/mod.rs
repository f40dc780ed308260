//! Monthly interest accrual.
//!
//! # Modules
//!
//! - `engine` - The accrual sweep and rate escalation rule
//! - `error` - Accrual error types

pub mod engine;
pub mod error;

#[cfg(test)]
mod engine_props;

pub use engine::{effective_rate, AccrualEngine, AccrualRunReport, MemberFault};
pub use error::AccrualError;
