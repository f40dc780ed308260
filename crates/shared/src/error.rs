//! Error classification shared by every domain error.
//!
//! Each domain crate defines its own `thiserror` enum; this module provides
//! the common classification those enums map into, so callers can decide
//! uniformly whether a failure is safe to retry or must reach an operator.

use serde::{Deserialize, Serialize};

/// Classification of a domain error.
///
/// Drives caller behavior: validation and invariant failures are returned
/// to the caller as-is, integrity faults are surfaced to an operator, and
/// conflicts are safe to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Malformed or out-of-range input, rejected before any write.
    Validation,
    /// A domain invariant would be broken; the operation was aborted
    /// without any partial write.
    Invariant,
    /// Stored data is missing an expected field; the operation was
    /// skipped rather than guessed at, and an operator should look.
    IntegrityFault,
    /// Lost a race on a per-member version; the whole operation can be
    /// retried.
    Conflict,
    /// A referenced record does not exist.
    NotFound,
    /// The acting user's role does not permit the operation.
    Forbidden,
}

impl ErrorClass {
    /// Returns true if an operation failing with this class can be
    /// retried without operator intervention.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict)
    }

    /// Returns true if this class must be surfaced to an operator.
    #[must_use]
    pub const fn is_operator_visible(&self) -> bool {
        matches!(self, Self::IntegrityFault)
    }

    /// Returns the string code for operator-facing surfaces.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Invariant => "invariant_violation",
            Self::IntegrityFault => "data_integrity_fault",
            Self::Conflict => "concurrency_conflict",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
