//! Shared types, errors, and configuration for Sacco.
//!
//! This crate provides common types used across all other crates:
//! - Money helpers with decimal precision
//! - Typed IDs for type-safe entity references
//! - Error classification shared by every domain error
//! - Runtime configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::RuntimeConfig;
pub use error::ErrorClass;
