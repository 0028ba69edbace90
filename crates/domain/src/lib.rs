//! # ProfileLink Domain
//!
//! Business domain types and models for ProfileLink.
//!
//! This crate contains:
//! - The canonical profile record and the raw payload it is built from
//! - Domain error types and Result definitions
//! - Configuration structures
//! - The opaque session credential
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other ProfileLink crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod credential;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use credential::Credential;
pub use errors::*;
pub use types::*;
