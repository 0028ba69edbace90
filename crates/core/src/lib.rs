//! # ProfileLink Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The OAuth authorization code + PKCE flow over a shared store
//! - Profile normalization and skill matching
//! - The cache-aside profile coordinator
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Depends on `profilelink-common` and `profilelink-domain` only
//! - No Redis, HTML or HTTP client code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod auth;
pub mod keys;
pub mod ports;
pub mod profile;

mod errors;

// Re-export specific items to avoid ambiguity
pub use auth::{AuthorizationRequest, OAuthFlowManager, PKCEState};
pub use ports::ProfileSource;
pub use profile::{
    CachedProfile, ProfileCacheCoordinator, ProfileLookup, ProfileNormalizer, SkillMatcher,
};
