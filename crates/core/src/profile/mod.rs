//! Profile normalization and cache-aside retrieval

pub mod coordinator;
pub mod matching;
pub mod normalizer;

pub use coordinator::{CachedProfile, ProfileCacheCoordinator, ProfileLookup};
pub use matching::{fold, SkillMatcher};
pub use normalizer::{format_duration, ProfileNormalizer};
