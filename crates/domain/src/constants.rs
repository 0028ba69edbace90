//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Structured payload entity discriminators (matched as substrings of `$type`)
pub const ENTITY_POSITION: &str = "com.linkedin.voyager.dash.identity.profile.Position";
pub const ENTITY_EDUCATION: &str = "com.linkedin.voyager.dash.identity.profile.Education";
pub const ENTITY_SKILL: &str = "com.linkedin.voyager.dash.identity.profile.Skill";
pub const ENTITY_CERTIFICATION: &str = "com.linkedin.voyager.dash.identity.profile.Certification";
pub const ENTITY_PROFILE: &str = "com.linkedin.voyager.dash.identity.profile.Profile";

// Duration rendering
pub const DURATION_SEPARATOR: &str = " até ";
pub const PRESENT_LABEL: &str = "Presente";
pub const DEFAULT_MONTH: u32 = 1;

// Lifetimes
pub const STATE_TTL_SECS: u64 = 300;
pub const PROFILE_TTL_SECS: u64 = 86_400;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
/// How long a used refresh token stays blocked; provider refresh tokens live a year.
pub const REFRESH_GUARD_TTL_SECS: u64 = 365 * 86_400;

// OAuth provider
pub const DEFAULT_OAUTH_AUTHORITY: &str = "https://www.linkedin.com/oauth/v2";
pub const DEFAULT_SCOPES: &[&str] = &["openid", "profile", "email", "w_member_social"];

// Profile source
pub const DEFAULT_SOURCE_BASE_URL: &str = "https://www.linkedin.com";
pub const PROFILE_ACCEPT: &str = "application/vnd.linkedin.normalized+json+2.1";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                      (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// Session cookie components
pub const SESSION_COOKIE_TOKEN: &str = "li_at";
pub const SESSION_COOKIE_CSRF: &str = "JSESSIONID";

// Store
pub const DEFAULT_KEY_PREFIX: &str = "profilelink:";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
