//! Store key namespace
//!
//! Every value type shares one `TimedStore`, so each gets its own prefix.

use sha2::{Digest, Sha256};

pub const PROFILE_PREFIX: &str = "profile:";
pub const LAST_UPDATE_PREFIX: &str = "lastUpdate:";
pub const STATE_PREFIX: &str = "oauth:state:";
pub const TOKEN_PREFIX: &str = "oauth:token:";
pub const ROTATION_PREFIX: &str = "oauth:rotation:";

pub fn profile_key(key: &str) -> String {
    format!("{PROFILE_PREFIX}{key}")
}

pub fn last_update_key(key: &str) -> String {
    format!("{LAST_UPDATE_PREFIX}{key}")
}

pub fn state_key(state: &str) -> String {
    format!("{STATE_PREFIX}{state}")
}

pub fn token_key(subject: &str) -> String {
    format!("{TOKEN_PREFIX}{subject}")
}

/// Guard key for a refresh token. The token itself is hashed so it never
/// appears in the store.
pub fn rotation_key(refresh_token: &str) -> String {
    let digest = Sha256::digest(refresh_token.as_bytes());
    format!("{ROTATION_PREFIX}{}", hex::encode(digest))
}

/// Short prefix of a secret-ish value, safe for log fields.
pub(crate) fn fingerprint(value: &str) -> String {
    value.chars().take(8).collect()
}
