//! Pending authorization state

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// PKCE material kept between redirect and callback.
///
/// Written once under `oauth:state:<state>` and consumed by a single atomic
/// take; a second read finds nothing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PKCEState {
    pub state: String,
    pub code_verifier: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub issued_at: DateTime<Utc>,
}

impl fmt::Debug for PKCEState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PKCEState")
            .field("state", &self.state)
            .field("code_verifier", &"***")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// What a caller needs to send the user to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Browser URL carrying `state` and the S256 challenge.
    pub url: String,
    /// The issued state, for callers that correlate callbacks themselves.
    pub state: String,
}
