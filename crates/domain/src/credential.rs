//! Opaque session credential
//!
//! The profile source authenticates with the caller's browser session
//! cookie. The raw string is only reachable through [`Credential::expose`];
//! nothing downstream parses it positionally.

use std::fmt;

use crate::constants::{SESSION_COOKIE_CSRF, SESSION_COOKIE_TOKEN};
use crate::errors::{ProfileLinkError, Result};

/// Session cookie presented to the profile source.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    cookie: String,
    csrf_token: String,
}

impl Credential {
    /// Validate and wrap a raw `Cookie` header value.
    ///
    /// Both a `li_at=` and a `JSESSIONID=` component must be present with
    /// non-empty values.
    ///
    /// # Errors
    /// Returns `ProfileLinkError::InvalidInput` otherwise.
    pub fn parse_session_cookie(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let session = cookie_value(raw, SESSION_COOKIE_TOKEN);
        let csrf = cookie_value(raw, SESSION_COOKIE_CSRF);

        match (session, csrf) {
            (Some(_), Some(csrf)) => Ok(Self {
                cookie: raw.to_string(),
                csrf_token: csrf.trim_matches('"').to_string(),
            }),
            _ => Err(ProfileLinkError::InvalidInput(format!(
                "session cookie must contain {SESSION_COOKIE_TOKEN} and {SESSION_COOKIE_CSRF}"
            ))),
        }
    }

    /// Full cookie header value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.cookie
    }

    /// `JSESSIONID` without surrounding quotes, sent as the CSRF header.
    #[must_use]
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

fn cookie_value<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    raw.split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty() && *value != "\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_cookie() {
        let credential =
            Credential::parse_session_cookie("li_at=AQEDAR; JSESSIONID=\"ajax:123\"; lang=en")
                .unwrap();

        assert_eq!(credential.expose(), "li_at=AQEDAR; JSESSIONID=\"ajax:123\"; lang=en");
        assert_eq!(credential.csrf_token(), "ajax:123");
    }

    #[test]
    fn test_missing_component_is_rejected() {
        for raw in ["li_at=abc", "JSESSIONID=ajax:1", "li_at=; JSESSIONID=ajax:1", "", "garbage"] {
            let err = Credential::parse_session_cookie(raw).unwrap_err();
            assert!(matches!(err, ProfileLinkError::InvalidInput(_)), "{raw}");
        }
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::parse_session_cookie("li_at=secret; JSESSIONID=x").unwrap();
        assert_eq!(format!("{credential:?}"), "Credential(***)");
    }
}
