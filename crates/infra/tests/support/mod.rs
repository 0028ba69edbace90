//! Shared helpers for `profilelink-infra` integration tests.

#![allow(dead_code)]

use profilelink_domain::Config;
use wiremock::MockServer;

pub const SESSION_COOKIE: &str = "li_at=AQEDAR-test; JSESSIONID=\"ajax:7\"";

pub const STRUCTURED_PROFILE: &str = include_str!("../fixtures/profile.json");
pub const HTML_PROFILE: &str = include_str!("../fixtures/profile.html");

/// Configuration pointing both the OAuth authority and the profile source
/// at `server`, with the in-memory store.
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.oauth.authority = server.uri();
    config.oauth.client_id = "client-123".into();
    config.oauth.client_secret = "s3cret".into();
    config.oauth.redirect_uri = "http://localhost:3000/callback".into();
    config.source.base_url = server.uri();
    config.source.fetch_timeout_secs = 5;
    config.oauth.exchange_timeout_secs = 5;
    config
}

/// Value of query parameter `name` in `url`.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
