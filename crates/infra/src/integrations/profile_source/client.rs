use std::time::Instant;

use async_trait::async_trait;
use profilelink_core::ProfileSource;
use profilelink_domain::constants::PROFILE_ACCEPT;
use profilelink_domain::{
    Credential, ProfileLinkError, RawPayload, RawProfile, Result, SourceSettings,
    StructuredPayload,
};
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::{Method, RequestBuilder, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use super::extract::extract_fragments;
use crate::errors::InfraError;
use crate::http::HttpClient;

const CSRF_HEADER: &str = "csrf-token";
const SESSION_PROBE_PATH: &str = "/voyager/api/me";

/// [`ProfileSource`] that reads public profile pages over HTTP.
///
/// The response body decides the payload shape: JSON carrying an
/// `included` list is structured, anything that looks like markup is
/// reduced to DOM fragments.
#[derive(Debug, Clone)]
pub struct HttpProfileSource {
    http: HttpClient,
    base_url: Url,
}

impl HttpProfileSource {
    /// # Errors
    /// `Config` for an unparsable base URL or an unbuildable client.
    pub fn new(settings: &SourceSettings) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(settings.fetch_timeout())
            .user_agent(settings.user_agent.clone())
            .max_attempts(2)
            .build()?;
        Self::with_client(http, &settings.base_url)
    }

    /// # Errors
    /// `Config` for an unparsable base URL.
    pub fn with_client(http: HttpClient, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ProfileLinkError::Config(format!("invalid source base URL: {e}")))?;
        Ok(Self { http, base_url })
    }

    /// Canonical URL of the profile page for `username`.
    pub fn profile_url(&self, username: &str) -> String {
        format!("{}/in/{}", self.base_origin(), username)
    }

    fn base_origin(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    fn authenticated(&self, url: &str, credential: &Credential) -> RequestBuilder {
        self.http
            .request(Method::GET, url)
            .header(COOKIE, credential.expose())
            .header(CSRF_HEADER, credential.csrf_token())
            .header(ACCEPT, PROFILE_ACCEPT)
    }
}

/// Decide the payload shape of a profile response body.
fn classify_body(body: &str) -> Result<RawPayload> {
    let trimmed = body.trim_start();

    if trimmed.starts_with('{') {
        let value: serde_json::Value = serde_json::from_str(trimmed)
            .map_err(|e| ProfileLinkError::FetchFailed(format!("malformed profile JSON: {e}")))?;
        if value.get("included").is_some_and(serde_json::Value::is_array) {
            let payload = serde_json::from_value::<StructuredPayload>(value).map_err(|e| {
                ProfileLinkError::FetchFailed(format!("malformed profile JSON: {e}"))
            })?;
            return Ok(RawPayload::Structured(payload));
        }
        return Err(ProfileLinkError::FetchFailed("JSON body has no included list".into()));
    }

    if trimmed.starts_with('<') {
        return extract_fragments(body).map(RawPayload::Document);
    }

    Err(ProfileLinkError::FetchFailed("unrecognised profile body".into()))
}

#[async_trait]
impl ProfileSource for HttpProfileSource {
    async fn fetch(&self, key: &str, credential: &Credential) -> Result<RawProfile> {
        let username = key.trim();
        if username.is_empty() || username.contains('/') {
            return Err(ProfileLinkError::InvalidInput(format!("invalid profile key: {key:?}")));
        }

        let profile_url = self.profile_url(username);
        let started = Instant::now();
        let response = self.http.send(self.authenticated(&profile_url, credential)).await?;

        let status = response.status();
        if !status.is_success() {
            warn!(username, status = status.as_u16(), "profile fetch rejected");
            return Err(ProfileLinkError::FetchFailed(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            )));
        }

        let body = response.text().await.map_err(|e| ProfileLinkError::from(InfraError::from(e)))?;
        let payload = classify_body(&body).inspect_err(|err| {
            warn!(username, error = %err, "profile body not usable");
        })?;

        info!(
            username,
            structured = matches!(payload, RawPayload::Structured(_)),
            bytes = body.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "profile page fetched"
        );
        Ok(RawProfile { profile_url, payload })
    }

    async fn validate_credential(&self, credential: &Credential) -> Result<bool> {
        let url = format!("{}{}", self.base_origin(), SESSION_PROBE_PATH);
        let response = self.http.send(self.authenticated(&url, credential)).await?;
        let accepted = response.status() == StatusCode::OK;
        debug!(status = response.status().as_u16(), accepted, "session probe answered");
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_with_included_is_structured() {
        let payload = classify_body(r#"  {"data":{},"included":[{"$type":"x.Skill","name":"Go"}]}"#)
            .unwrap();
        match payload {
            RawPayload::Structured(structured) => assert_eq!(structured.elements.len(), 1),
            other => panic!("expected structured payload, got {other:?}"),
        }
    }

    #[test]
    fn json_without_included_is_rejected() {
        let err = classify_body(r#"{"status":"ok"}"#).unwrap_err();
        assert!(matches!(err, ProfileLinkError::FetchFailed(_)));
    }

    #[test]
    fn malformed_json_is_fetch_failure() {
        let err = classify_body(r#"{"included": ["#).unwrap_err();
        assert!(matches!(err, ProfileLinkError::FetchFailed(msg) if msg.contains("malformed")));
    }

    #[test]
    fn markup_becomes_document() {
        let payload =
            classify_body("<!DOCTYPE html><h1 class=\"text-heading-xlarge\">Rui</h1>").unwrap();
        match payload {
            RawPayload::Document(fragments) => assert_eq!(fragments.name, "Rui"),
            other => panic!("expected document payload, got {other:?}"),
        }
    }

    #[test]
    fn plain_text_is_rejected() {
        assert!(matches!(classify_body("Too many requests"), Err(ProfileLinkError::FetchFailed(_))));
    }

    #[test]
    fn profile_url_ignores_trailing_slash() {
        let source =
            HttpProfileSource::with_client(HttpClient::new().unwrap(), "https://example.test/")
                .unwrap();
        assert_eq!(source.profile_url("ana"), "https://example.test/in/ana");
    }
}
