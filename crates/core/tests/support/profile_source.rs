use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use profilelink_core::ProfileSource;
use profilelink_domain::{
    Credential, ProfileLinkError, RawPayload, RawProfile, Result as DomainResult,
    StructuredPayload,
};

/// Scripted `ProfileSource`.
///
/// Returns the configured payload for every key and counts calls. A delay can
/// be set to hold fetches open while a test races or cancels them.
#[derive(Clone)]
pub struct MockProfileSource {
    payload: Arc<Mutex<DomainResult<RawPayload>>>,
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl MockProfileSource {
    pub fn structured(json: &str) -> Self {
        let payload = StructuredPayload::from_json(json).expect("fixture parses");
        Self::with_payload(RawPayload::Structured(payload))
    }

    pub fn with_payload(payload: RawPayload) -> Self {
        Self { payload: Arc::new(Mutex::new(Ok(payload))), calls: Arc::default(), delay: None }
    }

    pub fn failing(error: ProfileLinkError) -> Self {
        Self { payload: Arc::new(Mutex::new(Err(error))), calls: Arc::default(), delay: None }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_payload(&self, payload: RawPayload) {
        *self.payload.lock().unwrap() = Ok(payload);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileSource for MockProfileSource {
    async fn fetch(&self, key: &str, _credential: &Credential) -> DomainResult<RawProfile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let payload = self.payload.lock().unwrap().clone()?;
        Ok(RawProfile { profile_url: format!("https://www.linkedin.com/in/{key}"), payload })
    }

    async fn validate_credential(&self, _credential: &Credential) -> DomainResult<bool> {
        Ok(true)
    }
}
