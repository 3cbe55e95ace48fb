//! Test doubles for the pipeline's collaborator seams.
//!
//! All mocks share state through `Arc`, so a clone kept by the test still
//! observes calls made through the clone handed to the pipeline.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use uuid::Uuid;

use crate::error::{FetchError, FetchResult};
use crate::traits::auth::AgentAuthorizer;
use crate::traits::fetcher::Fetcher;
use crate::traits::notify::ClaimNotifier;
use crate::traits::store::StoredWork;
use crate::types::work::ExternalAuthor;

/// One recorded fetcher invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetcherCall {
    Fetch { url: String },
    SubmitForm { url: String },
}

/// Scripted fetcher.
///
/// URLs respond with their configured body; unconfigured URLs respond
/// with an empty body, which downstream code treats as a missing page.
/// URLs marked as failing return a connection error.
#[derive(Clone, Default)]
pub struct MockFetcher {
    bodies: Arc<RwLock<HashMap<String, String>>>,
    form_responses: Arc<RwLock<HashMap<String, String>>>,
    fail_urls: Arc<RwLock<Vec<String>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    calls: Arc<RwLock<Vec<FetcherCall>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.write().unwrap().insert(url.into(), body.into());
        self
    }

    pub fn with_bodies<I, U, B>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (U, B)>,
        U: Into<String>,
        B: Into<String>,
    {
        {
            let mut bodies = self.bodies.write().unwrap();
            for (url, body) in pairs {
                bodies.insert(url.into(), body.into());
            }
        }
        self
    }

    pub fn with_form_response(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.form_responses
            .write()
            .unwrap()
            .insert(url.into(), body.into());
        self
    }

    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.fail_urls.write().unwrap().push(url.into());
        self
    }

    /// Make every request sleep before responding, for timeout tests.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.write().unwrap() = Some(delay);
        self
    }

    async fn simulate_latency(&self) {
        let delay = *self.delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn calls(&self) -> Vec<FetcherCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of GET fetches made, not counting form submissions.
    pub fn fetch_count(&self) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, FetcherCall::Fetch { .. }))
            .count()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        self.calls.write().unwrap().push(FetcherCall::Fetch {
            url: url.to_string(),
        });
        self.simulate_latency().await;
        if self.fail_urls.read().unwrap().iter().any(|u| u == url) {
            return Err(FetchError::Http(Box::new(std::io::Error::other(
                "mock connection refused",
            ))));
        }
        Ok(self
            .bodies
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default())
    }

    async fn submit_form(&self, url: &str, _fields: &[(&str, &str)]) -> FetchResult<String> {
        self.calls.write().unwrap().push(FetcherCall::SubmitForm {
            url: url.to_string(),
        });
        self.simulate_latency().await;
        if self.fail_urls.read().unwrap().iter().any(|u| u == url) {
            return Err(FetchError::Http(Box::new(std::io::Error::other(
                "mock connection refused",
            ))));
        }
        Ok(self
            .form_responses
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default())
    }
}

/// Authorizer that accepts every caller.
pub struct AllowAllAgents;

#[async_trait]
impl AgentAuthorizer for AllowAllAgents {
    async fn is_import_agent(&self, _login: &str) -> bool {
        true
    }
}

/// Authorizer that rejects every caller.
pub struct DenyAllAgents;

#[async_trait]
impl AgentAuthorizer for DenyAllAgents {
    async fn is_import_agent(&self, _login: &str) -> bool {
        false
    }
}

/// Notifier that records who would have been emailed.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    notified: Arc<RwLock<Vec<ExternalAuthor>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notified(&self) -> Vec<ExternalAuthor> {
        self.notified.read().unwrap().clone()
    }
}

#[async_trait]
impl ClaimNotifier for RecordingNotifier {
    async fn notify_and_claim(&self, authors: &[ExternalAuthor], _agent: &str) -> Vec<String> {
        self.notified.write().unwrap().extend_from_slice(authors);
        authors.iter().map(|a| a.name.clone()).collect()
    }
}

/// Build a stored work record for seeding test stores.
pub fn stored_work(
    title: &str,
    imported_from_url: Option<&str>,
    creators: &[&str],
) -> StoredWork {
    let id = Uuid::new_v4();
    StoredWork {
        id,
        title: title.to_string(),
        archive_url: format!("http://archive.test/works/{id}"),
        imported_from_url: imported_from_url.map(str::to_string),
        creators: creators.iter().map(|c| c.to_string()).collect(),
        chapter_count: 1,
        created_at: Utc::now(),
    }
}
