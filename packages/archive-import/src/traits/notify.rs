//! Notification seam for external-author claim invitations.

use async_trait::async_trait;

use crate::types::work::ExternalAuthor;

/// Sends claim invitations to the external authors of imported works.
///
/// Called once per batch, after persistence completes, with the distinct
/// authors of successfully created works only. Notifications must reflect
/// committed works.
#[async_trait]
pub trait ClaimNotifier: Send + Sync {
    /// Notify the authors and return the names that were notified.
    async fn notify_and_claim(&self, authors: &[ExternalAuthor], agent: &str) -> Vec<String>;
}

/// A notifier that does nothing. For hosts that handle invitations out of
/// band, and for tests.
pub struct NoopNotifier;

#[async_trait]
impl ClaimNotifier for NoopNotifier {
    async fn notify_and_claim(&self, _authors: &[ExternalAuthor], _agent: &str) -> Vec<String> {
        Vec::new()
    }
}
