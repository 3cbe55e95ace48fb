//! Authorization seam for the calling agent.

use async_trait::async_trait;

/// Decides whether a caller may import works on behalf of other authors.
///
/// Authorization itself (tokens, sessions) lives in the host application;
/// the batch orchestrator only asks this one question, and rejects the
/// whole batch up front when the answer is no.
#[async_trait]
pub trait AgentAuthorizer: Send + Sync {
    async fn is_import_agent(&self, login: &str) -> bool;
}
