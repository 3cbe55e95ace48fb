//! Storage trait for the persistent work record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::types::work::WorkDraft;

/// A persisted work record, as much of it as the import pipeline needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredWork {
    pub id: Uuid,
    pub title: String,

    /// Canonical archive URL for the work.
    pub archive_url: String,

    /// The source URL recorded at import time, if the work was imported.
    pub imported_from_url: Option<String>,

    /// Pseuds/logins credited on the work.
    pub creators: Vec<String>,

    pub chapter_count: usize,
    pub created_at: DateTime<Utc>,
}

/// The persistent record store.
///
/// Contract:
/// - `find_by_import_url` is an indexed equality lookup; `"fo"` must never
///   match a stored `"food"`.
/// - `find_by_title` matches the title exactly and case-sensitively; when a
///   creator is supplied it is ANDed in as an exact pseud/login match.
/// - `create` persists the draft atomically: the work and all of its
///   chapters, or nothing. A draft with zero chapters or only empty content
///   is rejected with [`crate::error::StoreError::EmptyDraft`].
#[async_trait]
pub trait WorkStore: Send + Sync {
    async fn find_by_import_url(&self, url: &str) -> StoreResult<Vec<StoredWork>>;

    async fn find_by_title(
        &self,
        title: &str,
        creator: Option<&str>,
    ) -> StoreResult<Vec<StoredWork>>;

    async fn create(&self, draft: &WorkDraft) -> StoreResult<StoredWork>;
}
