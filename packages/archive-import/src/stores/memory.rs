//! In-memory record store.
//!
//! Backs the test suite and small deployments; the lookup semantics are
//! the reference for what a database-backed store must honor.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{StoredWork, WorkStore};
use crate::types::work::WorkDraft;

pub struct MemoryWorkStore {
    works: RwLock<Vec<StoredWork>>,
    /// Titles whose creation should fail, for exercising persistence
    /// failure paths.
    fail_titles: RwLock<Vec<String>>,
    archive_base: String,
}

impl Default for MemoryWorkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWorkStore {
    pub fn new() -> Self {
        Self {
            works: RwLock::new(Vec::new()),
            fail_titles: RwLock::new(Vec::new()),
            archive_base: "http://archive.test/works".to_string(),
        }
    }

    pub fn with_archive_base(mut self, base: impl Into<String>) -> Self {
        self.archive_base = base.into();
        self
    }

    /// Insert an existing record directly, bypassing draft validation.
    pub fn seed(&self, work: StoredWork) {
        self.works.write().unwrap().push(work);
    }

    /// Make `create` fail for any draft with this title.
    pub fn fail_title(&self, title: impl Into<String>) {
        self.fail_titles.write().unwrap().push(title.into());
    }

    pub fn work_count(&self) -> usize {
        self.works.read().unwrap().len()
    }
}

#[async_trait]
impl WorkStore for MemoryWorkStore {
    async fn find_by_import_url(&self, url: &str) -> StoreResult<Vec<StoredWork>> {
        let works = self.works.read().unwrap();
        Ok(works
            .iter()
            .filter(|w| w.imported_from_url.as_deref() == Some(url))
            .cloned()
            .collect())
    }

    async fn find_by_title(
        &self,
        title: &str,
        creator: Option<&str>,
    ) -> StoreResult<Vec<StoredWork>> {
        let works = self.works.read().unwrap();
        Ok(works
            .iter()
            .filter(|w| w.title == title)
            .filter(|w| match creator {
                Some(creator) => w.creators.iter().any(|c| c == creator),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn create(&self, draft: &WorkDraft) -> StoreResult<StoredWork> {
        if !draft.is_persistable() {
            return Err(StoreError::EmptyDraft);
        }
        let title = draft.title.clone();

        if self.fail_titles.read().unwrap().contains(&title) {
            return Err(StoreError::Rejected {
                reason: format!("work \"{title}\" was rejected by the archive"),
            });
        }

        let id = Uuid::new_v4();
        let work = StoredWork {
            id,
            title,
            archive_url: format!("{}/{id}", self.archive_base),
            imported_from_url: draft.imported_from_url.clone(),
            creators: draft
                .external_authors
                .iter()
                .map(|a| a.name.clone())
                .collect(),
            chapter_count: draft.chapters.len(),
            created_at: Utc::now(),
        };
        debug!(id = %id, title = %work.title, chapters = work.chapter_count, "work created");
        self.works.write().unwrap().push(work.clone());
        Ok(work)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::work::ChapterDraft;

    fn draft_with_content(title: &str) -> WorkDraft {
        let mut draft = WorkDraft::new(title);
        draft.chapters.push(ChapterDraft::new("Some story text."));
        draft
    }

    #[tokio::test]
    async fn test_create_rejects_empty_draft() {
        let store = MemoryWorkStore::new();
        let mut draft = WorkDraft::new("Empty");
        draft.chapters.push(ChapterDraft::new(""));

        let err = store.create(&draft).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyDraft));
        assert_eq!(store.work_count(), 0);
    }

    #[tokio::test]
    async fn test_create_then_find_by_url() {
        let store = MemoryWorkStore::new();
        let mut draft = draft_with_content("Found Again");
        draft.imported_from_url = Some("http://example.com/story".to_string());

        let created = store.create(&draft).await.unwrap();
        assert!(created.archive_url.contains(&created.id.to_string()));

        let found = store
            .find_by_import_url("http://example.com/story")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Found Again");
    }

    #[tokio::test]
    async fn test_fail_title_rejects_creation() {
        let store = MemoryWorkStore::new();
        store.fail_title("Doomed");

        let err = store.create(&draft_with_content("Doomed")).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));
        assert_eq!(store.work_count(), 0);
    }
}
