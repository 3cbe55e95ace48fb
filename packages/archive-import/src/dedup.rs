//! Duplicate detection against the record store.
//!
//! Works can be looked up by the exact URL they were imported from, or by
//! exact title (optionally narrowed by creator). Both paths produce
//! user-facing messages alongside the matches, since the same lookups back
//! the search endpoint.

use tracing::debug;

use crate::error::Result;
use crate::traits::store::WorkStore;
use crate::types::response::FoundWork;

/// The outcome of one dedup lookup.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub matches: Vec<FoundWork>,
    pub messages: Vec<String>,
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        !self.matches.is_empty()
    }
}

pub struct DedupSearchEngine<'a, S: WorkStore> {
    store: &'a S,
}

impl<'a, S: WorkStore> DedupSearchEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Look up works previously imported from any of the given URLs.
    ///
    /// Lookups are exact; a stored source URL never matches a prefix or
    /// substring of it.
    pub async fn find_by_urls(&self, urls: &[String]) -> Result<SearchOutcome> {
        let mut outcome = SearchOutcome::default();
        for url in urls {
            let found = self.store.find_by_import_url(url).await?;
            debug!(url = %url, matches = found.len(), "import url lookup");
            if found.is_empty() {
                outcome
                    .messages
                    .push(format!("No work has been imported from \"{url}\"."));
                continue;
            }
            for work in found {
                outcome.messages.push(format!(
                    "Work \"{}\" created on {} was found at \"{}\".",
                    work.title,
                    work.created_at.format("%Y-%m-%d"),
                    work.archive_url
                ));
                outcome.matches.push(FoundWork {
                    work_id: work.id,
                    archive_url: work.archive_url,
                    created_at: work.created_at,
                });
            }
        }
        Ok(outcome)
    }

    /// Look up works by exact title, optionally narrowed to one creator.
    pub async fn find_by_title(
        &self,
        title: &str,
        creator: Option<&str>,
    ) -> Result<SearchOutcome> {
        let found = self.store.find_by_title(title, creator).await?;
        debug!(title = %title, creator = ?creator, matches = found.len(), "title lookup");

        let mut outcome = SearchOutcome::default();
        if found.is_empty() {
            outcome.messages.push(format!(
                "No works match title: \"{title}\", author: \"{}\".",
                creator.unwrap_or("")
            ));
            return Ok(outcome);
        }
        for work in found {
            outcome.messages.push(format!(
                "Work \"{}\" created on {} was found at \"{}\".",
                work.title,
                work.created_at.format("%Y-%m-%d"),
                work.archive_url
            ));
            outcome.matches.push(FoundWork {
                work_id: work.id,
                archive_url: work.archive_url,
                created_at: work.created_at,
            });
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryWorkStore;
    use crate::testing::stored_work;

    #[tokio::test]
    async fn test_url_lookup_is_exact() {
        let store = MemoryWorkStore::new();
        store.seed(stored_work("Food Story", Some("http://example.com/food"), &["cook"]));

        let engine = DedupSearchEngine::new(&store);
        let miss = engine
            .find_by_urls(&["http://example.com/fo".to_string()])
            .await
            .unwrap();
        assert!(!miss.is_found());
        assert_eq!(
            miss.messages,
            vec!["No work has been imported from \"http://example.com/fo\".".to_string()]
        );

        let hit = engine
            .find_by_urls(&["http://example.com/food".to_string()])
            .await
            .unwrap();
        assert_eq!(hit.matches.len(), 1);
        assert!(hit.messages[0].starts_with("Work \"Food Story\" created on"));
    }

    #[tokio::test]
    async fn test_title_lookup_is_exact_and_creator_narrows() {
        let store = MemoryWorkStore::new();
        store.seed(stored_work("Title", None, &["foo"]));
        store.seed(stored_work("Title", None, &["bar"]));
        store.seed(stored_work("Title Two", None, &["bar"]));

        let engine = DedupSearchEngine::new(&store);

        let by_title = engine.find_by_title("Title", None).await.unwrap();
        assert_eq!(by_title.matches.len(), 2, "substring titles do not match");

        let by_creator = engine.find_by_title("Title", Some("bar")).await.unwrap();
        assert_eq!(by_creator.matches.len(), 1);

        let none = engine.find_by_title("Missing", Some("baz")).await.unwrap();
        assert_eq!(
            none.messages,
            vec!["No works match title: \"Missing\", author: \"baz\".".to_string()]
        );
    }
}
