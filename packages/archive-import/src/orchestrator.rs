//! Batch import orchestration.
//!
//! Drives one batch end to end: authorization, batch-shape validation,
//! then per item classify, dedup, crawl, extract, override, persist.
//! Items are isolated; one failure degrades the batch status but never
//! aborts the remaining items.

use std::time::Instant;
use tracing::{info, warn};

use crate::adapters::{extract_work, journal};
use crate::config::ImportLimits;
use crate::crawler::ChapterCrawler;
use crate::dedup::DedupSearchEngine;
use crate::error::{ImportError, Result};
use crate::routing::SourceRouter;
use crate::traits::auth::AgentAuthorizer;
use crate::traits::fetcher::Fetcher;
use crate::traits::notify::ClaimNotifier;
use crate::traits::store::WorkStore;
use crate::types::request::{ImportItem, ImportRequest};
use crate::types::response::{
    import_summary_message, BatchResult, BatchStatus, ItemResult, ItemStatus,
};
use crate::types::work::{ExternalAuthor, TagCategory, WorkDraft};

pub struct BatchImporter<F, S, A, N>
where
    F: Fetcher,
    S: WorkStore,
    A: AgentAuthorizer,
    N: ClaimNotifier,
{
    router: SourceRouter,
    crawler: ChapterCrawler<F>,
    store: S,
    authorizer: A,
    notifier: N,
    limits: ImportLimits,
}

impl<F, S, A, N> BatchImporter<F, S, A, N>
where
    F: Fetcher,
    S: WorkStore,
    A: AgentAuthorizer,
    N: ClaimNotifier,
{
    pub fn new(fetcher: F, store: S, authorizer: A, notifier: N) -> Self {
        let limits = ImportLimits::default();
        Self {
            router: SourceRouter::known_sources(),
            crawler: ChapterCrawler::new(fetcher, limits.clone()),
            store,
            authorizer,
            notifier,
            limits,
        }
    }

    pub fn with_limits(mut self, limits: ImportLimits) -> Self {
        self.crawler = ChapterCrawler::new(self.crawler.into_fetcher(), limits.clone());
        self.limits = limits;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Import a batch of works on behalf of `agent`.
    pub async fn import(&self, agent: &str, request: &ImportRequest) -> BatchResult {
        if !self.authorizer.is_import_agent(agent).await {
            warn!(agent = %agent, "import refused for unapproved agent");
            return BatchResult::rejected(
                BatchStatus::Forbidden,
                "Only an approved import agent can import works.",
            );
        }
        if let Some(rejection) = self.validate_batch(request.items.len(), "import") {
            return rejection;
        }

        let deadline = self.limits.request_deadline.map(|d| Instant::now() + d);
        let mut works = Vec::with_capacity(request.items.len());
        let mut claim_authors: Vec<ExternalAuthor> = Vec::new();

        for item in &request.items {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                works.push(
                    echo_item(ItemResult::new(ItemStatus::NotAttempted), item).with_message(
                        "The import deadline was reached before this work was attempted. Please submit it again.",
                    ),
                );
                continue;
            }
            let (result, authors) = self.import_item(item).await;
            if result.status == ItemStatus::Created {
                for author in authors {
                    if !claim_authors.contains(&author) {
                        claim_authors.push(author);
                    }
                }
            }
            works.push(result);
        }

        let any_success = works.iter().any(|w| w.status.is_success());
        let any_errors = works.iter().any(|w| !w.status.is_success());
        let mut messages = vec![import_summary_message(any_success, any_errors).to_string()];

        if request.send_claim_emails && !claim_authors.is_empty() {
            let notified = self.notifier.notify_and_claim(&claim_authors, agent).await;
            if !notified.is_empty() {
                messages.push(format!("Claim emails sent to {}.", notified.join(", ")));
            }
        }

        let status = if any_errors {
            BatchStatus::BadRequest
        } else {
            BatchStatus::Ok
        };
        info!(
            items = works.len(),
            success = any_success,
            errors = any_errors,
            "import batch finished"
        );
        BatchResult {
            status,
            messages,
            works,
        }
    }

    /// Search for already-imported works without importing anything.
    pub async fn search(&self, request: &ImportRequest) -> BatchResult {
        if let Some(rejection) = self.validate_batch(request.items.len(), "find") {
            return rejection;
        }

        let engine = DedupSearchEngine::new(&self.store);
        let mut works = Vec::with_capacity(request.items.len());
        let mut messages = Vec::new();

        for item in &request.items {
            let outcome = if !item.original_urls.is_empty() {
                match engine.find_by_urls(&item.original_urls).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        works.push(error_result(item, &e));
                        continue;
                    }
                }
            } else if let Some(title) = &item.title {
                match engine.find_by_title(title, item.creators.as_deref()).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        works.push(error_result(item, &e));
                        continue;
                    }
                }
            } else {
                let result = echo_item(ItemResult::new(ItemStatus::EmptyRequest), item)
                    .with_message(
                        "This work doesn't contain original_urls or a title to search for.",
                    );
                works.push(result);
                continue;
            };

            let status = if outcome.is_found() {
                ItemStatus::Found
            } else {
                ItemStatus::NotFound
            };
            let mut result = echo_item(ItemResult::new(status), item);
            result.original_search = Some(item.clone());
            result.archive_url = outcome.matches.first().map(|m| m.archive_url.clone());
            messages.extend(outcome.messages.iter().cloned());
            result.messages = outcome.messages;
            result.search_results = outcome.matches;
            works.push(result);
        }

        BatchResult {
            status: BatchStatus::Ok,
            messages,
            works,
        }
    }

    fn validate_batch(&self, item_count: usize, verb: &str) -> Option<BatchResult> {
        if item_count == 0 {
            return Some(BatchResult::rejected(
                BatchStatus::EmptyRequest,
                format!("Please provide a list of works to {verb}."),
            ));
        }
        if item_count > self.limits.max_batch_items {
            return Some(BatchResult::rejected(
                BatchStatus::TooManyRequests,
                format!(
                    "Please provide no more than {} works to {verb}.",
                    self.limits.max_batch_items
                ),
            ));
        }
        None
    }

    async fn import_item(&self, item: &ImportItem) -> (ItemResult, Vec<ExternalAuthor>) {
        if item.chapter_urls.is_empty() {
            let result = echo_item(ItemResult::new(ItemStatus::EmptyRequest), item)
                .with_message(
                    "This work doesn't contain chapter_urls. Works can only be imported from publicly-accessible URLs.",
                );
            return (result, Vec::new());
        }
        if item.chapter_urls.len() > self.limits.max_chapter_count {
            let result = echo_item(ItemResult::new(ItemStatus::TooManyRequests), item)
                .with_message(format!(
                    "This work contains too many chapter URLs. A maximum of {} chapters can be imported per work.",
                    self.limits.max_chapter_count
                ));
            return (result, Vec::new());
        }

        let seed_url = &item.chapter_urls[0];
        let engine = DedupSearchEngine::new(&self.store);
        match engine.find_by_urls(std::slice::from_ref(seed_url)).await {
            Ok(outcome) if outcome.is_found() => {
                let mut result = echo_item(ItemResult::new(ItemStatus::Found), item);
                result.archive_url = outcome.matches.first().map(|m| m.archive_url.clone());
                result.messages = outcome.messages;
                result.search_results = outcome.matches;
                return (result, Vec::new());
            }
            Ok(_) => {}
            Err(e) => return (error_result(item, &e), Vec::new()),
        }

        match self.build_and_persist(item).await {
            Ok((result, authors)) => (result, authors),
            Err(e) => (error_result(item, &e), Vec::new()),
        }
    }

    async fn build_and_persist(
        &self,
        item: &ImportItem,
    ) -> Result<(ItemResult, Vec<ExternalAuthor>)> {
        let seed_url = &item.chapter_urls[0];
        let adapter = self.router.classify(seed_url);
        info!(url = %seed_url, adapter = %adapter, "importing work");

        let pages = self
            .crawler
            .download_chapters(adapter, &item.chapter_urls)
            .await?;

        let detect_tags = item.metadata.detect_tags_enabled();
        let mut work = extract_work(adapter, seed_url, &pages, detect_tags);
        apply_overrides(&mut work, item);

        let mut authors = item.metadata.external_authors();
        if authors.is_empty() && adapter.is_journal() {
            if let Some(author) = journal::parse_author(self.crawler.fetcher(), seed_url).await {
                authors.push(author);
            }
        }
        work.external_authors = authors.clone();

        let stored = self.store.create(&work).await.map_err(ImportError::from)?;
        let mut result = echo_item(ItemResult::new(ItemStatus::Created), item).with_message(
            format!(
                "Work \"{}\" was created at \"{}\".",
                stored.title, stored.archive_url
            ),
        );
        result.archive_url = Some(stored.archive_url);
        Ok((result, authors))
    }
}

fn echo_item(mut result: ItemResult, item: &ImportItem) -> ItemResult {
    result.original_id = item.id.clone();
    result.original_url = item
        .chapter_urls
        .first()
        .or_else(|| item.original_urls.first())
        .cloned();
    result
}

fn error_result(item: &ImportItem, error: &dyn std::fmt::Display) -> ItemResult {
    echo_item(ItemResult::new(ItemStatus::Error), item)
        .with_message("Unable to import this work.")
        .with_message(error.to_string())
}

/// Fold caller-supplied metadata into the extracted draft. Caller values
/// win over extraction; tag fields either replace or union per category
/// depending on the override flag.
fn apply_overrides(work: &mut WorkDraft, item: &ImportItem) {
    if let Some(title) = &item.title {
        work.title = title.clone();
    }
    if work.title.trim().is_empty() {
        work.title = "Untitled Imported Work".to_string();
    }

    let meta = &item.metadata;
    if let Some(summary) = &meta.summary {
        work.summary = Some(summary.clone());
    }
    if let Some(notes) = &meta.notes {
        work.notes = Some(notes.clone());
    }
    if let Some(restricted) = meta.restricted {
        work.restricted = restricted;
    }
    if let Some(complete) = meta.complete {
        work.complete = complete;
    }

    let overrides = [
        (TagCategory::Fandom, &meta.fandoms),
        (TagCategory::Warning, &meta.warnings),
        (TagCategory::Character, &meta.characters),
        (TagCategory::Rating, &meta.rating),
        (TagCategory::Relationship, &meta.relationships),
        (TagCategory::Category, &meta.categories),
        (TagCategory::Freeform, &meta.additional_tags),
    ];
    for (category, value) in overrides {
        if let Some(value) = value {
            if meta.override_tags_enabled() {
                work.tags.replace_delimited(category, value);
            } else {
                work.tags.insert_delimited(category, value);
            }
        }
    }
}
