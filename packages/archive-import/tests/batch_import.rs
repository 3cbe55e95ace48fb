//! End-to-end batch import scenarios against scripted collaborators.

use std::time::Duration;

use tokio_test::assert_ok;

use archive_import::routing::AdapterId;
use archive_import::stores::MemoryWorkStore;
use archive_import::testing::{stored_work, AllowAllAgents, DenyAllAgents, MockFetcher, RecordingNotifier};
use archive_import::traits::NoopNotifier;
use archive_import::types::{BatchStatus, ImportItem, ImportRequest, ItemStatus};
use archive_import::{BatchImporter, ChapterCrawler, ImportLimits};

fn page(title: &str, body: &str) -> String {
    format!("<html><head><title>{title}</title></head><body><p>{body}</p></body></html>")
}

#[tokio::test]
async fn test_blocked_site_fails_without_fetching() {
    let fetcher = MockFetcher::new();
    let importer = BatchImporter::new(
        fetcher.clone(),
        MemoryWorkStore::new(),
        AllowAllAgents,
        NoopNotifier,
    );

    let request = ImportRequest::new(vec![ImportItem::from_chapter_urls([
        "http://www.fanfiction.net/s/123/1/Some-Story",
    ])]);
    let result = importer.import("archivist", &request).await;

    assert_eq!(result.status, BatchStatus::BadRequest);
    assert_eq!(result.works.len(), 1);
    assert_eq!(result.works[0].status, ItemStatus::Error);
    assert!(result.works[0]
        .messages
        .iter()
        .any(|m| m.contains("does not allow imports")));
    assert_eq!(fetcher.fetch_count(), 0, "blocked sites are never fetched");
    assert_eq!(importer.store().work_count(), 0);
}

#[tokio::test]
async fn test_already_imported_url_is_found_not_recreated() {
    let url = "http://stories.example.org/long-watch";
    let store = MemoryWorkStore::new();
    store.seed(stored_work("The Long Watch", Some(url), &["watcher"]));

    let fetcher = MockFetcher::new();
    let importer = BatchImporter::new(fetcher.clone(), store, AllowAllAgents, NoopNotifier);

    let request = ImportRequest::new(vec![ImportItem::from_chapter_urls([url])]);
    let result = importer.import("archivist", &request).await;

    let item = &result.works[0];
    assert_eq!(item.status, ItemStatus::Found);
    assert!(item.archive_url.is_some());
    assert_eq!(item.search_results.len(), 1);
    assert!(item.messages[0].starts_with("Work \"The Long Watch\" created on"));
    assert_eq!(fetcher.fetch_count(), 0, "found works are not re-downloaded");
    assert_eq!(importer.store().work_count(), 1, "no duplicate record");
}

#[tokio::test]
async fn test_partial_failure_keeps_batch_going() {
    let fetcher = MockFetcher::new()
        .with_body("http://a.example.org/one", page("One", "Story text one."))
        .with_body("http://b.example.org/two", page("Two", "Story text two."));
    // c.example.org has no scripted body and downloads as empty.
    let importer = BatchImporter::new(
        fetcher,
        MemoryWorkStore::new(),
        AllowAllAgents,
        NoopNotifier,
    );

    let request = ImportRequest::new(vec![
        ImportItem::from_chapter_urls(["http://a.example.org/one"]),
        ImportItem::from_chapter_urls(["http://c.example.org/missing"]),
        ImportItem::from_chapter_urls(["http://b.example.org/two"]),
    ]);
    let result = importer.import("archivist", &request).await;

    assert_eq!(result.works.len(), 3, "every item gets a result");
    assert_eq!(result.works[0].status, ItemStatus::Created);
    assert_eq!(result.works[1].status, ItemStatus::Error);
    assert_eq!(result.works[2].status, ItemStatus::Created);
    assert_eq!(result.status, BatchStatus::BadRequest);
    assert_eq!(
        result.messages[0],
        "At least one work was not imported. Please check individual work responses for further information."
    );
    assert_eq!(importer.store().work_count(), 2);
}

#[tokio::test]
async fn test_title_search_is_exact_and_creator_narrowed() {
    let store = MemoryWorkStore::new();
    store.seed(stored_work("Title", None, &["foo"]));
    store.seed(stored_work("Title", None, &["bar"]));
    store.seed(stored_work("Title Two", None, &["bar"]));

    let importer = BatchImporter::new(MockFetcher::new(), store, AllowAllAgents, NoopNotifier);

    let request = ImportRequest::new(vec![ImportItem::from_title("Title", Some("bar"))]);
    let result = importer.search(&request).await;

    assert_eq!(result.status, BatchStatus::Ok);
    let item = &result.works[0];
    assert_eq!(item.status, ItemStatus::Found);
    assert_eq!(item.search_results.len(), 1, "exact title AND exact creator");
    assert!(item.original_search.is_some());
}

#[tokio::test]
async fn test_url_search_reports_misses_exactly() {
    let store = MemoryWorkStore::new();
    store.seed(stored_work("Food Story", Some("http://example.com/food"), &["cook"]));

    let importer = BatchImporter::new(MockFetcher::new(), store, AllowAllAgents, NoopNotifier);

    let request = ImportRequest::new(vec![ImportItem::from_original_urls([
        "http://example.com/fo",
    ])]);
    let result = importer.search(&request).await;

    let item = &result.works[0];
    assert_eq!(item.status, ItemStatus::NotFound, "prefix of a stored URL is a miss");
    assert_eq!(
        item.messages,
        vec!["No work has been imported from \"http://example.com/fo\".".to_string()]
    );
}

#[tokio::test]
async fn test_chapter_walk_honors_chapter_cap() {
    let limits = ImportLimits::default();
    let fetcher = MockFetcher::new().with_bodies((1..=201).map(|n| {
        (
            format!("http://fic.example.org/viewstory.php?action=printable&sid=3&chapter={n}"),
            format!("printable page: distinct chapter body number {n}"),
        )
    }));
    let crawler = ChapterCrawler::new(fetcher, limits);

    let pages = assert_ok!(
        crawler
            .download(AdapterId::Efiction, "http://fic.example.org/viewstory.php?sid=3")
            .await
    );

    assert_eq!(pages.len(), 200, "chapter cap bounds the walk");
    assert_eq!(crawler.fetcher().fetch_count(), 200, "no fetch past the cap");
}

#[tokio::test]
async fn test_empty_batch_is_rejected() {
    let importer = BatchImporter::new(
        MockFetcher::new(),
        MemoryWorkStore::new(),
        AllowAllAgents,
        NoopNotifier,
    );

    let result = importer.import("archivist", &ImportRequest::default()).await;

    assert_eq!(result.status, BatchStatus::EmptyRequest);
    assert!(result.works.is_empty());
    assert_eq!(
        result.messages,
        vec!["Please provide a list of works to import.".to_string()]
    );
}

#[tokio::test]
async fn test_unapproved_agent_is_forbidden() {
    let fetcher = MockFetcher::new();
    let importer = BatchImporter::new(
        fetcher.clone(),
        MemoryWorkStore::new(),
        DenyAllAgents,
        NoopNotifier,
    );

    let request = ImportRequest::new(vec![ImportItem::from_chapter_urls([
        "http://a.example.org/one",
    ])]);
    let result = importer.import("someone", &request).await;

    assert_eq!(result.status, BatchStatus::Forbidden);
    assert_eq!(
        result.messages,
        vec!["Only an approved import agent can import works.".to_string()]
    );
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_item_without_urls_is_empty_request() {
    let importer = BatchImporter::new(
        MockFetcher::new(),
        MemoryWorkStore::new(),
        AllowAllAgents,
        NoopNotifier,
    );

    let request = ImportRequest::new(vec![ImportItem::default()]);
    let result = importer.import("archivist", &request).await;

    let item = &result.works[0];
    assert_eq!(item.status, ItemStatus::EmptyRequest);
    assert_eq!(
        item.messages,
        vec!["This work doesn't contain chapter_urls. Works can only be imported from publicly-accessible URLs.".to_string()]
    );
}

#[tokio::test]
async fn test_item_over_chapter_url_cap_is_rejected() {
    let importer = BatchImporter::new(
        MockFetcher::new(),
        MemoryWorkStore::new(),
        AllowAllAgents,
        NoopNotifier,
    );

    let urls: Vec<String> = (1..=201)
        .map(|n| format!("http://a.example.org/chapter/{n}"))
        .collect();
    let request = ImportRequest::new(vec![ImportItem::from_chapter_urls(urls)]);
    let result = importer.import("archivist", &request).await;

    let item = &result.works[0];
    assert_eq!(item.status, ItemStatus::TooManyRequests);
    assert_eq!(
        item.messages,
        vec!["This work contains too many chapter URLs. A maximum of 200 chapters can be imported per work.".to_string()]
    );
}

#[tokio::test]
async fn test_persistence_failure_is_isolated() {
    let store = MemoryWorkStore::new();
    store.fail_title("Doomed");

    let fetcher = MockFetcher::new()
        .with_body("http://a.example.org/fine", page("Fine", "Readable text."))
        .with_body("http://a.example.org/doomed", page("Doomed", "Also readable."));
    let importer = BatchImporter::new(fetcher, store, AllowAllAgents, NoopNotifier);

    let request = ImportRequest::new(vec![
        ImportItem::from_chapter_urls(["http://a.example.org/doomed"]),
        ImportItem::from_chapter_urls(["http://a.example.org/fine"]),
    ]);
    let result = importer.import("archivist", &request).await;

    assert_eq!(result.works[0].status, ItemStatus::Error);
    assert!(result.works[0].messages.iter().any(|m| m.contains("rejected")));
    assert_eq!(result.works[1].status, ItemStatus::Created);
    assert_eq!(importer.store().work_count(), 1);
}

#[tokio::test]
async fn test_deadline_marks_remaining_items_not_attempted() {
    let importer = BatchImporter::new(
        MockFetcher::new(),
        MemoryWorkStore::new(),
        AllowAllAgents,
        NoopNotifier,
    )
    .with_limits(ImportLimits::default().with_request_deadline(Duration::ZERO));

    let request = ImportRequest::new(vec![
        ImportItem::from_chapter_urls(["http://a.example.org/one"]),
        ImportItem::from_chapter_urls(["http://a.example.org/two"]),
    ]);
    let result = importer.import("archivist", &request).await;

    assert_eq!(result.works.len(), 2, "deadline never drops items");
    for item in &result.works {
        assert_eq!(item.status, ItemStatus::NotAttempted);
        assert!(item.messages[0].contains("deadline"));
    }
    assert_eq!(result.status, BatchStatus::BadRequest);
}

#[tokio::test]
async fn test_journal_import_sends_claim_emails() {
    let entry_url = "http://someuser.dreamwidth.org/1234.html";
    let canonical = "http://someuser.dreamwidth.org/1234.html?format=light";
    let fetcher = MockFetcher::new().with_body(
        canonical,
        r#"<html><head><title>someuser: Night Shift</title></head><body>
            <div class="contents"><p>The entry text of the story.</p></div>
        </body></html>"#,
    );

    let notifier = RecordingNotifier::new();
    let importer = BatchImporter::new(
        fetcher,
        MemoryWorkStore::new(),
        AllowAllAgents,
        notifier.clone(),
    );

    let request =
        ImportRequest::new(vec![ImportItem::from_chapter_urls([entry_url])]).with_claim_emails();
    let result = importer.import("archivist", &request).await;

    assert_eq!(result.works[0].status, ItemStatus::Created);
    let notified = notifier.notified();
    assert_eq!(notified.len(), 1);
    assert_eq!(notified[0].name, "someuser");
    assert_eq!(notified[0].email, "someuser@dreamwidth.org");
    assert!(result
        .messages
        .iter()
        .any(|m| m == "Claim emails sent to someuser."));
}

#[tokio::test]
async fn test_created_work_records_source_url() {
    let url = "http://a.example.org/one";
    let fetcher = MockFetcher::new().with_body(url, page("One", "Story text one."));
    let importer = BatchImporter::new(
        fetcher,
        MemoryWorkStore::new(),
        AllowAllAgents,
        NoopNotifier,
    );

    let request = ImportRequest::new(vec![ImportItem::from_chapter_urls([url])]);
    let first = importer.import("archivist", &request).await;
    assert_eq!(first.works[0].status, ItemStatus::Created);
    assert_eq!(
        first.messages,
        vec!["All works were successfully imported.".to_string()]
    );

    // A second import of the same URL must find the stored work.
    let second = importer.import("archivist", &request).await;
    assert_eq!(second.works[0].status, ItemStatus::Found);
    assert_eq!(importer.store().work_count(), 1);
}
