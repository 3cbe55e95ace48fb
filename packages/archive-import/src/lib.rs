//! Batch import of externally hosted works.
//!
//! The pipeline takes a batch of source URLs and turns each into a
//! persisted work: classify the source site, refuse sites that forbid
//! scraping, check whether the work was already imported, download its
//! pages, extract story text and metadata with a site-specific adapter,
//! fold in caller overrides, and persist. Items in a batch are isolated;
//! one failed item degrades the batch status but never stops the rest.
//!
//! # Architecture
//!
//! - [`routing::SourceRouter`] classifies a URL to an adapter.
//! - [`crawler::ChapterCrawler`] downloads pages, expanding chaptered
//!   archives and handling journal interstitials.
//! - [`adapters`] parse downloaded pages into drafts.
//! - [`dedup::DedupSearchEngine`] finds already-imported works.
//! - [`orchestrator::BatchImporter`] runs whole batches across the
//!   collaborator seams in [`traits`].
//!
//! # Example
//!
//! ```no_run
//! use archive_import::orchestrator::BatchImporter;
//! use archive_import::stores::MemoryWorkStore;
//! use archive_import::testing::AllowAllAgents;
//! use archive_import::traits::{HttpFetcher, NoopNotifier, PoliteFetcher};
//! use archive_import::types::{ImportItem, ImportRequest};
//!
//! # async fn run() {
//! let importer = BatchImporter::new(
//!     PoliteFetcher::new(HttpFetcher::new()),
//!     MemoryWorkStore::new(),
//!     AllowAllAgents,
//!     NoopNotifier,
//! );
//!
//! let request = ImportRequest::new(vec![ImportItem::from_chapter_urls([
//!     "http://some-author.dreamwidth.org/1234.html",
//! ])]);
//! let result = importer.import("archivist", &request).await;
//! println!("{}", result.messages.join("\n"));
//! # }
//! ```

pub mod adapters;
pub mod config;
pub mod crawler;
pub mod dedup;
pub mod error;
pub mod orchestrator;
pub mod routing;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

pub use adapters::{clean_storytext, convert_revised_at, extract_work, scan_text_for_meta};
pub use adapters::{MetaScan, PageDraft, SiteExtractor};
pub use config::ImportLimits;
pub use crawler::{ChapterCrawler, FANFICTIONNET_BLOCKED, QUOTEV_BLOCKED};
pub use dedup::{DedupSearchEngine, SearchOutcome};
pub use error::{FetchError, ImportError, StoreError};
pub use orchestrator::BatchImporter;
pub use routing::{AdapterId, SourceRouter};
pub use stores::MemoryWorkStore;
pub use traits::{
    AgentAuthorizer, ClaimNotifier, Fetcher, HttpFetcher, NoopNotifier, PoliteFetcher, StoredWork,
    WorkStore,
};
pub use types::{
    import_summary_message, BatchResult, BatchStatus, ChapterDraft, ExternalAuthor, FoundWork,
    ImportItem, ImportRequest, ItemMetadata, ItemResult, ItemStatus, TagCategory, TagSets,
    WorkDraft,
};
