//! Configuration for crawling and batch processing.

use std::time::Duration;

/// Resource ceilings for a batch import.
///
/// These protect the archive and the source sites, independent of whatever
/// the source claims about itself. They are loaded once by the host
/// application and never mutated at request time.
#[derive(Debug, Clone)]
pub struct ImportLimits {
    /// Hard cap on chapters fetched for one work, whether from an explicit
    /// URL list or a chaptered-site crawl. Default: 200.
    pub max_chapter_count: usize,

    /// Maximum number of items accepted in one batch call. Default: 200.
    pub max_batch_items: usize,

    /// Wall-clock budget for downloading one work (all of its pages).
    /// Default: 60 seconds.
    pub download_timeout: Duration,

    /// Length in characters of the content slice used to detect a source
    /// that serves the same chapter twice. Default: 10_000.
    pub duplicate_fingerprint_len: usize,

    /// Optional deadline for the whole batch call. Items not yet started
    /// when it fires are reported as `not_attempted`, never dropped.
    pub request_deadline: Option<Duration>,
}

impl Default for ImportLimits {
    fn default() -> Self {
        Self {
            max_chapter_count: 200,
            max_batch_items: 200,
            download_timeout: Duration::from_secs(60),
            duplicate_fingerprint_len: 10_000,
            request_deadline: None,
        }
    }
}

impl ImportLimits {
    /// Create limits with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-work chapter cap.
    pub fn with_max_chapter_count(mut self, max: usize) -> Self {
        self.max_chapter_count = max;
        self
    }

    /// Set the batch item ceiling.
    pub fn with_max_batch_items(mut self, max: usize) -> Self {
        self.max_batch_items = max;
        self
    }

    /// Set the per-work download budget.
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Set the duplicate-detection fingerprint length.
    pub fn with_duplicate_fingerprint_len(mut self, len: usize) -> Self {
        self.duplicate_fingerprint_len = len;
        self
    }

    /// Set the batch request deadline.
    pub fn with_request_deadline(mut self, deadline: Duration) -> Self {
        self.request_deadline = Some(deadline);
        self
    }
}
