//! Typed errors for the import library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur while processing a single import item.
///
/// Both variants are item-fatal: the orchestrator catches them at the item
/// boundary and converts them to an `error` result without aborting the
/// batch.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Downloading the work failed
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// The store rejected the draft
    #[error("{0}")]
    Store(#[from] StoreError),
}

/// Errors that can occur while downloading pages from a source site.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The download exceeded its wall-clock budget
    #[error("Import has timed out. This may be due to connectivity problems with the source site. Please try again in a few minutes.")]
    Timeout { url: String },

    /// The source site refuses imports as a matter of policy.
    ///
    /// Carries the fixed user-facing message; no internal diagnostics.
    #[error("{message}")]
    BlockedSite { message: String },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The site returned nothing usable
    #[error("no story text could be downloaded from \"{url}\"")]
    EmptyResponse { url: String },
}

/// Errors raised while locating structure inside a downloaded document.
///
/// Never surfaced to callers: adapters degrade to a partial draft and keep
/// going.
#[derive(Debug, Error)]
pub enum ParseError {
    /// An expected structural element was absent
    #[error("expected element not found: {selector}")]
    MissingElement { selector: String },

    /// A selector failed to compile
    #[error("invalid selector: {selector}")]
    Selector { selector: String },
}

/// Errors from the persistent work store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The draft has no chapters or no usable content
    #[error("the imported work has no chapters or no content and cannot be saved")]
    EmptyDraft,

    /// The store refused the draft
    #[error("the store rejected this work: {reason}")]
    Rejected { reason: String },

    /// Backend failure
    #[error("storage error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias for item-level import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Result type alias for download operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
