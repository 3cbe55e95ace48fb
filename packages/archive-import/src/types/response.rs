//! Per-item and batch-level results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::request::ImportItem;

/// Outcome of one item. Closed set; serialized in the original API's
/// snake_case form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Ok,
    Created,
    Found,
    NotFound,
    EmptyRequest,
    TooManyRequests,
    /// The batch deadline fired before this item was started.
    NotAttempted,
    Error,
}

impl ItemStatus {
    /// Statuses counted as successes when synthesizing the batch message.
    pub fn is_success(self) -> bool {
        matches!(self, ItemStatus::Ok | ItemStatus::Created | ItemStatus::Found)
    }
}

/// Outcome of the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Ok,
    BadRequest,
    Forbidden,
    EmptyRequest,
    TooManyRequests,
}

impl BatchStatus {
    /// The HTTP status a transport layer should map this to. Item-level
    /// partial failure stays 200 because a response body was produced.
    pub fn http_status(self) -> u16 {
        match self {
            BatchStatus::Ok | BatchStatus::BadRequest => 200,
            BatchStatus::EmptyRequest | BatchStatus::TooManyRequests => 400,
            BatchStatus::Forbidden => 403,
        }
    }
}

/// An existing archive work matched by a dedup lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundWork {
    pub work_id: Uuid,
    pub archive_url: String,
    pub created_at: DateTime<Utc>,
}

/// Result for one item of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResult {
    pub status: ItemStatus,

    /// Canonical archive URL, when the work was created or found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_url: Option<String>,

    /// Caller correlation id, echoed back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,

    /// The source URL this result refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,

    /// The original search item, echoed back for search results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_search: Option<ImportItem>,

    /// Matched existing works, for `found` results.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_results: Vec<FoundWork>,

    pub messages: Vec<String>,
}

impl ItemResult {
    /// Create a result with a status and no detail.
    pub fn new(status: ItemStatus) -> Self {
        Self {
            status,
            archive_url: None,
            original_id: None,
            original_url: None,
            original_search: None,
            search_results: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Add a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }
}

/// Aggregated response for a batch call.
///
/// `works.len()` always equals the number of accepted items; it is empty
/// only when the whole batch was rejected before per-item processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub status: BatchStatus,
    pub messages: Vec<String>,
    pub works: Vec<ItemResult>,
}

impl BatchResult {
    /// A batch rejected before any item was processed.
    pub fn rejected(status: BatchStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            messages: vec![message.into()],
            works: Vec::new(),
        }
    }
}

/// The aggregate message for an import batch, from the success/error split.
pub fn import_summary_message(any_success: bool, any_errors: bool) -> &'static str {
    if any_success && any_errors {
        "At least one work was not imported. Please check individual work responses for further information."
    } else if !any_success && any_errors {
        "None of the works were imported. Please check individual work responses for further information."
    } else {
        "All works were successfully imported."
    }
}
