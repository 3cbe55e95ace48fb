//! Data types for import requests, extracted drafts, and batch responses.

pub mod request;
pub mod response;
pub mod work;

pub use request::{ImportItem, ImportRequest, ItemMetadata};
pub use response::{
    import_summary_message, BatchResult, BatchStatus, FoundWork, ItemResult, ItemStatus,
};
pub use work::{ChapterDraft, ExternalAuthor, TagCategory, TagSets, WorkDraft};
