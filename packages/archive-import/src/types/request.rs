//! Batch request types accepted from the caller.

use serde::{Deserialize, Serialize};

use crate::types::work::ExternalAuthor;

/// One batch of import or search items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportRequest {
    /// Independent items; one bad item never affects the others.
    #[serde(default)]
    pub items: Vec<ImportItem>,

    /// Send claim notifications to external authors of successfully
    /// created works once the batch completes.
    #[serde(default)]
    pub send_claim_emails: bool,
}

impl ImportRequest {
    /// Build a request from items.
    pub fn new(items: Vec<ImportItem>) -> Self {
        Self {
            items,
            send_claim_emails: false,
        }
    }

    /// Request claim notifications for created works.
    pub fn with_claim_emails(mut self) -> Self {
        self.send_claim_emails = true;
        self
    }
}

/// One requested work.
///
/// Import items carry `chapter_urls`; search items carry `original_urls`
/// and/or `title`/`creators`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportItem {
    /// Caller-supplied correlation id, echoed back in the item result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Chapter URLs to crawl, in chapter order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chapter_urls: Vec<String>,

    /// Original source URLs for an exact-match search.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub original_urls: Vec<String>,

    /// Exact title, for search or as an import override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Exact creator pseud or login, ANDed into a title search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creators: Option<String>,

    /// Caller-supplied metadata overriding or supplementing extraction.
    #[serde(flatten)]
    pub metadata: ItemMetadata,
}

impl ImportItem {
    /// An import item for a list of chapter URLs.
    pub fn from_chapter_urls(urls: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            chapter_urls: urls.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// A search item for a list of original source URLs.
    pub fn from_original_urls(urls: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            original_urls: urls.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// A search item matching an exact title, optionally ANDed with an
    /// exact creator.
    pub fn from_title(title: impl Into<String>, creators: Option<&str>) -> Self {
        Self {
            title: Some(title.into()),
            creators: creators.map(str::to_owned),
            ..Default::default()
        }
    }

    /// Set the caller correlation id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the override metadata.
    pub fn with_metadata(mut self, metadata: ItemMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Caller-supplied overrides applied on top of whatever extraction found.
///
/// Tag fields are comma-delimited strings, matching the wire format of the
/// original API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fandoms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_tags: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Restrict the work to logged-in users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted: Option<bool>,

    /// Mark the work complete or in progress, overriding whatever the
    /// source page claims.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,

    /// Caller tags replace extracted tags per category (default true);
    /// otherwise they union.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_tags: Option<bool>,

    /// Run the free-text tag scanner over notes/summaries (default true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detect_tags: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_author_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_coauthor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_coauthor_email: Option<String>,
}

impl ItemMetadata {
    pub fn detect_tags_enabled(&self) -> bool {
        self.detect_tags.unwrap_or(true)
    }

    pub fn override_tags_enabled(&self) -> bool {
        self.override_tags.unwrap_or(true)
    }

    /// External authors named by the caller, author before coauthor.
    pub fn external_authors(&self) -> Vec<ExternalAuthor> {
        let mut authors = Vec::new();
        if let (Some(name), Some(email)) =
            (&self.external_author_name, &self.external_author_email)
        {
            authors.push(ExternalAuthor::new(name, email));
        }
        if let (Some(name), Some(email)) =
            (&self.external_coauthor_name, &self.external_coauthor_email)
        {
            authors.push(ExternalAuthor::new(name, email));
        }
        authors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_deserializes_wire_format() {
        let json = r#"{
            "id": "123",
            "chapter_urls": ["http://example.com/1", "http://example.com/2"],
            "fandoms": "Testing",
            "warnings": "None",
            "external_author_name": "bar",
            "external_author_email": "bar@foo.com"
        }"#;

        let item: ImportItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id.as_deref(), Some("123"));
        assert_eq!(item.chapter_urls.len(), 2);
        assert_eq!(item.metadata.fandoms.as_deref(), Some("Testing"));
        assert_eq!(
            item.metadata.external_authors(),
            vec![ExternalAuthor::new("bar", "bar@foo.com")]
        );
    }

    #[test]
    fn test_flag_defaults() {
        let metadata = ItemMetadata::default();
        assert!(metadata.detect_tags_enabled());
        assert!(metadata.override_tags_enabled());

        let metadata = ItemMetadata {
            detect_tags: Some(false),
            ..Default::default()
        };
        assert!(!metadata.detect_tags_enabled());
    }
}
