//! In-memory drafts produced by extraction, before persistence.

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// The tag vocabularies a work can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCategory {
    Fandom,
    Warning,
    Character,
    Rating,
    Relationship,
    Category,
    Freeform,
}

impl TagCategory {
    /// All categories, in display order.
    pub const ALL: [TagCategory; 7] = [
        TagCategory::Fandom,
        TagCategory::Warning,
        TagCategory::Character,
        TagCategory::Rating,
        TagCategory::Relationship,
        TagCategory::Category,
        TagCategory::Freeform,
    ];
}

/// Tag sets keyed by category.
///
/// Insertion normalizes whitespace and drops case-insensitive duplicates;
/// within a category, tags keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagSets(IndexMap<TagCategory, IndexSet<String>>);

impl TagSets {
    /// Create an empty tag collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one tag into a category, normalized and deduplicated.
    pub fn insert(&mut self, category: TagCategory, tag: impl Into<String>) {
        let tag = normalize_tag(&tag.into());
        if tag.is_empty() {
            return;
        }
        let set = self.0.entry(category).or_default();
        if !set.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            set.insert(tag);
        }
    }

    /// Insert a comma-delimited tag string, skipping the "None" placeholder
    /// some archives emit.
    pub fn insert_delimited(&mut self, category: TagCategory, tags: &str) {
        if tags.trim().eq_ignore_ascii_case("none") {
            return;
        }
        for tag in tags.split(',') {
            self.insert(category, tag);
        }
    }

    /// Replace the whole category with a comma-delimited tag string.
    pub fn replace_delimited(&mut self, category: TagCategory, tags: &str) {
        self.0.shift_remove(&category);
        self.insert_delimited(category, tags);
    }

    /// Tags in a category, in insertion order.
    pub fn get(&self, category: TagCategory) -> Vec<&str> {
        self.0
            .get(&category)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Fold another collection into this one.
    pub fn union(&mut self, other: TagSets) {
        for (category, tags) in other.0 {
            for tag in tags {
                self.insert(category, tag);
            }
        }
    }

    /// Total number of tags across all categories.
    pub fn len(&self) -> usize {
        self.0.values().map(IndexSet::len).sum()
    }

    /// True if no tags are present.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(IndexSet::is_empty)
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One extracted chapter. Order within a work is crawl order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChapterDraft {
    /// Chapter title, if the source exposes one
    pub title: Option<String>,

    /// Cleaned chapter markup
    pub content: String,

    /// Author's notes preceding the chapter
    pub notes: Option<String>,

    /// End notes following the chapter
    pub end_notes: Option<String>,
}

impl ChapterDraft {
    /// Create a chapter from cleaned content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Set the chapter title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// True if the chapter carries any visible content.
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// An author inferred from the source site, used to drive claim
/// notifications. Not persisted by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalAuthor {
    pub name: String,
    pub email: String,
}

impl ExternalAuthor {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A not-yet-persisted work assembled from extracted pages plus caller
/// overrides.
///
/// A draft with zero chapters, or whose chapters are all empty once
/// cleaned, must never be persisted; stores reject it with
/// [`crate::error::StoreError::EmptyDraft`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkDraft {
    pub title: String,
    pub summary: Option<String>,
    pub notes: Option<String>,

    /// Chapters in crawl order. Non-empty for a persistable draft.
    pub chapters: Vec<ChapterDraft>,

    pub tags: TagSets,

    /// Best-effort last-revision timestamp from the source.
    pub revised_at: Option<DateTime<Utc>>,

    pub complete: bool,
    pub restricted: bool,

    /// The source URL recorded for future exact-match dedup lookups.
    pub imported_from_url: Option<String>,

    pub external_authors: Vec<ExternalAuthor>,
}

impl WorkDraft {
    /// Create an empty draft with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            complete: true,
            ..Default::default()
        }
    }

    /// True if at least one chapter has visible content.
    pub fn has_content(&self) -> bool {
        self.chapters.iter().any(ChapterDraft::has_content)
    }

    /// True if the draft satisfies the persistence invariant.
    pub fn is_persistable(&self) -> bool {
        !self.chapters.is_empty() && self.has_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_normalize_and_dedupe() {
        let mut tags = TagSets::new();
        tags.insert(TagCategory::Fandom, "  Due   South ");
        tags.insert(TagCategory::Fandom, "due south");
        tags.insert(TagCategory::Fandom, "");

        assert_eq!(tags.get(TagCategory::Fandom), vec!["Due South"]);
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_delimited_insert_skips_none() {
        let mut tags = TagSets::new();
        tags.insert_delimited(TagCategory::Freeform, "None");
        assert!(tags.is_empty());

        tags.insert_delimited(TagCategory::Freeform, "Angst, Fluff , Angst");
        assert_eq!(tags.get(TagCategory::Freeform), vec!["Angst", "Fluff"]);
    }

    #[test]
    fn test_replace_delimited() {
        let mut tags = TagSets::new();
        tags.insert(TagCategory::Character, "Old Character");
        tags.replace_delimited(TagCategory::Character, "New One, New Two");

        assert_eq!(tags.get(TagCategory::Character), vec!["New One", "New Two"]);
    }

    #[test]
    fn test_draft_persistability() {
        let mut draft = WorkDraft::new("Title");
        assert!(!draft.is_persistable());

        draft.chapters.push(ChapterDraft::new("   "));
        assert!(!draft.is_persistable());

        draft.chapters.push(ChapterDraft::new("<p>Actual text</p>"));
        assert!(draft.is_persistable());
    }

    #[test]
    fn test_union_preserves_order() {
        let mut a = TagSets::new();
        a.insert(TagCategory::Warning, "Violence");

        let mut b = TagSets::new();
        b.insert(TagCategory::Warning, "violence");
        b.insert(TagCategory::Warning, "Major Character Death");

        a.union(b);
        assert_eq!(
            a.get(TagCategory::Warning),
            vec!["Violence", "Major Character Death"]
        );
    }
}
