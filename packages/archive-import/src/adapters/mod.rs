//! Per-site metadata extraction.
//!
//! Each source site gets an extractor that knows where that site keeps its
//! story text, title, summary, tags, and dates. Extractors are pure
//! functions over a downloaded page; all network traffic happens in the
//! crawler before extraction starts.

pub mod clean;
pub mod dates;
pub mod deviantart;
pub mod efiction;
pub mod generic;
pub mod journal;
pub mod scan;

pub use clean::{clean_storytext, strip_site_prefix};
pub use dates::convert_revised_at;
pub use scan::{scan_text_for_meta, MetaScan};

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::ParseError;
use crate::routing::AdapterId;
use crate::types::work::{ChapterDraft, TagSets, WorkDraft};

/// Find the first element matching a selector.
///
/// Extraction never fails outright; callers drop the error and degrade to
/// a partial draft, so the miss is logged here.
pub(crate) fn find_element<'a>(html: &'a Html, css: &str) -> Result<ElementRef<'a>, ParseError> {
    let selector = Selector::parse(css).map_err(|_| ParseError::Selector {
        selector: css.to_string(),
    })?;
    html.select(&selector).next().ok_or_else(|| {
        debug!(selector = css, "expected element not found");
        ParseError::MissingElement {
            selector: css.to_string(),
        }
    })
}

/// Everything an extractor can recover from one downloaded page.
///
/// The chapter is always populated; work-level fields are filled only when
/// the page carries them.
#[derive(Debug, Default)]
pub struct PageDraft {
    pub chapter: ChapterDraft,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub tags: TagSets,
    pub revised_at: Option<DateTime<Utc>>,
    pub complete: Option<bool>,
}

/// Site-specific page parsing.
pub trait SiteExtractor: Send + Sync {
    /// Parse one downloaded page into a draft.
    fn parse(&self, document: &str, detect_tags: bool) -> PageDraft;

    fn name(&self) -> &'static str;
}

static DEVIANTART: deviantart::DeviantArtExtractor = deviantart::DeviantArtExtractor;
static EFICTION: efiction::EfictionExtractor = efiction::EfictionExtractor;
static GENERIC: generic::GenericExtractor = generic::GenericExtractor;
static LIVEJOURNAL: journal::JournalExtractor = journal::JournalExtractor::LiveJournal;
static DREAMWIDTH: journal::JournalExtractor = journal::JournalExtractor::Dreamwidth;

/// Select the extractor for a classified source.
///
/// Blocked sources never reach extraction, so they map to the generic
/// extractor rather than a variant of their own.
pub fn extractor_for(adapter: AdapterId) -> &'static dyn SiteExtractor {
    match adapter {
        AdapterId::DeviantArt => &DEVIANTART,
        AdapterId::Efiction => &EFICTION,
        AdapterId::LiveJournal => &LIVEJOURNAL,
        AdapterId::Dreamwidth => &DREAMWIDTH,
        AdapterId::TheArchive | AdapterId::Generic => &GENERIC,
        AdapterId::FanfictionNet | AdapterId::Quotev => &GENERIC,
    }
}

/// Assemble a work draft from the downloaded pages of one source.
///
/// The first page wins every work-level field; tags union across all
/// pages; chapters keep download order.
pub fn extract_work(
    adapter: AdapterId,
    seed_url: &str,
    pages: &[String],
    detect_tags: bool,
) -> WorkDraft {
    let extractor = extractor_for(adapter);
    let mut work = WorkDraft::new("");
    work.imported_from_url = Some(seed_url.to_string());

    for page in pages {
        let PageDraft {
            chapter,
            title,
            summary,
            notes,
            tags,
            revised_at,
            complete,
        } = extractor.parse(page, detect_tags);

        if work.title.is_empty() {
            if let Some(title) = title {
                work.title = title;
            }
        }
        if work.summary.is_none() {
            work.summary = summary;
        }
        if work.notes.is_none() {
            work.notes = notes;
        }
        if work.revised_at.is_none() {
            work.revised_at = revised_at;
        }
        if let Some(complete) = complete {
            work.complete = complete;
        }
        work.tags.union(tags);
        work.chapters.push(chapter);
    }

    work
}
