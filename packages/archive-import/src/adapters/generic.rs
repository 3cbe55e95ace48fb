//! Fallback extractor for sites without a dedicated adapter.
//!
//! Takes the whole document body as story text and relies on the metadata
//! scanner for everything else.

use scraper::Html;

use super::clean::{clean_storytext, strip_site_prefix};
use super::scan::scan_text_for_meta;
use super::{find_element, PageDraft, SiteExtractor};
use crate::types::work::ChapterDraft;

pub struct GenericExtractor;

impl SiteExtractor for GenericExtractor {
    fn parse(&self, document: &str, detect_tags: bool) -> PageDraft {
        let html = Html::parse_document(document);

        let content = find_element(&html, "body")
            .map(|body| clean_storytext(&body.inner_html()))
            .unwrap_or_default();

        let page_title = find_element(&html, "title")
            .ok()
            .map(|t| strip_site_prefix(&t.text().collect::<String>()))
            .filter(|t| !t.is_empty());

        let scan = scan_text_for_meta(&content, detect_tags);

        PageDraft {
            chapter: ChapterDraft::new(content),
            // An explicit Title: line in the text beats the page <title>.
            title: scan.title.or(page_title),
            summary: scan.summary,
            tags: scan.tags,
            ..PageDraft::default()
        }
    }

    fn name(&self) -> &'static str {
        "generic"
    }
}
