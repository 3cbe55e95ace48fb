//! Extractor for DeviantArt deviation pages.
//!
//! A deviation is either an image (imported as an embedded img tag) or
//! literature (imported as text). Artist commentary below the piece
//! becomes the chapter notes.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::clean::clean_storytext;
use super::dates::convert_revised_at;
use super::scan::scan_text_for_meta;
use super::{find_element, PageDraft, SiteExtractor};
use crate::types::work::{ChapterDraft, TagCategory};

pub struct DeviantArtExtractor;

impl SiteExtractor for DeviantArtExtractor {
    fn parse(&self, document: &str, detect_tags: bool) -> PageDraft {
        let html = Html::parse_document(document);

        let mut title = page_title(&html);
        if let Some(heading) = heading_title(&html) {
            title = Some(heading);
        }

        let content = image_content(&html)
            .or_else(|| literature_content(&html, title.as_deref()))
            .unwrap_or_default();

        let notes = artist_comments(&html);

        let mut draft = PageDraft {
            revised_at: deviation_date(&html),
            ..PageDraft::default()
        };

        for tag in category_tags(&html) {
            draft.tags.insert(TagCategory::Freeform, tag);
        }

        if let Some(ref notes_text) = notes {
            let scan = scan_text_for_meta(notes_text, detect_tags);
            draft.summary = scan.summary;
            draft.tags.union(scan.tags);
        }

        let mut chapter = ChapterDraft::new(content);
        chapter.notes = notes;
        draft.chapter = chapter;
        draft.title = title;
        draft
    }

    fn name(&self) -> &'static str {
        "deviantart"
    }
}

fn page_title(html: &Html) -> Option<String> {
    let raw = find_element(html, "title")
        .ok()
        .map(|t| t.text().collect::<String>())?;
    let suffix = Regex::new(r"(?i)\s*on deviantart\s*$").unwrap();
    let title = suffix.replace(raw.trim(), "").into_owned();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// The on-page heading is more reliable than the document title, which
/// appends the artist name. Links classed `u` are artist links, not titles.
fn heading_title(html: &Html) -> Option<String> {
    let selector = Selector::parse("div.dev-title-container h1 a").unwrap();
    html.select(&selector)
        .find(|a| !a.value().classes().any(|c| c == "u"))
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn image_content(html: &Html) -> Option<String> {
    let img = find_element(html, "div.dev-view-deviation img.dev-content-full").ok()?;
    let src = img.value().attr("src")?;
    Some(format!("<center><img src=\"{src}\"></center>"))
}

fn literature_content(html: &Html, title: Option<&str>) -> Option<String> {
    let container = find_element(html, ".grf-indent > div:nth-child(1)").ok()?;

    let mut kept = String::new();
    for child in container.children() {
        if let Some(el) = ElementRef::wrap(child) {
            let name = el.value().name();
            if name == "h1" {
                let text = el.text().collect::<String>();
                if Some(text.trim()) == title {
                    continue;
                }
            }
            if name == "small" && el.inner_html().contains("class=\"u\"") {
                continue;
            }
            kept.push_str(&el.html());
        } else if let Some(text) = child.value().as_text() {
            kept.push_str(&text.text);
        }
    }

    let cleaned = clean_storytext(&kept);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn artist_comments(html: &Html) -> Option<String> {
    let text = find_element(html, "div.text-ctrl div.text")
        .ok()
        .map(|el| clean_storytext(&el.inner_html()))?;
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn category_tags(html: &Html) -> Vec<String> {
    let selector = Selector::parse("div.dev-about-cat-cc a.h").unwrap();
    html.select(&selector)
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn deviation_date(html: &Html) -> Option<chrono::DateTime<chrono::Utc>> {
    let span = find_element(html, "div.dev-right-bar-content span[title]").ok()?;
    let date_text = span.value().attr("title")?;
    convert_revised_at(date_text)
}
