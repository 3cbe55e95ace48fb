//! Extractor for eFiction-based archives.
//!
//! eFiction installs share a common page shape: a `pagetitle` heading, an
//! infobox with labeled metadata runs, `div.chapter` story blocks, and
//! labeled notes sections. The markup varies by skin but the labels are
//! stable, so metadata comes out of text matching rather than selectors.

use regex::Regex;
use scraper::{Html, Selector};

use super::clean::clean_storytext;
use super::dates::convert_revised_at;
use super::{find_element, PageDraft, SiteExtractor};
use crate::types::work::{ChapterDraft, TagCategory};

pub struct EfictionExtractor;

impl SiteExtractor for EfictionExtractor {
    fn parse(&self, document: &str, _detect_tags: bool) -> PageDraft {
        let html = Html::parse_document(document);
        let mut draft = PageDraft::default();

        let chapter_selector = Selector::parse("div.chapter").unwrap();
        let content = html
            .select(&chapter_selector)
            .map(|el| el.inner_html())
            .collect::<Vec<_>>()
            .join("\n");
        let mut chapter = ChapterDraft::new(clean_storytext(&content));
        chapter.title = chapter_title(&html);

        draft.title = work_title(&html);

        if let Some(infobox) = infobox_html(&html) {
            apply_infobox(&infobox, &mut draft);
        }

        apply_notes(&html, &mut draft, &mut chapter);

        draft.chapter = chapter;
        draft
    }

    fn name(&self) -> &'static str {
        "efiction"
    }
}

fn work_title(html: &Html) -> Option<String> {
    find_element(html, "div#pagetitle a")
        .ok()
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn chapter_title(html: &Html) -> Option<String> {
    let raw = find_element(html, ".chaptertitle")
        .ok()
        .map(|el| el.text().collect::<String>())?;
    let byline = Regex::new(r"\sby .*$").unwrap();
    let title = byline.replace(raw.trim(), "").trim().to_string();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

fn infobox_html(html: &Html) -> Option<String> {
    find_element(html, ".infobox .content")
        .ok()
        .map(|el| el.inner_html())
}

fn apply_infobox(infobox: &str, draft: &mut PageDraft) {
    // Summary sits inside markup, everything else is matched on the
    // flattened text between its label and the next label.
    let summary_re = Regex::new(r"(?s)Summary:.*?>(.*?)<br>").unwrap();
    if let Some(caps) = summary_re.captures(infobox) {
        let summary = clean_storytext(&caps[1]);
        if !summary.is_empty() {
            draft.summary = Some(summary);
        }
    }

    let text = Html::parse_fragment(infobox)
        .root_element()
        .text()
        .collect::<String>();
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");

    for (pattern, category) in [
        (r"Categories: (.*?) Characters:", TagCategory::Freeform),
        (r"Characters: (.*?) Genres:", TagCategory::Character),
        (r"Genres: (.*?) Warnings:", TagCategory::Freeform),
        (r"Warnings: (.*?) Challenges:", TagCategory::Freeform),
    ] {
        let re = Regex::new(pattern).unwrap();
        if let Some(caps) = re.captures(&flat) {
            draft.tags.insert_delimited(category, caps[1].trim());
        }
    }

    let completed_re = Regex::new(r"Completed: (Yes|No)").unwrap();
    if let Some(caps) = completed_re.captures(&flat) {
        draft.complete = Some(&caps[1] == "Yes");
    }

    let read_re = Regex::new(r"Read: (\d+)").unwrap();
    if let Some(caps) = read_re.captures(&flat) {
        draft.notes = Some(format!("Imported with a read count of {}.", &caps[1]));
    }

    let updated_re = Regex::new(r"Updated: ([\d/.-]+)").unwrap();
    if let Some(caps) = updated_re.captures(&flat) {
        draft.revised_at = convert_revised_at(&reorder_short_date(&caps[1]));
    }
}

/// eFiction's default skin prints dates as dd/mm/yy, which the generic
/// parser would read as a US-style month-first date.
fn reorder_short_date(date: &str) -> String {
    let short = Regex::new(r"^(\d\d)/(\d\d)/(\d\d)$").unwrap();
    short.replace(date, "20${3}-${2}-${1}").into_owned()
}

fn apply_notes(html: &Html, draft: &mut PageDraft, chapter: &mut ChapterDraft) {
    let selector = Selector::parse(".notes").unwrap();
    for el in html.select(&selector) {
        let text = clean_storytext(&el.inner_html());
        if let Some(body) = labeled(&text, "Story Notes:") {
            draft.notes = Some(body);
        } else if let Some(body) = labeled(&text, "Author's Chapter Notes:")
            .or_else(|| labeled(&text, "Chapter Notes:"))
            .or_else(|| labeled(&text, "Author's Notes:"))
        {
            chapter.notes = Some(body);
        } else if let Some(body) = labeled(&text, "End Notes:") {
            chapter.end_notes = Some(body);
        }
    }
}

fn labeled(text: &str, label: &str) -> Option<String> {
    let body = text.strip_prefix(label)?.trim().to_string();
    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    const PAGE: &str = r#"<html><body>
        <div id="pagetitle"><a href="viewstory.php?sid=42">The Siege</a> by <a href="viewuser.php?uid=7">archivist</a></div>
        <div class="infobox"><div class="content">
            <b>Summary:</b> A city holds its breath.<br>
            Categories: Action, Drama Characters: Mara, Ten Genres: Adventure Warnings: None Challenges: None
            Completed: No Read: 1204 Updated: 09/06/10
        </div></div>
        <div class="notes">Story Notes: Written for the siege challenge.</div>
        <div class="chaptertitle">1. The Walls by archivist</div>
        <div class="chapter"><p>The gates closed at dawn.</p></div>
        <div class="notes">End Notes: Thanks for reading.</div>
    </body></html>"#;

    #[test]
    fn test_infobox_fields() {
        let draft = EfictionExtractor.parse(PAGE, false);

        assert_eq!(draft.title.as_deref(), Some("The Siege"));
        assert_eq!(draft.summary.as_deref(), Some("A city holds its breath."));
        assert_eq!(
            draft.tags.get(TagCategory::Freeform),
            vec!["Action", "Drama", "Adventure"],
            "None warnings are skipped"
        );
        assert_eq!(draft.tags.get(TagCategory::Character), vec!["Mara", "Ten"]);
        assert_eq!(draft.complete, Some(false));
    }

    #[test]
    fn test_short_date_reordered_day_first() {
        let draft = EfictionExtractor.parse(PAGE, false);
        let revised = draft.revised_at.unwrap();
        assert_eq!(
            (revised.year(), revised.month(), revised.day()),
            (2010, 6, 9)
        );
    }

    #[test]
    fn test_notes_split_between_work_and_chapter() {
        let draft = EfictionExtractor.parse(PAGE, false);
        assert_eq!(
            draft.notes.as_deref(),
            Some("Written for the siege challenge.")
        );
        assert_eq!(
            draft.chapter.end_notes.as_deref(),
            Some("Thanks for reading.")
        );
    }

    #[test]
    fn test_chapter_title_drops_byline() {
        let draft = EfictionExtractor.parse(PAGE, false);
        assert_eq!(draft.chapter.title.as_deref(), Some("1. The Walls"));
        assert!(draft.chapter.content.contains("The gates closed at dawn."));
    }
}
