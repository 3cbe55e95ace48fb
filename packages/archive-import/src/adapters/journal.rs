//! Extractors for journal-style sites (LiveJournal and friends,
//! Dreamwidth).
//!
//! Journal entries are single pages wrapped in heavy site chrome; the work
//! here is finding the entry body and leaving the navigation behind.

use regex::Regex;
use scraper::{ElementRef, Html};

use super::clean::{clean_storytext, strip_site_prefix};
use super::dates::convert_revised_at;
use super::scan::scan_text_for_meta;
use super::{find_element, PageDraft, SiteExtractor};
use crate::traits::fetcher::Fetcher;
use crate::types::work::{ChapterDraft, ExternalAuthor};

#[derive(Clone, Copy)]
pub enum JournalExtractor {
    LiveJournal,
    Dreamwidth,
}

impl JournalExtractor {
    fn entry_body(&self, html: &Html) -> Option<String> {
        match self {
            JournalExtractor::LiveJournal => find_element(html, "article.b-singlepost-body")
                .ok()
                .map(|el| el.inner_html()),
            JournalExtractor::Dreamwidth => find_element(html, "div.contents")
                .ok()
                .map(children_without_chrome),
        }
    }

    fn revised_at_text(&self, html: &Html) -> Option<String> {
        let css = match self {
            JournalExtractor::LiveJournal => "time.b-singlepost-author-date",
            JournalExtractor::Dreamwidth => "span.date",
        };
        find_element(html, css)
            .ok()
            .map(|el| el.text().collect::<String>())
    }
}

/// Entry chrome classes that must not leak into story text.
const CHROME_CLASSES: &[&str] = &[
    "currents",
    "entry-management-links",
    "restrictions",
    "entry-title",
];

fn children_without_chrome(container: ElementRef) -> String {
    let mut kept = String::new();
    for child in container.children() {
        if let Some(el) = ElementRef::wrap(child) {
            let classes: Vec<&str> = el.value().classes().collect();
            if classes.iter().any(|c| CHROME_CLASSES.contains(c)) {
                continue;
            }
            if classes.contains(&"header") && classes.contains(&"inner") {
                continue;
            }
            kept.push_str(&el.html());
        } else if let Some(text) = child.value().as_text() {
            kept.push_str(&text.text);
        }
    }
    kept
}

impl SiteExtractor for JournalExtractor {
    fn parse(&self, document: &str, detect_tags: bool) -> PageDraft {
        let html = Html::parse_document(document);

        let raw = self
            .entry_body(&html)
            .or_else(|| find_element(&html, "body").ok().map(|b| b.inner_html()));
        let content = raw.map(|r| clean_storytext(&r)).unwrap_or_default();

        let page_title = find_element(&html, "title")
            .ok()
            .map(|t| strip_site_prefix(&t.text().collect::<String>()))
            .filter(|t| !t.is_empty());

        let revised_at = self
            .revised_at_text(&html)
            .and_then(|text| convert_revised_at(&text));

        let scan = scan_text_for_meta(&content, detect_tags);

        PageDraft {
            chapter: ChapterDraft::new(content),
            title: scan.title.or(page_title),
            summary: scan.summary,
            tags: scan.tags,
            revised_at,
            ..PageDraft::default()
        }
    }

    fn name(&self) -> &'static str {
        match self {
            JournalExtractor::LiveJournal => "lj",
            JournalExtractor::Dreamwidth => "dw",
        }
    }
}

/// Derive the external author of a journal entry from its URL.
///
/// Journal usernames live in the hostname, so no page parse is needed for
/// the name. The profile page is fetched for a published contact address;
/// when none is listed the conventional `user@site` address is assumed.
/// Community hostnames name the community, not the poster; the entry page
/// itself is fetched to recover the actual poster's username, and `None`
/// is returned only when that recovery fails.
pub async fn parse_author<F: Fetcher>(fetcher: &F, url: &str) -> Option<ExternalAuthor> {
    let host_re = Regex::new(
        r"^(?:https?://)?(?P<name>[^./]+)\.(?P<site>livejournal\.com|dreamwidth\.org|insanejournal\.com|journalfen\.net)",
    )
    .unwrap();
    let caps = host_re.captures(url)?;
    let mut name = caps.name("name")?.as_str().to_string();
    let site = caps.name("site")?.as_str().to_string();

    if name == "community" {
        name = community_poster(fetcher, url).await?;
    }

    let fallback = format!("{name}@{site}");
    let profile_url = format!("http://{name}.{site}/profile");
    let email = match fetcher.fetch(&profile_url).await {
        Ok(body) => contact_email(&body).unwrap_or(fallback),
        Err(_) => fallback,
    };

    Some(ExternalAuthor::new(name, email))
}

/// Recover the poster's username from a community entry page.
///
/// Community pages attribute each entry with a pair of user links; the
/// second one carries the poster's bolded username.
async fn community_poster<F: Fetcher>(fetcher: &F, url: &str) -> Option<String> {
    let body = fetcher.fetch(url).await.ok()?;
    let html = Html::parse_document(&body);
    let name = find_element(&html, "td span a:nth-of-type(2) b")
        .ok()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn contact_email(profile_html: &str) -> Option<String> {
    let html = Html::parse_document(profile_html);
    let contact = find_element(&html, "div.contact").ok()?;
    let text = contact.text().collect::<String>();
    let email_re = Regex::new(r"[\w.+-]+@[\w-]+(?:\.[\w-]+)+").unwrap();
    email_re.find(&text).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    #[test]
    fn test_dreamwidth_chrome_stripped() {
        let doc = r#"<html><body><div class="contents">
            <div class="header inner">nav</div>
            <h3 class="entry-title">Entry Title</h3>
            <div class="entry-management-links">edit | track</div>
            <p>The story itself.</p>
            <div class="currents">Mood: tired</div>
        </div></body></html>"#;

        let draft = JournalExtractor::Dreamwidth.parse(doc, false);
        assert!(draft.chapter.content.contains("The story itself."));
        assert!(!draft.chapter.content.contains("Mood: tired"));
        assert!(!draft.chapter.content.contains("edit | track"));
        assert!(!draft.chapter.content.contains("Entry Title"));
    }

    #[test]
    fn test_livejournal_entry_body() {
        let doc = r#"<html><head><title>user: story time</title></head><body>
            <article class="b-singlepost-body"><p>Entry text.</p></article>
            <div class="sidebar">unrelated</div>
        </body></html>"#;

        let draft = JournalExtractor::LiveJournal.parse(doc, false);
        assert!(draft.chapter.content.contains("Entry text."));
        assert!(!draft.chapter.content.contains("unrelated"));
        assert_eq!(draft.title.as_deref(), Some("story time"));
    }

    #[tokio::test]
    async fn test_author_from_hostname_with_profile_email() {
        let fetcher = MockFetcher::new().with_body(
            "http://someuser.dreamwidth.org/profile",
            r#"<div class="contact">Email: someuser@example.com</div>"#,
        );
        let author = parse_author(&fetcher, "https://someuser.dreamwidth.org/1234.html")
            .await
            .unwrap();
        assert_eq!(author.name, "someuser");
        assert_eq!(author.email, "someuser@example.com");
    }

    #[tokio::test]
    async fn test_author_falls_back_to_site_address() {
        let fetcher = MockFetcher::new().fail_url("http://writer.livejournal.com/profile");
        let author = parse_author(&fetcher, "http://writer.livejournal.com/567.html")
            .await
            .unwrap();
        assert_eq!(author.email, "writer@livejournal.com");
    }

    #[tokio::test]
    async fn test_community_journal_recovers_poster() {
        let entry_url = "http://community.livejournal.com/somecomm/89.html";
        let entry = r#"<html><body><div></div><div><div><div><div>
            <table><tbody><tr><td></td><td><span>
                <a href="http://community.livejournal.com/somecomm/">somecomm</a>
                <a href="http://realwriter.livejournal.com/"><b>realwriter</b></a>
            </span></td></tr></tbody></table>
        </div></div></div></div></body></html>"#;
        let fetcher = MockFetcher::new().with_body(entry_url, entry);

        let author = parse_author(&fetcher, entry_url).await.unwrap();
        assert_eq!(author.name, "realwriter");
        assert_eq!(author.email, "realwriter@livejournal.com");
    }

    #[tokio::test]
    async fn test_community_journal_without_poster_has_no_author() {
        // The entry page yields no attribution, so no author can be named.
        let fetcher = MockFetcher::new();
        let author = parse_author(&fetcher, "http://community.livejournal.com/somecomm/89.html").await;
        assert!(author.is_none());
    }
}
