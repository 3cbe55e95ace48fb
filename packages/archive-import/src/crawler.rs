//! Page download for one import item.
//!
//! The crawler turns a classified source URL into the list of raw page
//! bodies the extractors will parse. Single-page sources are one fetch;
//! eFiction archives expand into a chapter walk; journal sites get URL
//! canonicalization and the mature-content gate. Sites that forbid
//! scraping are refused here, before any request goes out.

use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::ImportLimits;
use crate::error::{FetchError, FetchResult};
use crate::routing::AdapterId;
use crate::traits::fetcher::Fetcher;

pub const FANFICTIONNET_BLOCKED: &str =
    "Sorry, Fanfiction.net does not allow imports from their site.";
pub const QUOTEV_BLOCKED: &str = "Sorry, Quotev.com does not allow imports from their site.";

/// Markers that an eFiction chapter walk has run past the last chapter.
const ACCESS_DENIED: &str = "Access denied.";
const EMPTY_CHAPTER_TITLE: &str = "<div class='chaptertitle'> by </div>";
const BARE_CHAPTER_HEADING: &str = "Chapter : ";

pub struct ChapterCrawler<F: Fetcher> {
    fetcher: F,
    limits: ImportLimits,
}

impl<F: Fetcher> ChapterCrawler<F> {
    pub fn new(fetcher: F, limits: ImportLimits) -> Self {
        Self { fetcher, limits }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn into_fetcher(self) -> F {
        self.fetcher
    }

    /// Download every page of an item.
    ///
    /// A single URL may expand to many pages (chaptered archives); a list
    /// of URLs downloads as one page per URL. Either way the whole item
    /// shares one download budget, not one per page.
    pub async fn download_chapters(
        &self,
        adapter: AdapterId,
        urls: &[String],
    ) -> FetchResult<Vec<String>> {
        self.check_blocked(adapter)?;
        if urls.len() == 1 {
            return self.download(adapter, &urls[0]).await;
        }
        let deadline = self.deadline();
        let mut pages = Vec::with_capacity(urls.len());
        for url in urls {
            pages.push(self.download_single(adapter, url, deadline).await?);
        }
        Ok(pages)
    }

    /// Download one source URL, expanding it if the site is chaptered.
    pub async fn download(&self, adapter: AdapterId, url: &str) -> FetchResult<Vec<String>> {
        self.check_blocked(adapter)?;
        let deadline = self.deadline();
        if adapter.is_chaptered() {
            return self.download_chaptered(url, deadline).await;
        }
        Ok(vec![self.download_single(adapter, url, deadline).await?])
    }

    fn deadline(&self) -> tokio::time::Instant {
        tokio::time::Instant::now() + self.limits.download_timeout
    }

    fn check_blocked(&self, adapter: AdapterId) -> FetchResult<()> {
        let message = match adapter {
            AdapterId::FanfictionNet => FANFICTIONNET_BLOCKED,
            AdapterId::Quotev => QUOTEV_BLOCKED,
            _ => return Ok(()),
        };
        info!(adapter = %adapter, "refusing blocked source");
        Err(FetchError::BlockedSite {
            message: message.to_string(),
        })
    }

    async fn download_single(
        &self,
        adapter: AdapterId,
        url: &str,
        deadline: tokio::time::Instant,
    ) -> FetchResult<String> {
        let body = match adapter {
            AdapterId::TheArchive => {
                let printable = printable_url(url)?;
                debug!(url = %url, printable = %printable, "using printable view");
                self.fetch_at(&printable, deadline).await?
            }
            _ if adapter.is_journal() => self.download_journal(url, deadline).await?,
            _ => self.fetch_at(url, deadline).await?,
        };
        if body.trim().is_empty() {
            return Err(FetchError::EmptyResponse {
                url: url.to_string(),
            });
        }
        Ok(body)
    }

    async fn download_journal(
        &self,
        url: &str,
        deadline: tokio::time::Instant,
    ) -> FetchResult<String> {
        let canonical = canonical_journal_url(url);
        let body = self.fetch_at(&canonical, deadline).await?;
        if !body.contains("adult_check") {
            return Ok(body);
        }
        // One shot at the mature-content gate; a refusal downloads nothing.
        debug!(url = %canonical, "acknowledging mature content interstitial");
        match tokio::time::timeout_at(
            deadline,
            self.fetcher.submit_form(&canonical, &[("adult_check", "1")]),
        )
        .await
        {
            Ok(Ok(body)) => Ok(body),
            Ok(Err(e)) => {
                warn!(url = %canonical, error = %e, "mature content gate refused");
                Ok(String::new())
            }
            Err(_) => {
                warn!(url = %canonical, "mature content gate timed out");
                Ok(String::new())
            }
        }
    }

    /// Walk an eFiction archive chapter by chapter through its printable
    /// view, stopping at the first page that is missing, repeated, or an
    /// end-of-story marker. The whole walk shares one download deadline.
    async fn download_chaptered(
        &self,
        url: &str,
        deadline: tokio::time::Instant,
    ) -> FetchResult<Vec<String>> {
        let re = Regex::new(r"(?i)^(?P<site>.*)/[^/]*viewstory\.php.*[?&]sid=(?P<id>\d+)").unwrap();
        let caps = re.captures(url).ok_or_else(|| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;
        let site = &caps["site"];
        let id = &caps["id"];

        let mut chapters: Vec<String> = Vec::new();
        let mut last_fingerprint: Option<String> = None;
        let mut chapter = 1usize;

        loop {
            if chapter > self.limits.max_chapter_count {
                info!(url = %url, max = self.limits.max_chapter_count, "chapter walk hit the chapter cap");
                break;
            }
            let chapter_url =
                format!("{site}/viewstory.php?action=printable&sid={id}&chapter={chapter}");
            let body = match tokio::time::timeout_at(deadline, self.fetcher.fetch(&chapter_url))
                .await
            {
                Err(_) => {
                    return Err(FetchError::Timeout {
                        url: url.to_string(),
                    })
                }
                Ok(Err(e)) => {
                    debug!(url = %chapter_url, error = %e, "chapter walk stopped by fetch error");
                    break;
                }
                Ok(Ok(body)) => body,
            };
            if body.trim().is_empty() {
                break;
            }
            let fingerprint: String = body
                .chars()
                .skip(10)
                .take(self.limits.duplicate_fingerprint_len)
                .collect();
            // Compare whenever a previous page exists; a fingerprint can
            // legitimately be the empty string for very short pages.
            if last_fingerprint.as_deref() == Some(fingerprint.as_str()) {
                debug!(url = %chapter_url, "chapter walk stopped by repeated page");
                break;
            }
            if end_of_story(&body) {
                break;
            }
            last_fingerprint = Some(fingerprint);
            chapters.push(repair_head(&body));
            chapter += 1;
        }

        if chapters.is_empty() {
            return Err(FetchError::EmptyResponse {
                url: url.to_string(),
            });
        }
        info!(url = %url, chapters = chapters.len(), "chapter walk finished");
        Ok(chapters)
    }

    async fn fetch_at(&self, url: &str, deadline: tokio::time::Instant) -> FetchResult<String> {
        tokio::time::timeout_at(deadline, self.fetcher.fetch(url))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
            })?
    }
}

fn end_of_story(body: &str) -> bool {
    body.contains(EMPTY_CHAPTER_TITLE)
        || body.contains(ACCESS_DENIED)
        || body.contains(BARE_CHAPTER_HEADING)
}

/// Rewrite a story page URL into the skin-free printable view.
pub fn printable_url(url: &str) -> FetchResult<String> {
    let re = Regex::new(r"(?i)^(?P<site>.*)/[^/]*viewstory\.php.*[?&]sid=(?P<id>\d+)").unwrap();
    let caps = re.captures(url).ok_or_else(|| FetchError::InvalidUrl {
        url: url.to_string(),
    })?;
    Ok(format!(
        "{}/viewstory.php?action=printable&psid={}",
        &caps["site"], &caps["id"]
    ))
}

/// Canonicalize a journal entry URL: drop fragments and query strings,
/// normalize underscored usernames, and request the light site skin.
pub fn canonical_journal_url(url: &str) -> String {
    let base = url.split(['#', '?']).next().unwrap_or(url);
    let base = base.replace('_', "-");
    format!("{base}?format=light")
}

/// Printable eFiction pages sometimes omit the closing head tag, which
/// leaves the story text inside head as far as a parser is concerned.
fn repair_head(body: &str) -> String {
    if body.contains("</head>") || !body.contains("</style>") {
        return body.to_string();
    }
    body.replacen("</style>", "</style></head><body>", 1)
}
