//! Shared HTML cleanup helpers used by every site extractor.

use regex::Regex;

/// Normalize extracted story HTML.
///
/// Converts `<br>` variants to newlines, strips script/style/iframe blocks
/// and inline event-handler attributes, collapses runs of blank lines, and
/// trims the result.
pub fn clean_storytext(html: &str) -> String {
    let br = Regex::new(r"(?i)<br\s*/?>").unwrap();
    let mut text = br.replace_all(html, "\n").into_owned();

    let script = Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap();
    text = script.replace_all(&text, "").into_owned();
    let style = Regex::new(r"(?is)<style\b[^>]*>.*?</style>").unwrap();
    text = style.replace_all(&text, "").into_owned();
    let iframe = Regex::new(r"(?is)<iframe\b[^>]*>.*?</iframe>").unwrap();
    text = iframe.replace_all(&text, "").into_owned();

    let handlers = Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).unwrap();
    text = handlers.replace_all(&text, "").into_owned();

    let blank_runs = Regex::new(r"\n{3,}").unwrap();
    text = blank_runs.replace_all(&text, "\n\n").into_owned();

    text.trim().to_string()
}

/// Remove a leading `Site Name: ` prefix from a page title.
pub fn strip_site_prefix(title: &str) -> String {
    let prefix = Regex::new(r"^[^:]+:\s*").unwrap();
    prefix.replace(title.trim(), "").into_owned()
}
