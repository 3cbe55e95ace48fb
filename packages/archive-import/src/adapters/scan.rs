//! Text scanning for embedded metadata.
//!
//! Many imported pages carry their metadata inline as `Label: value` lines
//! at the top of the story text. The scanner lifts those into structured
//! fields so callers do not have to retype them.

use regex::Regex;

use crate::types::work::{TagCategory, TagSets};

/// Metadata recovered from scanning story text.
#[derive(Debug, Default)]
pub struct MetaScan {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub tags: TagSets,
}

/// Scan story text for `Label: value` metadata lines.
///
/// When `detect_tags` is set, also looks for the conventional audience
/// keywords (gen, het, slash, femslash) anywhere in the text and records
/// them as category tags.
pub fn scan_text_for_meta(text: &str, detect_tags: bool) -> MetaScan {
    // Keep line breaks, strip the rest of the markup so labels split
    // across tags still line up.
    let br_re = Regex::new(r"(?i)<br\s*/?>").unwrap();
    let plain = br_re.replace_all(text, "\n").into_owned();
    let tag_re = Regex::new(r"(?s)<[^>]+>").unwrap();
    let plain = tag_re.replace_all(&plain, " ").into_owned();

    let mut scan = MetaScan::default();

    let line_re = Regex::new(
        r"(?im)^\s*(fandoms?|pairings?|relationships?|rating|warnings?|characters?|summary|title|tags|genre)\s*:\s*(.+)$",
    )
    .unwrap();

    for caps in line_re.captures_iter(&plain) {
        let label = caps[1].to_lowercase();
        let value = caps[2].trim();
        if value.is_empty() {
            continue;
        }
        match label.as_str() {
            "title" => {
                if scan.title.is_none() {
                    scan.title = Some(value.to_string());
                }
            }
            "summary" => {
                if scan.summary.is_none() {
                    scan.summary = Some(value.to_string());
                }
            }
            "fandom" | "fandoms" => scan.tags.insert_delimited(TagCategory::Fandom, value),
            "warning" | "warnings" => scan.tags.insert_delimited(TagCategory::Warning, value),
            "character" | "characters" => {
                scan.tags.insert_delimited(TagCategory::Character, value)
            }
            "rating" => scan.tags.insert_delimited(TagCategory::Rating, value),
            "pairing" | "pairings" | "relationship" | "relationships" => {
                scan.tags.insert_delimited(TagCategory::Relationship, value)
            }
            "tags" | "genre" => scan.tags.insert_delimited(TagCategory::Freeform, value),
            _ => {}
        }
    }

    if detect_tags {
        let keyword_re = Regex::new(r"(?i)\b(femslash|slash|het|gen)\b").unwrap();
        for caps in keyword_re.captures_iter(&plain) {
            scan.tags.insert(TagCategory::Category, caps[1].to_lowercase());
        }
    }

    scan
}
