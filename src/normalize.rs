//! Mapping of source-specific output into [`NewsRecord`]s.
//!
//! Two raw shapes exist:
//! - JSON arrays of objects (news aggregator, Techmeme browser script), turned
//!   into [`RawItem`]s by [`RawOutput::from_json`](crate::models::RawOutput::from_json)
//! - line-oriented text blocks (ai-news-collectors), parsed by [`parse_line_blocks`]
//!
//! [`normalize`] then fills the common record shape. Items without a title are
//! dropped; every other missing field falls back to a default.

use chrono::NaiveDate;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::models::{NewsRecord, RawItem, SourceType};

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>()\[\]"']+"#).expect("valid url regex"));

/// Parse bold-title blocks from a skill's text output.
///
/// ```text
/// **OpenAI ships a new reasoning model**
/// Some description line
/// https://openai.com/blog/...
/// ```
///
/// A line wrapped in `**` opens a new item. The first `http(s)` link found on
/// a later line becomes its `url`; further links are ignored. Lines before the
/// first title are skipped.
pub fn parse_line_blocks(text: &str) -> Vec<RawItem> {
    let mut items = Vec::new();
    let mut current: Option<RawItem> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.len() > 4 && line.starts_with("**") && line.ends_with("**") {
            if let Some(item) = current.take() {
                items.push(item);
            }
            let title = line.trim_matches('*').trim();
            current = Some(RawItem::new().with("title", title));
        } else if let Some(item) = current.as_mut() {
            if item.get("url").is_none() {
                if let Some(url) = extract_url(line) {
                    item.set("url", url);
                }
            }
        }
    }
    items.extend(current);
    items
}

/// First well-formed `http(s)` URL in `line`.
fn extract_url(line: &str) -> Option<String> {
    URL_RE
        .find_iter(line)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':']))
        .find(|candidate| Url::parse(candidate).is_ok())
        .map(str::to_string)
}

/// Build records from raw items produced by the `source_type` adapter.
///
/// Pure: never fails. Items whose title is missing or blank are skipped.
pub fn normalize(items: Vec<RawItem>, source_type: SourceType, today: NaiveDate) -> Vec<NewsRecord> {
    let total = items.len();
    let records: Vec<NewsRecord> = items
        .into_iter()
        .filter_map(|item| {
            let title = field(&item, "title")?;
            Some(NewsRecord {
                title,
                source: field(&item, "source")
                    .unwrap_or_else(|| source_type.default_label().to_string()),
                url: field(&item, "url").unwrap_or_default(),
                date: today,
                source_type,
                summary: field(&item, "summary"),
                emoji: None,
            })
        })
        .collect();

    if records.len() < total {
        debug!(
            source = %source_type,
            dropped = total - records.len(),
            "Dropped items without a title"
        );
    }
    records
}

/// Non-empty field value on a single line.
///
/// Every whitespace run, newlines included, becomes one space so a record
/// always renders as one entry.
fn field(item: &RawItem, key: &str) -> Option<String> {
    item.get(key)
        .map(|v| v.split_whitespace().join(" "))
        .filter(|v| !v.is_empty())
}
