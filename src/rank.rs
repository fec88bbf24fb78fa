//! Deduplication, truncation and decoration of collected records.

use itertools::Itertools;
use tracing::{info, instrument};

use crate::models::NewsRecord;
use crate::utils::char_prefix;

/// Number of title characters that make up the dedup key.
pub const DEDUP_PREFIX_CHARS: usize = 20;

/// Default number of entries in a post.
pub const DEFAULT_MAX_COUNT: usize = 10;

/// Glyphs assigned by position, cycling.
pub const EMOJI_PALETTE: [&str; 10] = ["🎯", "📈", "🏦", "💰", "🎬", "⚖️", "⚡", "📹", "🔒", "🏗️"];

/// Lower-cased first [`DEDUP_PREFIX_CHARS`] characters of the title.
///
/// Titles that share this prefix are treated as the same story, even if they
/// diverge afterwards.
pub fn dedup_key(title: &str) -> String {
    char_prefix(title, DEDUP_PREFIX_CHARS).to_lowercase()
}

/// Emoji for the record at `position` in the final list.
pub fn emoji_for(position: usize) -> &'static str {
    EMOJI_PALETTE[position % EMOJI_PALETTE.len()]
}

/// Drop near-duplicates, keep at most `max_count` records and decorate them.
///
/// The first record seen for each [`dedup_key`] wins; its fields are kept
/// unchanged and later duplicates are discarded whole. Input order is
/// preserved and the cut at `max_count` does not reorder.
#[instrument(level = "info", skip_all, fields(input = records.len(), max_count = max_count))]
pub fn dedupe_and_rank(records: Vec<NewsRecord>, max_count: usize) -> Vec<NewsRecord> {
    let ranked: Vec<NewsRecord> = records
        .into_iter()
        .filter(|r| !r.title.is_empty())
        .unique_by(|r| dedup_key(&r.title))
        .take(max_count)
        .enumerate()
        .map(|(i, mut r)| {
            r.emoji = Some(emoji_for(i));
            r
        })
        .collect();

    info!(kept = ranked.len(), "Deduplicated and ranked news");
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceType;
    use chrono::NaiveDate;

    fn record(title: &str, source: &str) -> NewsRecord {
        NewsRecord {
            title: title.to_string(),
            source: source.to_string(),
            url: String::new(),
            date: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
            source_type: SourceType::NewsAggregator,
            summary: None,
            emoji: None,
        }
    }

    #[test]
    fn test_dedup_key_case_insensitive_prefix() {
        assert_eq!(
            dedup_key("OpenAI releases GPT-5 today"),
            dedup_key("openai releases gpt-5 tomorrow")
        );
        assert_eq!(dedup_key("OpenAI releases GPT-5 today"), "openai releases gpt-");
        assert_ne!(dedup_key("Short A"), dedup_key("Short B"));
    }

    #[test]
    fn test_collapses_shared_prefix_keeping_first() {
        let ranked = dedupe_and_rank(
            vec![
                record("OpenAI releases GPT-5 today", "X"),
                record("openai releases gpt-5 tomorrow", "Y"),
            ],
            DEFAULT_MAX_COUNT,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].source, "X");
        assert_eq!(ranked[0].title, "OpenAI releases GPT-5 today");
    }

    #[test]
    fn test_truncates_preserving_order() {
        let records = (0..15)
            .map(|i| record(&format!("Headline {i:02}: distinct story"), "S"))
            .collect();
        let ranked = dedupe_and_rank(records, 10);
        assert_eq!(ranked.len(), 10);
        for (i, r) in ranked.iter().enumerate() {
            assert_eq!(r.title, format!("Headline {i:02}: distinct story"));
        }
    }

    #[test]
    fn test_truncation_applies_after_dedup() {
        let mut records = vec![record("Same story from one outlet", "A"); 5];
        records.extend((0..3).map(|i| record(&format!("Other story {i}"), "B")));
        let ranked = dedupe_and_rank(records, 3);
        let titles: Vec<_> = ranked.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Same story from one outlet", "Other story 0", "Other story 1"]);
    }

    #[test]
    fn test_emoji_cycles_by_position() {
        let records = (0..12)
            .map(|i| record(&format!("Unique title {i:02}"), "S"))
            .collect();
        let ranked = dedupe_and_rank(records, 12);
        assert_eq!(ranked[0].emoji, Some(EMOJI_PALETTE[0]));
        assert_eq!(ranked[9].emoji, Some(EMOJI_PALETTE[9]));
        assert_eq!(ranked[10].emoji, ranked[0].emoji);
        assert_eq!(ranked[11].emoji, ranked[1].emoji);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe_and_rank(vec![], DEFAULT_MAX_COUNT).is_empty());
    }

    #[test]
    fn test_skips_empty_titles() {
        let ranked = dedupe_and_rank(vec![record("", "A"), record("Real one", "B")], 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].emoji, Some(EMOJI_PALETTE[0]));
    }
}
