//! Data models for collected news and raw collector output.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`NewsRecord`]: one normalized news item, the unit flowing through the pipeline
//! - [`SourceType`]: provenance tag naming the adapter that produced a record
//! - [`RawOutput`] / [`RawItem`]: what an adapter parsed from an external tool,
//!   validated before any [`NewsRecord`] is built

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The collector adapter a record came from.
///
/// Used only for provenance. Ranking never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    AiNewsCollectors,
    NewsAggregator,
    Techmeme,
}

impl SourceType {
    /// Configuration key and log tag of the adapter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::AiNewsCollectors => "ai_news_collectors",
            SourceType::NewsAggregator => "news_aggregator",
            SourceType::Techmeme => "techmeme",
        }
    }

    /// Attribution used when the raw item carries no `source` of its own.
    pub fn default_label(&self) -> &'static str {
        match self {
            SourceType::AiNewsCollectors => "AI News Collectors",
            SourceType::NewsAggregator => "News Aggregator",
            SourceType::Techmeme => "TechMeme",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single news item after normalization.
///
/// Records are created by the normalizer with every required field filled.
/// From ranking onward they are read-only except for `emoji`, which the ranker
/// assigns once by final position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsRecord {
    /// Headline. Never empty.
    pub title: String,
    /// Human-readable attribution, e.g. `"TechMeme - The Verge"`.
    pub source: String,
    /// Link to the story. May be empty.
    pub url: String,
    /// Collection date.
    pub date: NaiveDate,
    pub source_type: SourceType,
    pub summary: Option<String>,
    /// Positional decoration, set by [`crate::rank::dedupe_and_rank`].
    pub emoji: Option<&'static str>,
}

/// One item as parsed from an external tool, before validation.
///
/// Field values are kept as optional text; anything that is not a string in
/// the source (numbers, nulls, nested objects) is simply absent here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    fields: BTreeMap<String, String>,
}

impl RawItem {
    /// An item with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`RawItem::set`].
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set `key`, replacing any earlier value.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Raw value of `key`, untrimmed.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Build from a JSON object, keeping only its string-valued fields.
    pub fn from_json_object(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        let fields = map
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect();
        Self { fields }
    }
}

/// Result of parsing an external tool's output at the adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOutput {
    /// Output was understood; may still contain zero items.
    Parsed(Vec<RawItem>),
    /// Output could not be parsed at all.
    Malformed(String),
}

impl RawOutput {
    /// Parse a JSON document expected to hold an array of objects.
    ///
    /// A JSON string holding JSON (as returned by a browser `evaluate` of
    /// `JSON.stringify(...)`) is unwrapped once. Other valid JSON that is not
    /// an array yields zero items. Non-object array elements are skipped.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(text.trim()) {
            Ok(serde_json::Value::String(inner)) => match serde_json::from_str(&inner) {
                Ok(value) => Self::from_value(value),
                Err(e) => RawOutput::Malformed(e.to_string()),
            },
            Ok(value) => Self::from_value(value),
            Err(e) => RawOutput::Malformed(e.to_string()),
        }
    }

    fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Array(values) => RawOutput::Parsed(
                values
                    .iter()
                    .filter_map(|v| v.as_object().map(RawItem::from_json_object))
                    .collect(),
            ),
            _ => RawOutput::Parsed(Vec::new()),
        }
    }
}
