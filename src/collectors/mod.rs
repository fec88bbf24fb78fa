//! News collectors, one per upstream source.
//!
//! Each collector follows the same contract:
//!
//! 1. If disabled in the configuration, return nothing without touching any
//!    external tool.
//! 2. Otherwise run the external tool through a [`CommandRunner`] with a
//!    bounded timeout.
//! 3. Timeouts, launch failures, non-zero exits and unparsable output are
//!    logged as warnings and yield an empty list. Nothing is raised past the
//!    collector.
//! 4. Parsed items are normalized into [`NewsRecord`]s stamped with the
//!    collector's [`SourceType`] and the collection date.
//!
//! # Sources
//!
//! | Source | Module | Mechanism | Output |
//! |--------|--------|-----------|--------|
//! | ai-news-collectors | [`ai_news`] | `npx openclaw skills run` | bold-title text blocks |
//! | news-aggregator-skill-2 | [`aggregator`] | `python scripts/fetch_news.py` | JSON array |
//! | Techmeme | [`techmeme`] | `openclaw browser navigate` + `evaluate` | JSON array |

pub mod aggregator;
pub mod ai_news;
pub mod techmeme;

use chrono::NaiveDate;
use tracing::warn;

use crate::config::NewsSources;
use crate::models::{NewsRecord, RawOutput, SourceType};
use crate::normalize::normalize;
use crate::runner::{CommandOutput, CommandRunner, Invocation, RunError};
use crate::utils::truncate_for_log;

pub use aggregator::NewsAggregator;
pub use ai_news::AiNewsCollectors;
pub use techmeme::Techmeme;

/// The closed set of news sources.
#[derive(Debug, Clone)]
pub enum Collector {
    AiNewsCollectors(AiNewsCollectors),
    NewsAggregator(NewsAggregator),
    Techmeme(Techmeme),
}

impl Collector {
    /// All collectors in pipeline order, enabled or not.
    ///
    /// # Arguments
    ///
    /// * `sources` - Per-source configuration; each collector keeps its own copy
    pub fn all(sources: &NewsSources) -> Vec<Collector> {
        vec![
            Collector::AiNewsCollectors(AiNewsCollectors::new(sources.ai_news_collectors.clone())),
            Collector::NewsAggregator(NewsAggregator::new(sources.news_aggregator.clone())),
            Collector::Techmeme(Techmeme::new(sources.techmeme.clone())),
        ]
    }

    /// Source tag stamped on every record this collector produces.
    pub fn source_type(&self) -> SourceType {
        match self {
            Collector::AiNewsCollectors(_) => SourceType::AiNewsCollectors,
            Collector::NewsAggregator(_) => SourceType::NewsAggregator,
            Collector::Techmeme(_) => SourceType::Techmeme,
        }
    }

    /// Whether the configuration switched this source on.
    pub fn enabled(&self) -> bool {
        match self {
            Collector::AiNewsCollectors(c) => c.config.enabled,
            Collector::NewsAggregator(c) => c.config.enabled,
            Collector::Techmeme(c) => c.config.enabled,
        }
    }

    /// Run the source once and normalize what it returned.
    ///
    /// # Arguments
    ///
    /// * `runner` - Executes the external tool
    /// * `today` - Date stamped on every record
    ///
    /// # Returns
    ///
    /// The records in source order. Empty when the tool failed, timed out or
    /// printed nothing usable; the reason is logged, never returned.
    pub async fn collect<R: CommandRunner>(&self, runner: &R, today: NaiveDate) -> Vec<NewsRecord> {
        match self {
            Collector::AiNewsCollectors(c) => c.collect(runner, today).await,
            Collector::NewsAggregator(c) => c.collect(runner, today).await,
            Collector::Techmeme(c) => c.collect(runner, today).await,
        }
    }
}

/// Run `invocation` and return its stdout, or `None` after logging why not.
async fn run_for_stdout<R: CommandRunner>(
    runner: &R,
    invocation: &Invocation,
    source: SourceType,
) -> Option<String> {
    match runner.run(invocation).await {
        Ok(CommandOutput {
            stdout,
            success: true,
            ..
        }) => Some(stdout),
        Ok(CommandOutput { stderr, .. }) => {
            warn!(
                %source,
                command = %truncate_for_log(&invocation.display(), 120),
                stderr = %truncate_for_log(stderr.trim(), 300),
                "Command exited with failure; no results from this source"
            );
            None
        }
        Err(e @ RunError::Timeout { .. }) => {
            warn!(%source, error = %e, "Command timed out; no results from this source");
            None
        }
        Err(e) => {
            warn!(%source, error = %e, "Command failed; no results from this source");
            None
        }
    }
}

/// Normalize parsed output, or log and drop malformed output.
fn records_from(output: RawOutput, source: SourceType, today: NaiveDate) -> Vec<NewsRecord> {
    match output {
        RawOutput::Parsed(items) => normalize(items, source, today),
        RawOutput::Malformed(reason) => {
            warn!(%source, reason = %truncate_for_log(&reason, 200), "Could not parse output; no results from this source");
            Vec::new()
        }
    }
}
