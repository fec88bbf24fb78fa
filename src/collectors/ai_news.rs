//! Collector for the `ai-news-collectors` OpenClaw skill.
//!
//! The skill prints a digest where each story starts with a bold title line
//! (`**Title**`) followed by free text and usually a link. See
//! [`parse_line_blocks`] for the exact rules.

use chrono::NaiveDate;
use std::time::Duration;
use tracing::{info, instrument};

use super::{records_from, run_for_stdout};
use crate::config::AiNewsCollectorsConfig;
use crate::models::{NewsRecord, RawOutput, SourceType};
use crate::normalize::parse_line_blocks;
use crate::runner::{CommandRunner, Invocation};

#[derive(Debug, Clone)]
pub struct AiNewsCollectors {
    pub config: AiNewsCollectorsConfig,
}

impl AiNewsCollectors {
    pub fn new(config: AiNewsCollectorsConfig) -> Self {
        Self { config }
    }

    /// `npx openclaw skills run <skill>`
    pub fn invocation(&self) -> Invocation {
        Invocation::new(
            "npx",
            ["openclaw", "skills", "run", self.config.skill.as_str()],
            Duration::from_secs(self.config.timeout_secs),
        )
    }

    #[instrument(level = "info", skip_all, fields(skill = %self.config.skill))]
    pub async fn collect<R: CommandRunner>(&self, runner: &R, today: NaiveDate) -> Vec<NewsRecord> {
        if !self.config.enabled {
            info!("ai-news-collectors disabled; skipping");
            return Vec::new();
        }

        let Some(stdout) =
            run_for_stdout(runner, &self.invocation(), SourceType::AiNewsCollectors).await
        else {
            return Vec::new();
        };

        let output = RawOutput::Parsed(parse_line_blocks(&stdout));
        let records = records_from(output, SourceType::AiNewsCollectors, today);
        info!(count = records.len(), "Collected from ai-news-collectors");
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::FakeRunner;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
    }

    #[tokio::test]
    async fn test_collect_parses_blocks() {
        let runner = FakeRunner::new().stdout(
            "ai-news-collectors",
            "**Gemini 3 tops leaderboard**\nhttps://blog.google/gemini-3\n\n**Mistral open-sources Large 3**\n",
        );
        let collector = AiNewsCollectors::new(AiNewsCollectorsConfig::default());
        let records = collector.collect(&runner, today()).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Gemini 3 tops leaderboard");
        assert_eq!(records[0].url, "https://blog.google/gemini-3");
        assert_eq!(records[0].source, "AI News Collectors");
        assert_eq!(records[0].source_type, SourceType::AiNewsCollectors);
        assert_eq!(records[1].url, "");

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "npx");
        assert_eq!(calls[0].timeout, Duration::from_secs(180));
    }

    #[tokio::test]
    async fn test_collect_timeout_is_empty() {
        let runner = FakeRunner::new().timeout("ai-news-collectors");
        let collector = AiNewsCollectors::new(AiNewsCollectorsConfig::default());
        assert!(collector.collect(&runner, today()).await.is_empty());
    }

    #[tokio::test]
    async fn test_collect_nonzero_exit_is_empty() {
        let runner = FakeRunner::new().failure("ai-news-collectors", "skill not installed");
        let collector = AiNewsCollectors::new(AiNewsCollectorsConfig::default());
        assert!(collector.collect(&runner, today()).await.is_empty());
    }
}
