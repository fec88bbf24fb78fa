//! Collector for the `news-aggregator-skill-2` fetch script.
//!
//! Runs `python scripts/fetch_news.py --source all --limit N --keyword k1,k2`
//! inside the skill checkout. The script prints a JSON array of
//! `{title, source, url, summary?}` objects on stdout.

use chrono::NaiveDate;
use std::time::Duration;
use tracing::{info, instrument};

use super::{records_from, run_for_stdout};
use crate::config::NewsAggregatorConfig;
use crate::models::{NewsRecord, RawOutput, SourceType};
use crate::runner::{CommandRunner, Invocation};

#[derive(Debug, Clone)]
pub struct NewsAggregator {
    pub config: NewsAggregatorConfig,
}

impl NewsAggregator {
    pub fn new(config: NewsAggregatorConfig) -> Self {
        Self { config }
    }

    /// `python scripts/fetch_news.py --source all --limit N --keyword a,b`, run
    /// inside the skill checkout.
    pub fn invocation(&self) -> Invocation {
        let limit = self.config.limit.to_string();
        let keywords = self.config.keywords.join(",");
        Invocation::new(
            "python",
            [
                "scripts/fetch_news.py",
                "--source",
                "all",
                "--limit",
                limit.as_str(),
                "--keyword",
                keywords.as_str(),
            ],
            Duration::from_secs(self.config.timeout_secs),
        )
        .in_dir(self.config.resolved_skill_dir())
    }

    #[instrument(level = "info", skip_all, fields(keywords = ?self.config.keywords))]
    pub async fn collect<R: CommandRunner>(&self, runner: &R, today: NaiveDate) -> Vec<NewsRecord> {
        if !self.config.enabled {
            info!("news-aggregator disabled; skipping");
            return Vec::new();
        }

        let Some(stdout) =
            run_for_stdout(runner, &self.invocation(), SourceType::NewsAggregator).await
        else {
            return Vec::new();
        };

        let records = records_from(RawOutput::from_json(&stdout), SourceType::NewsAggregator, today);
        info!(count = records.len(), "Collected from news-aggregator");
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::FakeRunner;
    use std::path::PathBuf;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
    }

    fn config() -> NewsAggregatorConfig {
        NewsAggregatorConfig {
            skill_dir: Some(PathBuf::from("/opt/skills/news-aggregator-skill-2")),
            ..Default::default()
        }
    }

    #[test]
    fn test_invocation_arguments() {
        let inv = NewsAggregator::new(config()).invocation();
        assert_eq!(inv.program, "python");
        assert_eq!(
            inv.args,
            [
                "scripts/fetch_news.py",
                "--source",
                "all",
                "--limit",
                "10",
                "--keyword",
                "AI,LLM,GPT,OpenAI"
            ]
        );
        assert_eq!(inv.cwd, Some(PathBuf::from("/opt/skills/news-aggregator-skill-2")));
        assert_eq!(inv.timeout, Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_collect_parses_json() {
        let runner = FakeRunner::new().stdout(
            "python",
            r#"[
                {"title": "DeepSeek V4 released", "source": "Hacker News", "url": "https://news.ycombinator.com/item?id=42"},
                {"title": "", "source": "GitHub"},
                {"title": "Llama 5 weights leak", "url": "https://example.com/llama"}
            ]"#,
        );
        let records = NewsAggregator::new(config()).collect(&runner, today()).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source, "Hacker News");
        assert_eq!(records[1].title, "Llama 5 weights leak");
        assert_eq!(records[1].source, "News Aggregator");
        assert!(records.iter().all(|r| r.source_type == SourceType::NewsAggregator));
    }

    #[tokio::test]
    async fn test_collect_malformed_json_is_empty() {
        let runner = FakeRunner::new().stdout("python", "Fetching... done\n{oops");
        let records = NewsAggregator::new(config()).collect(&runner, today()).await;
        assert!(records.is_empty());
        assert_eq!(runner.calls().len(), 1);
    }
}
