//! Collector scraping the Techmeme front page through the OpenClaw browser.
//!
//! The browser is pointed at Techmeme, then a small script is evaluated in the
//! page. It reads the first `limit` `div.hentry` stories, keeps headlines that
//! mention one of the configured keywords and returns them as a JSON array of
//! `{title, source}`.

use chrono::NaiveDate;
use std::time::Duration;
use tracing::{info, instrument};

use super::{records_from, run_for_stdout};
use crate::config::TechmemeConfig;
use crate::models::{NewsRecord, RawOutput, SourceType};
use crate::runner::{CommandRunner, Invocation};

#[derive(Debug, Clone)]
pub struct Techmeme {
    pub config: TechmemeConfig,
}

impl Techmeme {
    pub fn new(config: TechmemeConfig) -> Self {
        Self { config }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Open the front page in the OpenClaw browser.
    pub fn navigate_invocation(&self) -> Invocation {
        Invocation::new(
            "openclaw",
            ["browser", "navigate", self.config.url.as_str()],
            self.timeout(),
        )
    }

    /// Run the headline extraction script on the open page.
    pub fn evaluate_invocation(&self) -> Invocation {
        let script = self.extract_script();
        Invocation::new(
            "openclaw",
            ["browser", "evaluate", "--fn", script.as_str()],
            self.timeout(),
        )
    }

    /// In-page script returning matching headlines as a JSON string.
    pub fn extract_script(&self) -> String {
        let keywords = serde_json::to_string(&self.config.keywords).unwrap_or_else(|_| "[]".into());
        format!(
            r#"(function() {{
    const articles = Array.from(document.querySelectorAll('div.hentry')).slice(0, {limit});
    const keywords = {keywords}.map(k => k.toLowerCase());
    const results = [];
    for (const article of articles) {{
        const titleEl = article.querySelector('div.hed');
        const sourceEl = article.querySelector('div.by');
        if (!titleEl) continue;
        const title = titleEl.innerText.trim();
        const lower = title.toLowerCase();
        if (keywords.some(kw => lower.includes(kw))) {{
            results.push({{
                title: title,
                source: sourceEl ? 'TechMeme - ' + sourceEl.innerText.trim() : 'TechMeme'
            }});
        }}
    }}
    return JSON.stringify(results);
}})()"#,
            limit = self.config.limit,
        )
    }

    #[instrument(level = "info", skip_all, fields(url = %self.config.url))]
    pub async fn collect<R: CommandRunner>(&self, runner: &R, today: NaiveDate) -> Vec<NewsRecord> {
        if !self.config.enabled {
            info!("techmeme disabled; skipping");
            return Vec::new();
        }

        if run_for_stdout(runner, &self.navigate_invocation(), SourceType::Techmeme)
            .await
            .is_none()
        {
            return Vec::new();
        }

        let Some(stdout) =
            run_for_stdout(runner, &self.evaluate_invocation(), SourceType::Techmeme).await
        else {
            return Vec::new();
        };

        let mut records = records_from(RawOutput::from_json(&stdout), SourceType::Techmeme, today);
        for record in &mut records {
            record.url = self.config.url.clone();
        }
        info!(count = records.len(), "Collected from Techmeme");
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

    #[test]
    fn test_extract_script_embeds_settings() {
        let config = TechmemeConfig {
            keywords: vec!["Agent's".into(), "LLM".into()],
            limit: 7,
            ..Default::default()
        };
        let script = Techmeme::new(config).extract_script();
        assert!(script.contains(".slice(0, 7)"));
        assert!(script.contains(r#"["Agent's","LLM"]"#));
        assert!(script.contains("JSON.stringify(results)"));
    }

    #[tokio::test]
    async fn test_collect_navigates_then_evaluates() {
        let runner = FakeRunner::new().stdout("navigate", "ok").stdout(
            "evaluate",
            r#"[{"title": "Nvidia unveils AI chip", "source": "TechMeme - Bloomberg"}]"#,
        );
        let records = Techmeme::new(TechmemeConfig::default())
            .collect(&runner, today())
            .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, "TechMeme - Bloomberg");
        assert_eq!(records[0].url, "https://www.techmeme.com");
        assert_eq!(records[0].source_type, SourceType::Techmeme);

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args[1], "navigate");
        assert_eq!(calls[1].args[1], "evaluate");
    }

    #[tokio::test]
    async fn test_navigate_timeout_skips_evaluate() {
        let runner = FakeRunner::new().timeout("navigate");
        let records = Techmeme::new(TechmemeConfig::default())
            .collect(&runner, today())
            .await;
        assert!(records.is_empty());
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unparsable_result_is_empty() {
        let runner = FakeRunner::new()
            .stdout("navigate", "ok")
            .stdout("evaluate", "Error: no tab attached");
        let records = Techmeme::new(TechmemeConfig::default())
            .collect(&runner, today())
            .await;
        assert!(records.is_empty());
    }
}
