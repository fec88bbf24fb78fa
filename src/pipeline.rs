//! The daily post pipeline: collect → dedupe/rank → render → save.
//!
//! Collectors run one after another; a failing source only contributes zero
//! records. The run fails only when no source produced anything (nothing is
//! written in that case) or when the post cannot be saved.

use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::collectors::Collector;
use crate::config::Config;
use crate::models::NewsRecord;
use crate::outputs::{render, store};
use crate::rank::dedupe_and_rank;
use crate::runner::CommandRunner;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no news collected from any source; check network access and skill installation")]
    NoNewsCollected,

    #[error("failed to save post in {dir}: {source}")]
    Persist {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of one generator run.
#[derive(Debug)]
pub struct Digest {
    /// The ranked records that made it into the post.
    pub records: Vec<NewsRecord>,
    /// Rendered post text.
    pub content: String,
    /// Where the post was written; `None` on a dry run.
    pub path: Option<PathBuf>,
}

/// Generates the daily post from the configured sources.
pub struct Generator<'a, R> {
    config: &'a Config,
    runner: &'a R,
}

impl<'a, R: CommandRunner> Generator<'a, R> {
    pub fn new(config: &'a Config, runner: &'a R) -> Self {
        Self { config, runner }
    }

    /// Run every collector in order and concatenate their records.
    #[instrument(level = "info", skip_all, fields(%today))]
    pub async fn collect_all(&self, today: NaiveDate) -> Vec<NewsRecord> {
        let collectors = Collector::all(&self.config.news_sources);
        let total = collectors.len();
        let mut all = Vec::new();

        for (i, collector) in collectors.iter().enumerate() {
            info!(
                step = %format!("{}/{}", i + 1, total),
                source = %collector.source_type(),
                enabled = collector.enabled(),
                "Collecting"
            );
            all.extend(collector.collect(self.runner, today).await);
        }

        info!(count = all.len(), "Collected raw news");
        all
    }

    /// Produce the post for `today`. With `dry_run` nothing is written.
    #[instrument(level = "info", skip_all, fields(%today, dry_run = dry_run))]
    pub async fn run(&self, today: NaiveDate, dry_run: bool) -> Result<Digest, PipelineError> {
        let t0 = Instant::now();
        let collected = self.collect_all(today).await;
        if collected.is_empty() {
            error!("No news collected from any source");
            return Err(PipelineError::NoNewsCollected);
        }

        let format = &self.config.xiaohongshu.post_format;
        let records = dedupe_and_rank(collected, format.max_items);
        let content = render::render(&records, format, today);

        let path = if dry_run {
            info!("Dry run; post not saved");
            None
        } else {
            let dir = self.config.output_dir();
            let path = store::save(&content, &dir, today)
                .await
                .map_err(|source| PipelineError::Persist { dir, source })?;
            Some(path)
        };

        info!(
            news = records.len(),
            path = ?path,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Daily post generated"
        );
        Ok(Digest {
            records,
            content,
            path,
        })
    }
}
