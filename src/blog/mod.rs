//! Tech blogger: articles about one or more AI technologies, written as
//! Markdown and as a ready-to-paste Xiaohongshu post.
//!
//! # Flow
//!
//! 1. Look up each technology through a [`DocSource`]
//! 2. Write the Markdown ([`article::markdown`] or
//!    [`article::comparison_markdown`])
//! 3. Pick tags and a cover prompt ([`xhs::recommend_tags`],
//!    [`xhs::image_prompt`])
//! 4. Strip the Markdown into the post text ([`xhs::format_for_xiaohongshu`])
//! 5. Save the article folder ([`crate::outputs::post_dir`])
//!
//! Publishing a saved article reuses [`crate::publish::Publisher`] on its
//! `xiaohongshu.txt`.

pub mod article;
pub mod xhs;

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::BlogConfig;
use crate::outputs::post_dir::{self, Article};

/// Comparison articles need at least this many technologies.
pub const MIN_COMPARE: usize = 2;

/// Technologies named in a comparison folder name.
const COMPARE_NAME_LIMIT: usize = 3;

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("documentation lookup for {name} failed: {reason}")]
    Lookup { name: String, reason: String },

    #[error("comparison needs at least two technologies, got {0}")]
    TooFewToCompare(usize),

    #[error("failed to save article in {dir}: {source}")]
    Persist {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub title: String,
    pub description: String,
}

/// What is known about one technology when its article is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechDoc {
    pub name: String,
    pub official_doc: String,
    pub key_features: Vec<Feature>,
    pub summary: String,
    pub code_examples: Vec<String>,
    /// Metric name to displayed value.
    pub benchmarks: BTreeMap<String, String>,
}

impl TechDoc {
    /// Name and guessed documentation URL, nothing else.
    pub fn stub(name: &str) -> Self {
        Self {
            name: name.to_string(),
            official_doc: format!("https://{}.dev/docs", name.to_lowercase().replace(' ', "")),
            key_features: Vec::new(),
            summary: String::new(),
            code_examples: Vec::new(),
            benchmarks: BTreeMap::new(),
        }
    }
}

/// Where technology documentation comes from.
pub trait DocSource {
    async fn lookup(&self, name: &str) -> Result<TechDoc, BlogError>;
}

/// Offline source returning [`TechDoc::stub`] for every non-blank name.
///
/// Articles built from it have placeholder sections to fill in by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubDocs;

impl DocSource for StubDocs {
    async fn lookup(&self, name: &str) -> Result<TechDoc, BlogError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BlogError::Lookup {
                name: String::new(),
                reason: "technology name is blank".into(),
            });
        }
        Ok(TechDoc::stub(name))
    }
}

/// A saved article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArticle {
    pub dir: PathBuf,
    pub tech_name: String,
    pub tags: Vec<String>,
    pub image_prompt: String,
}

impl SavedArticle {
    pub fn xiaohongshu_file(&self) -> PathBuf {
        self.dir.join(post_dir::XIAOHONGSHU_FILE)
    }
}

/// Writes tech articles into `dir`.
pub struct Blogger<'a, D> {
    settings: &'a BlogConfig,
    docs: &'a D,
    dir: PathBuf,
}

impl<'a, D: DocSource> Blogger<'a, D> {
    pub fn new(settings: &'a BlogConfig, docs: &'a D, dir: PathBuf) -> Self {
        Self { settings, docs, dir }
    }

    /// Write and save the article about `name`.
    #[instrument(level = "info", skip_all, fields(tech = %name))]
    pub async fn write_article(&self, name: &str, now: NaiveDateTime) -> Result<SavedArticle, BlogError> {
        let doc = self.docs.lookup(name).await?;
        info!(official_doc = %doc.official_doc, "Writing article");
        let markdown = article::markdown(&doc, now.date(), self.settings.include_code);
        self.save(&doc.name, &markdown, now).await
    }

    /// Write and save one article comparing `names`.
    ///
    /// # Errors
    ///
    /// [`BlogError::TooFewToCompare`] with fewer than [`MIN_COMPARE`] names;
    /// nothing is looked up or written then.
    #[instrument(level = "info", skip_all, fields(techs = ?names))]
    pub async fn write_comparison(&self, names: &[String], now: NaiveDateTime) -> Result<SavedArticle, BlogError> {
        if names.len() < MIN_COMPARE {
            return Err(BlogError::TooFewToCompare(names.len()));
        }

        let mut docs = Vec::with_capacity(names.len());
        for name in names {
            docs.push(self.docs.lookup(name).await?);
        }
        let markdown = article::comparison_markdown(&docs, now.date());

        let folder_name = names
            .iter()
            .take(COMPARE_NAME_LIMIT)
            .map(|n| n.replace(' ', ""))
            .collect::<Vec<_>>()
            .join("_vs_");
        let tag_source = names.join(" ");
        let mut saved = self
            .save_as(&format!("Comparison_{folder_name}"), &tag_source, &markdown, now)
            .await?;
        saved.tech_name = names.join(" vs ");
        Ok(saved)
    }

    async fn save(&self, name: &str, markdown: &str, now: NaiveDateTime) -> Result<SavedArticle, BlogError> {
        self.save_as(name, name, markdown, now).await
    }

    /// Tag, format and persist. `tag_source` is matched against the tag map.
    async fn save_as(
        &self,
        tech_name: &str,
        tag_source: &str,
        markdown: &str,
        now: NaiveDateTime,
    ) -> Result<SavedArticle, BlogError> {
        let tags = xhs::recommend_tags(tag_source, &self.settings.default_tags);
        info!(tags = %tags.join(", "), "Recommended tags");
        let image_prompt = xhs::image_prompt(tag_source, self.settings.image_style);
        let text = xhs::format_for_xiaohongshu(markdown, &tags);

        let chars = text.chars().count();
        if chars > self.settings.max_length {
            warn!(
                chars,
                max = self.settings.max_length,
                "Post text is longer than the configured limit"
            );
        }

        let dir = post_dir::save_post(
            &self.dir,
            Article {
                tech_name,
                markdown,
                xiaohongshu: &text,
                image_prompt: &image_prompt,
            },
            now,
        )
        .await
        .map_err(|source| BlogError::Persist {
            dir: self.dir.clone(),
            source,
        })?;

        Ok(SavedArticle {
            dir,
            tech_name: tech_name.to_string(),
            tags,
            image_prompt,
        })
    }
}
