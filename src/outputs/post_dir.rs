//! Persistence of tech blog articles.
//!
//! # Output Structure
//!
//! One folder per generated article:
//! ```text
//! blog.save_directory/
//! └── 20250506_093000_Claude_3.5/
//!     ├── article.md        # Markdown source
//!     ├── xiaohongshu.txt   # plain-text post with hashtags
//!     └── meta.json         # PostMeta
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

pub const ARTICLE_FILE: &str = "article.md";
pub const XIAOHONGSHU_FILE: &str = "xiaohongshu.txt";
pub const META_FILE: &str = "meta.json";

/// Status recorded for freshly written articles.
pub const READY_TO_PUBLISH: &str = "ready_to_publish";

/// Contents of `meta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMeta {
    pub tech_name: String,
    /// Local time, `YYYY-MM-DDTHH:MM:SS`.
    pub created_at: String,
    pub markdown_file: PathBuf,
    pub xiaohongshu_file: PathBuf,
    /// Cover image, once one has been generated for this article.
    pub image_file: Option<PathBuf>,
    pub image_prompt: String,
    pub status: String,
}

/// The text files making up one article.
#[derive(Debug, Clone, Copy)]
pub struct Article<'a> {
    pub tech_name: &'a str,
    pub markdown: &'a str,
    pub xiaohongshu: &'a str,
    pub image_prompt: &'a str,
}

/// `YYYYMMDD_HHMMSS_<name>` with spaces and path separators replaced by `_`.
pub fn dir_name(tech_name: &str, now: NaiveDateTime) -> String {
    let safe: String = tech_name
        .chars()
        .map(|c| if matches!(c, ' ' | '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}_{safe}", now.format("%Y%m%d_%H%M%S"))
}

/// Write `article` into a new folder under `root`.
///
/// # Arguments
///
/// * `root` - Parent directory, created if missing
/// * `article` - Texts to write
/// * `now` - Creation time; names the folder and fills `created_at`
///
/// # Returns
///
/// The article folder.
#[instrument(level = "info", skip_all, fields(root = %root.display(), tech = %article.tech_name))]
pub async fn save_post(root: &Path, article: Article<'_>, now: NaiveDateTime) -> io::Result<PathBuf> {
    let dir = root.join(dir_name(article.tech_name, now));
    fs::create_dir_all(&dir).await?;

    let markdown_file = dir.join(ARTICLE_FILE);
    fs::write(&markdown_file, article.markdown).await?;
    let xiaohongshu_file = dir.join(XIAOHONGSHU_FILE);
    fs::write(&xiaohongshu_file, article.xiaohongshu).await?;

    let meta = PostMeta {
        tech_name: article.tech_name.to_string(),
        created_at: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        markdown_file,
        xiaohongshu_file,
        image_file: None,
        image_prompt: article.image_prompt.to_string(),
        status: READY_TO_PUBLISH.to_string(),
    };
    let json = serde_json::to_string_pretty(&meta).map_err(io::Error::other)?;
    fs::write(dir.join(META_FILE), json).await?;

    info!(dir = %dir.display(), "Saved article");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 6)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_dir_name() {
        assert_eq!(dir_name("Claude 3.5", now()), "20250506_093000_Claude_3.5");
        assert_eq!(dir_name("CI/CD", now()), "20250506_093000_CI_CD");
    }

    #[tokio::test]
    async fn test_save_post_writes_three_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("posts");
        let article = Article {
            tech_name: "Kimi K2",
            markdown: "# Kimi K2 - 技术解析",
            xiaohongshu: "Kimi K2 - 技术解析\n\n🏷️ #AI",
            image_prompt: "cover",
        };

        let dir = save_post(&root, article, now()).await.unwrap();

        assert_eq!(dir, root.join("20250506_093000_Kimi_K2"));
        assert_eq!(std::fs::read_to_string(dir.join(ARTICLE_FILE)).unwrap(), "# Kimi K2 - 技术解析");
        assert!(std::fs::read_to_string(dir.join(XIAOHONGSHU_FILE)).unwrap().ends_with("#AI"));

        let meta: PostMeta =
            serde_json::from_str(&std::fs::read_to_string(dir.join(META_FILE)).unwrap()).unwrap();
        assert_eq!(meta.tech_name, "Kimi K2");
        assert_eq!(meta.created_at, "2025-05-06T09:30:00");
        assert_eq!(meta.markdown_file, dir.join(ARTICLE_FILE));
        assert_eq!(meta.image_file, None);
        assert_eq!(meta.status, READY_TO_PUBLISH);
    }
}
