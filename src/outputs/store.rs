//! Persistence of rendered posts.
//!
//! # Output Structure
//!
//! One file per calendar day, overwritten on re-runs:
//! ```text
//! save_directory/
//! ├── xhs_ai_news_20250505.txt
//! └── xhs_ai_news_20250506.txt
//! ```

use chrono::NaiveDate;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::{debug, info, instrument};

const FILE_PREFIX: &str = "xhs_ai_news_";
const FILE_SUFFIX: &str = ".txt";

/// `xhs_ai_news_YYYYMMDD.txt`
pub fn file_name(date: NaiveDate) -> String {
    format!("{FILE_PREFIX}{}{FILE_SUFFIX}", date.format("%Y%m%d"))
}

fn is_post_file(name: &str) -> bool {
    name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX)
}

/// Write `document` as the post for `date`, creating `dir` if needed.
///
/// An existing file for the same date is replaced.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), %date))]
pub async fn save(document: &str, dir: &Path, date: NaiveDate) -> io::Result<PathBuf> {
    fs::create_dir_all(dir).await?;
    let path = dir.join(file_name(date));
    fs::write(&path, document).await?;
    info!(path = %path.display(), bytes = document.len(), "Wrote post");
    Ok(path)
}

/// Most recently modified post file in `dir`, if any.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub async fn find_latest(dir: &Path) -> io::Result<Option<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if !is_post_file(&name.to_string_lossy()) {
            continue;
        }
        let meta = entry.metadata().await?;
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified()?;
        // Ties (coarse mtime) go to the later file name, i.e. the later date.
        let newer = latest
            .as_ref()
            .is_none_or(|(t, p)| (modified, entry.path()) > (*t, p.clone()));
        if newer {
            latest = Some((modified, entry.path()));
        }
    }

    debug!(latest = ?latest.as_ref().map(|(_, p)| p), "Scanned for latest post");
    Ok(latest.map(|(_, p)| p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(date(6)), "xhs_ai_news_20250506.txt");
    }

    #[tokio::test]
    async fn test_save_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("output");
        let path = save("hello", &dir, date(6)).await.unwrap();
        assert_eq!(path, dir.join("xhs_ai_news_20250506.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_save_same_day_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        save("first run", tmp.path(), date(6)).await.unwrap();
        let path = save("second", tmp.path(), date(6)).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_save_into_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();
        assert!(save("post", &blocker, date(6)).await.is_err());
    }

    #[tokio::test]
    async fn test_find_latest() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(find_latest(&tmp.path().join("missing")).await.unwrap(), None);
        assert_eq!(find_latest(tmp.path()).await.unwrap(), None);

        save("old", tmp.path(), date(5)).await.unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        let newest = save("new", tmp.path(), date(6)).await.unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(find_latest(tmp.path()).await.unwrap(), Some(newest));
    }
}
