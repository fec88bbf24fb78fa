//! Publishing a saved post through the OpenClaw browser.
//!
//! The browser is driven with three commands:
//!
//! | Step | Command | Purpose |
//! |------|---------|---------|
//! | navigate | `openclaw browser navigate <publish_url>` | open the creator page |
//! | screenshot | `openclaw browser screenshot` | let the operator confirm the page loaded |
//! | evaluate | `openclaw browser evaluate --fn <script>` | fill title and body |
//!
//! The post is only filled in, never submitted: cover upload and the final
//! click stay manual.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::XiaohongshuConfig;
use crate::outputs::render::TITLE_LABEL;
use crate::runner::{CommandRunner, Invocation, RunError};
use crate::utils::char_prefix;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("post file {0} is empty")]
    Empty(PathBuf),

    #[error("no post found in {0}; run `generate` first")]
    NoPostFound(PathBuf),

    #[error("browser {step} failed: {source}")]
    Browser {
        step: &'static str,
        #[source]
        source: RunError,
    },

    #[error("browser {step} exited with failure: {stderr}")]
    BrowserExit { step: &'static str, stderr: String },
}

/// A post split into the two fields of the creator form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub title: String,
    pub body: String,
}

/// Split saved post text into title and body.
///
/// The first line is the title, with the `标题：` label removed when present.
/// Everything after it, trimmed, is the body.
pub fn split_post(content: &str) -> Post {
    let (first, rest) = content.split_once('\n').unwrap_or((content, ""));
    let title = match first.strip_prefix(TITLE_LABEL) {
        Some(t) => t.trim().to_string(),
        None => first.to_string(),
    };
    Post {
        title,
        body: rest.trim().to_string(),
    }
}

/// Browser script that fills the creator form and reports back.
///
/// Title goes into the first `input`/`textarea` whose placeholder mentions
/// `标题`; body into the first `textarea` whose placeholder mentions `正文` or
/// `内容`. Values are embedded as JSON string literals.
pub fn fill_script(post: &Post) -> String {
    let title = serde_json::Value::String(post.title.clone()).to_string();
    let body = serde_json::Value::String(post.body.clone()).to_string();
    format!(
        r#"(function() {{
    const fill = (input, value) => {{
        input.value = value;
        input.dispatchEvent(new Event('input', {{ bubbles: true }}));
    }};
    for (const input of document.querySelectorAll('input, textarea')) {{
        if (input.placeholder && input.placeholder.includes('标题')) {{
            fill(input, {title});
            break;
        }}
    }}
    for (const input of document.querySelectorAll('textarea')) {{
        if (input.placeholder && (input.placeholder.includes('正文') || input.placeholder.includes('内容'))) {{
            fill(input, {body});
            break;
        }}
    }}
    return 'Content filled successfully';
}})()"#
    )
}

/// Image prompt for a cover matching the post title.
pub fn cover_prompt(title: &str) -> String {
    format!(
        "A modern tech news cover for AI daily newsletter. Title: '{title}'. Dark blue gradient background, \
         neon cyan glow effects, futuristic AI circuit patterns. Clean minimalist style, vertical 3:4 layout."
    )
}

/// Shell command generating the daily post cover with the `nano-banana-pro` skill.
pub fn cover_command(title: &str) -> String {
    image_command(&cover_prompt(title))
}

/// Shell command running `nano-banana-pro` on `prompt`, quoted for the shell.
pub fn image_command(prompt: &str) -> String {
    format!(
        "npx openclaw skills run nano-banana-pro --prompt {}",
        serde_json::Value::String(prompt.to_string())
    )
}

/// Fills the Xiaohongshu creator form with a saved post.
pub struct Publisher<'a, R> {
    settings: &'a XiaohongshuConfig,
    runner: &'a R,
}

impl<'a, R: CommandRunner> Publisher<'a, R> {
    pub fn new(settings: &'a XiaohongshuConfig, runner: &'a R) -> Self {
        Self { settings, runner }
    }

    /// Read `path` and fill the creator form with it.
    ///
    /// Returns what the fill script reported.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn publish_file(&self, path: &Path) -> Result<String, PublishError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PublishError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if content.trim().is_empty() {
            return Err(PublishError::Empty(path.to_path_buf()));
        }

        let post = split_post(&content);
        info!(
            title = %char_prefix(&post.title, 50),
            body_chars = post.body.chars().count(),
            "Publishing post"
        );
        self.publish(&post).await
    }

    /// Open the creator page and fill in `post`.
    ///
    /// # Errors
    ///
    /// [`PublishError::Browser`] or [`PublishError::BrowserExit`] when
    /// navigation or the fill script fails. A failed screenshot is only logged.
    pub async fn publish(&self, post: &Post) -> Result<String, PublishError> {
        info!(url = %self.settings.publish_url, "Opening creator page");
        self.browser("navigate", vec!["navigate".into(), self.settings.publish_url.clone()])
            .await?;
        tokio::time::sleep(Duration::from_secs(self.settings.page_load_wait_secs)).await;

        // Screenshot is for the operator only.
        if let Err(e) = self.browser("screenshot", vec!["screenshot".into()]).await {
            warn!(error = %e, "Screenshot failed; continuing");
        }

        let result = self
            .browser("evaluate", vec!["evaluate".into(), "--fn".into(), fill_script(post)])
            .await?;
        info!(result = %result.trim(), "Creator form filled; finish cover and submit manually");
        Ok(result)
    }

    async fn browser(&self, step: &'static str, args: Vec<String>) -> Result<String, PublishError> {
        let invocation = Invocation::new(
            "openclaw",
            std::iter::once("browser".to_string()).chain(args),
            Duration::from_secs(self.settings.browser_timeout_secs),
        );
        let output = self
            .runner
            .run(&invocation)
            .await
            .map_err(|source| PublishError::Browser { step, source })?;
        if !output.success {
            return Err(PublishError::BrowserExit {
                step,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::FakeRunner;

    fn settings() -> XiaohongshuConfig {
        XiaohongshuConfig {
            page_load_wait_secs: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_split_post_with_label() {
        let post = split_post("标题：昨日AI圈3大热点\n\n正文第一行\n正文第二行\n");
        assert_eq!(post.title, "昨日AI圈3大热点");
        assert_eq!(post.body, "正文第一行\n正文第二行");
    }

    #[test]
    fn test_split_post_without_label() {
        let post = split_post("Plain title\nbody");
        assert_eq!(post.title, "Plain title");
        assert_eq!(post.body, "body");

        let post = split_post("only a title");
        assert_eq!(post.title, "only a title");
        assert_eq!(post.body, "");
    }

    #[test]
    fn test_fill_script_escapes_values() {
        let post = Post {
            title: "It's \"big\"".to_string(),
            body: "line1\nline2".to_string(),
        };
        let script = fill_script(&post);
        assert!(script.contains(r#"fill(input, "It's \"big\"");"#));
        assert!(script.contains(r#"fill(input, "line1\nline2");"#));
        assert!(script.contains("dispatchEvent(new Event('input', { bubbles: true }))"));
    }

    #[test]
    fn test_cover_command_quotes_prompt() {
        let cmd = cover_command("AI日报");
        assert!(cmd.starts_with("npx openclaw skills run nano-banana-pro --prompt \""));
        assert!(cmd.contains("Title: 'AI日报'"));
    }

    #[tokio::test]
    async fn test_publish_file_drives_browser() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("xhs_ai_news_20250506.txt");
        std::fs::write(&path, "标题：昨日AI圈1大热点\n\nbody text").unwrap();
        let runner = FakeRunner::new().stdout("evaluate", "Content filled successfully\n");
        let settings = settings();

        let result = Publisher::new(&settings, &runner)
            .publish_file(&path)
            .await
            .unwrap();
        assert_eq!(result.trim(), "Content filled successfully");

        let calls = runner.calls();
        let steps: Vec<&str> = calls.iter().map(|c| c.args[1].as_str()).collect();
        assert_eq!(steps, ["navigate", "screenshot", "evaluate"]);
        assert_eq!(calls[0].args[2], "https://creator.xiaohongshu.com/publish/publish");
        assert!(calls[2].args[3].contains("\"body text\""));
    }

    #[tokio::test]
    async fn test_publish_navigate_failure_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("post.txt");
        std::fs::write(&path, "标题：t\nb").unwrap();
        let runner = FakeRunner::new().failure("navigate", "browser not connected");
        let settings = settings();

        let err = Publisher::new(&settings, &runner)
            .publish_file(&path)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::BrowserExit { step: "navigate", .. }));
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_publish_screenshot_failure_is_tolerated() {
        let runner = FakeRunner::new().timeout("screenshot");
        let settings = settings();
        let post = Post {
            title: "t".into(),
            body: "b".into(),
        };
        Publisher::new(&settings, &runner).publish(&post).await.unwrap();
        assert_eq!(runner.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_publish_missing_file() {
        let runner = FakeRunner::new();
        let settings = settings();
        let err = Publisher::new(&settings, &runner)
            .publish_file(Path::new("/nonexistent/post.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Read { .. }));
        assert!(runner.calls().is_empty());
    }
}
