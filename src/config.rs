//! Run configuration: news sources, post templates, tech blog settings and
//! output locations.
//!
//! The configuration is loaded once at startup by [`Config::load`] and passed
//! by reference into every component. Files ending in `.json` are parsed with
//! `serde_json`; anything else is treated as YAML. Every key is optional.
//!
//! A missing file yields [`Config::default`]. A file that cannot be read or
//! parsed, or whose templates use an unknown placeholder, is reported with a
//! warning and also replaced by the defaults: configuration problems never
//! stop a run.
//!
//! # Example
//!
//! ```yaml
//! news_sources:
//!   ai_news_collectors:
//!     enabled: true
//!   news_aggregator:
//!     keywords: [AI, LLM, Agent]
//!     limit: 15
//!   techmeme:
//!     enabled: false
//! xiaohongshu:
//!   post_format:
//!     title_template: "{date} AI圈{count}条热点"
//!     header: "{date} AI圈真实热点"
//! output:
//!   save_directory: /var/lib/ai_daily_news
//! blog:
//!   default_tags: [AI, 大模型]
//!   image_style: minimal
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::rank::DEFAULT_MAX_COUNT;
use crate::utils::openclaw_skills_dir;

/// Config files looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = ["config.yaml", "config.yml", "config.json"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown placeholder {{{name}}} in template {template:?} (allowed: {allowed})")]
    UnknownPlaceholder {
        name: String,
        template: String,
        allowed: String,
    },

    #[error("unbalanced brace in template {template:?}; write {{{{ or }}}} for a literal brace")]
    UnbalancedBrace { template: String },

    #[error("{field} must be {rule}")]
    Invalid {
        field: &'static str,
        rule: &'static str,
    },
}

/// Where the running configuration came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// No file given and none found; built-in defaults.
    #[default]
    Defaults,
    Loaded(PathBuf),
    /// The requested file does not exist; defaults are used.
    Missing(PathBuf),
    /// The file could not be read or parsed; defaults are used.
    Invalid(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub news_sources: NewsSources,
    pub xiaohongshu: XiaohongshuConfig,
    pub output: OutputConfig,
    pub blog: BlogConfig,
    /// Directory relative paths in this config are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
    #[serde(skip)]
    pub origin: ConfigOrigin,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NewsSources {
    pub ai_news_collectors: AiNewsCollectorsConfig,
    pub news_aggregator: NewsAggregatorConfig,
    pub techmeme: TechmemeConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AiNewsCollectorsConfig {
    pub enabled: bool,
    /// OpenClaw skill to run.
    pub skill: String,
    pub timeout_secs: u64,
}

impl Default for AiNewsCollectorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            skill: "ai-news-collectors".to_string(),
            timeout_secs: 180,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NewsAggregatorConfig {
    pub enabled: bool,
    pub keywords: Vec<String>,
    pub limit: usize,
    pub timeout_secs: u64,
    /// Checkout of the `news-aggregator-skill-2` skill. Defaults to the
    /// OpenClaw workspace copy.
    pub skill_dir: Option<PathBuf>,
}

impl Default for NewsAggregatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keywords: ["AI", "LLM", "GPT", "OpenAI"].map(String::from).to_vec(),
            limit: 10,
            timeout_secs: 120,
            skill_dir: None,
        }
    }
}

impl NewsAggregatorConfig {
    /// `skill_dir`, or `~/.openclaw/workspace/skills/news-aggregator-skill-2`.
    pub fn resolved_skill_dir(&self) -> PathBuf {
        self.skill_dir
            .clone()
            .unwrap_or_else(|| openclaw_skills_dir().join("news-aggregator-skill-2"))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TechmemeConfig {
    pub enabled: bool,
    pub url: String,
    /// Headlines are kept when they contain any of these (case-insensitive).
    pub keywords: Vec<String>,
    /// Number of front-page items inspected.
    pub limit: usize,
    pub timeout_secs: u64,
}

impl Default for TechmemeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "https://www.techmeme.com".to_string(),
            keywords: [
                "AI",
                "artificial intelligence",
                "ChatGPT",
                "OpenAI",
                "LLM",
                "machine learning",
                "Claude",
                "model",
            ]
            .map(String::from)
            .to_vec(),
            limit: 15,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct XiaohongshuConfig {
    pub enabled: bool,
    pub publish_url: String,
    /// Pause after opening the creator page before filling it in.
    pub page_load_wait_secs: u64,
    /// Timeout for each browser command.
    pub browser_timeout_secs: u64,
    pub post_format: PostFormat,
}

impl Default for XiaohongshuConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            publish_url: "https://creator.xiaohongshu.com/publish/publish".to_string(),
            page_load_wait_secs: 5,
            browser_timeout_secs: 30,
            post_format: PostFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PostFormat {
    pub title_template: TitleTemplate,
    pub header: HeaderTemplate,
    /// Maximum number of news entries in one post.
    pub max_items: usize,
}

impl Default for PostFormat {
    fn default() -> Self {
        Self {
            title_template: TitleTemplate::default(),
            header: HeaderTemplate::default(),
            max_items: DEFAULT_MAX_COUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub save_directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_directory: PathBuf::from("output"),
        }
    }
}

/// Look of the generated cover image prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    #[default]
    Default,
    Minimal,
    Detailed,
}

/// Settings for `blog`, the single-technology article generator.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BlogConfig {
    /// Tags every article starts with before keyword tags are added.
    pub default_tags: Vec<String>,
    pub image_style: ImageStyle,
    /// Include the first code example, when the documentation has one.
    pub include_code: bool,
    /// Character count above which the Xiaohongshu text is flagged as too long.
    pub max_length: usize,
    pub save_directory: PathBuf,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            default_tags: ["AI", "人工智能", "大模型", "技术文档"].map(String::from).to_vec(),
            image_style: ImageStyle::Default,
            include_code: true,
            max_length: 1000,
            save_directory: PathBuf::from("posts"),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the first of
    /// [`DEFAULT_CONFIG_FILES`] present in the working directory.
    ///
    /// Never fails: problems are logged and the defaults are used.
    #[instrument(level = "info", skip_all, fields(path = ?path))]
    pub async fn load(path: Option<&Path>) -> Config {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => DEFAULT_CONFIG_FILES
                .iter()
                .map(PathBuf::from)
                .find(|p| p.is_file()),
        };

        let Some(path) = path else {
            info!("No config file found; using built-in defaults");
            return Config::default();
        };

        if !path.exists() {
            warn!(path = %path.display(), "Config file does not exist; using built-in defaults");
            return Config {
                origin: ConfigOrigin::Missing(path),
                ..Config::default()
            };
        }

        match Self::read(&path).await {
            Ok(config) => {
                info!(path = %path.display(), "Loaded configuration");
                Config {
                    origin: ConfigOrigin::Loaded(path),
                    ..config
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid configuration; using built-in defaults");
                Config {
                    origin: ConfigOrigin::Invalid(path),
                    ..Config::default()
                }
            }
        }
    }

    async fn read(path: &Path) -> Result<Config, ConfigError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let mut config = if is_json {
            Self::from_json(&text)?
        } else {
            Self::from_yaml(&text)?
        };
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(text: &str) -> Result<Config, ConfigError> {
        serde_json::from_str::<Config>(text)?.validate()
    }

    /// Parse and validate a YAML config document.
    pub fn from_yaml(text: &str) -> Result<Config, ConfigError> {
        // An empty YAML document means "all defaults".
        if text.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str::<Config>(text)?.validate()
    }

    /// Reject values that parse but would produce a useless run.
    fn validate(self) -> Result<Config, ConfigError> {
        if self.xiaohongshu.post_format.max_items == 0 {
            return Err(ConfigError::Invalid {
                field: "xiaohongshu.post_format.max_items",
                rule: "at least 1",
            });
        }
        if self.blog.max_length == 0 {
            return Err(ConfigError::Invalid {
                field: "blog.max_length",
                rule: "at least 1",
            });
        }
        Ok(self)
    }

    /// Output directory, with relative paths anchored at the config file.
    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.output.save_directory)
    }

    /// Directory `blog` saves article folders into, anchored like [`Config::output_dir`].
    pub fn blog_dir(&self) -> PathBuf {
        self.resolve(&self.blog.save_directory)
    }

    fn resolve(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.base_dir.join(dir)
        }
    }
}

/// Substitution keys a template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Date,
    Count,
}

impl Placeholder {
    fn name(&self) -> &'static str {
        match self {
            Placeholder::Date => "date",
            Placeholder::Count => "count",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Key(Placeholder),
}

/// A format string with `{name}` placeholders, validated when parsed.
///
/// `{{` and `}}` produce literal braces. Any other brace that is not part of
/// a `{name}` placeholder is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
    segments: Vec<Segment>,
}

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}").expect("valid placeholder regex"));

impl Template {
    /// Parse `raw`, accepting only the `allowed` placeholders.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownPlaceholder`] for a `{name}` outside `allowed`,
    /// [`ConfigError::UnbalancedBrace`] for a lone `{` or `}`.
    pub fn parse(raw: &str, allowed: &[Placeholder]) -> Result<Self, ConfigError> {
        let literal = |gap: &str| {
            if gap.contains(['{', '}']) {
                Err(ConfigError::UnbalancedBrace {
                    template: raw.to_string(),
                })
            } else {
                Ok(())
            }
        };
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut last = 0;

        for caps in PLACEHOLDER_RE.captures_iter(raw) {
            let m = caps.get(0).expect("group 0 always present");
            let gap = &raw[last..m.start()];
            literal(gap)?;
            text.push_str(gap);
            last = m.end();
            match caps.get(1) {
                None => text.push_str(&m.as_str()[..1]),
                Some(name) => {
                    let name = name.as_str().trim();
                    let key = allowed.iter().find(|p| p.name() == name).ok_or_else(|| {
                        ConfigError::UnknownPlaceholder {
                            name: name.to_string(),
                            template: raw.to_string(),
                            allowed: allowed.iter().map(Placeholder::name).collect::<Vec<_>>().join(", "),
                        }
                    })?;
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(Segment::Key(*key));
                }
            }
        }
        literal(&raw[last..])?;
        text.push_str(&raw[last..]);
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Substitute placeholders. `value` is asked for every key the template uses.
    pub fn render(&self, value: impl Fn(Placeholder) -> String) -> String {
        self.segments
            .iter()
            .map(|seg| match seg {
                Segment::Text(t) => t.clone(),
                Segment::Key(k) => value(*k),
            })
            .collect()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

macro_rules! template_newtype {
    ($(#[$meta:meta])* $name:ident, [$($key:ident),+], $default:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Template);

        impl $name {
            pub const ALLOWED: &'static [Placeholder] = &[$(Placeholder::$key),+];

            pub fn parse(raw: &str) -> Result<Self, ConfigError> {
                Template::parse(raw, Self::ALLOWED).map(Self)
            }

            pub fn template(&self) -> &Template {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::parse($default).expect("built-in template is valid")
            }
        }

        impl TryFrom<String> for $name {
            type Error = ConfigError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::parse(&raw)
            }
        }

        impl From<$name> for String {
            fn from(t: $name) -> String {
                t.0.raw
            }
        }
    };
}

template_newtype!(
    /// Post title; accepts `{date}` and `{count}`.
    TitleTemplate,
    [Date, Count],
    "昨日AI圈{count}大热点"
);

template_newtype!(
    /// Header line; accepts `{date}`.
    HeaderTemplate,
    [Date],
    "{date} AI圈真实热点"
);
