//! Command-line interface definitions.
//!
//! Subcommands are defined with `clap` derive. `--config` is global and can
//! also come from the `AI_DAILY_NEWS_CONFIG` environment variable.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for AI Daily News.
///
/// # Examples
///
/// ```sh
/// # Generate today's post
/// ai_daily_news generate
///
/// # Preview without saving
/// ai_daily_news generate --dry-run
///
/// # Fill the creator form with the newest saved post
/// ai_daily_news publish --latest
///
/// # Write a tech article, or compare several technologies
/// ai_daily_news blog "Claude 3.5"
/// ai_daily_news blog --compare GPT-4o "Claude 3.5" "Kimi K2"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a config file (.json, .yaml or .yml)
    #[arg(short, long, global = true, env = "AI_DAILY_NEWS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect news and write today's post
    Generate(GenerateArgs),
    /// Fill the Xiaohongshu creator form with a saved post
    Publish(PublishArgs),
    /// Write a tech article (or a comparison) as Markdown and Xiaohongshu text
    Blog(BlogArgs),
    /// Check installed skills, browser connection, config file and output directory
    Check,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Print the post instead of saving it
    #[arg(long)]
    pub dry_run: bool,

    /// Publish the post right after saving it
    #[arg(long, conflicts_with = "dry_run")]
    pub publish: bool,

    /// Also print the cover image generation command
    #[arg(long)]
    pub cover: bool,
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Post file to publish
    #[arg(required_unless_present = "latest", conflicts_with = "latest")]
    pub file: Option<PathBuf>,

    /// Publish the most recently generated post
    #[arg(long)]
    pub latest: bool,

    /// Also print the cover image generation command
    #[arg(long)]
    pub cover: bool,
}

#[derive(Args, Debug)]
pub struct BlogArgs {
    /// Technology name; several words are joined into one name unless
    /// --compare is given
    #[arg(required = true, num_args = 1..)]
    pub techs: Vec<String>,

    /// Compare the technologies in one article (needs at least two)
    #[arg(long)]
    pub compare: bool,

    /// Fill the creator form with the article right after saving it
    #[arg(long)]
    pub publish: bool,

    /// Also print the cover image generation command
    #[arg(long)]
    pub cover: bool,
}
