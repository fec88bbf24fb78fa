//! # AI Daily News
//!
//! Collects AI news from several OpenClaw-driven sources, removes
//! near-duplicates and renders a daily Xiaohongshu post, then optionally fills
//! the Xiaohongshu creator form through the OpenClaw browser.
//!
//! ## Usage
//!
//! ```sh
//! ai_daily_news generate            # collect and save today's post
//! ai_daily_news generate --dry-run  # print without saving
//! ai_daily_news publish --latest    # fill the creator form with the newest post
//! ai_daily_news blog "Claude 3.5"   # write a tech article into posts/
//! ai_daily_news check               # verify skills, browser and config
//! ```
//!
//! ## Architecture
//!
//! 1. **Collecting**: each source runs in turn through an external tool; a
//!    failing source contributes nothing
//! 2. **Ranking**: near-duplicate titles are dropped, the list is cut and
//!    decorated
//! 3. **Rendering**: the post text is built from configurable templates
//! 4. **Output**: one file per day in the output directory
//! 5. **Publishing** (separate step): the saved post is typed into the
//!    creator page by browser automation
//!
//! `blog` is a second, independent producer: it writes a Markdown article and
//! its Xiaohongshu text into a dated folder, publishable the same way.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod blog;
mod check;
mod cli;
mod collectors;
mod config;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod publish;
mod rank;
mod runner;
mod utils;

use blog::{Blogger, StubDocs};
use cli::{BlogArgs, Cli, Command, GenerateArgs, PublishArgs};
use config::{Config, ConfigOrigin, DEFAULT_CONFIG_FILES};
use outputs::store;
use pipeline::Generator;
use publish::{PublishError, Publisher, cover_command, image_command};
use runner::ProcessRunner;
use utils::openclaw_skills_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "ai_daily_news starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = Config::load(args.config.as_deref()).await;
    let runner = ProcessRunner;

    let result = match args.command {
        Command::Generate(gen_args) => generate(&config, &runner, gen_args).await,
        Command::Publish(pub_args) => publish(&config, &runner, pub_args).await,
        Command::Blog(blog_args) => blog(&config, &runner, blog_args).await,
        Command::Check => check(&config, &runner).await,
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    result
}

async fn generate(
    config: &Config,
    runner: &ProcessRunner,
    args: GenerateArgs,
) -> Result<(), Box<dyn Error>> {
    let today = Local::now().date_naive();
    let digest = match Generator::new(config, runner).run(today, args.dry_run).await {
        Ok(digest) => digest,
        Err(e) => {
            error!(error = %e, "Generation failed");
            return Err(e.into());
        }
    };

    info!(news = digest.records.len(), "Post ready");
    match &digest.path {
        Some(path) => println!("{}", path.display()),
        None => println!("{}", digest.content),
    }

    if args.cover {
        let title = publish::split_post(&digest.content).title;
        info!(command = %cover_command(&title), "Generate a cover image with");
    }

    if args.publish {
        if let Some(path) = &digest.path {
            publish_path(config, runner, path.clone()).await?;
        }
    } else if !args.dry_run {
        info!("Publish with: ai_daily_news publish --latest");
    }
    Ok(())
}

async fn publish(
    config: &Config,
    runner: &ProcessRunner,
    args: PublishArgs,
) -> Result<(), Box<dyn Error>> {
    let path = if args.latest {
        let dir = config.output_dir();
        match store::find_latest(&dir).await? {
            Some(path) => {
                info!(path = %path.display(), "Using latest post");
                path
            }
            None => {
                error!(dir = %dir.display(), "No generated post found");
                return Err(PublishError::NoPostFound(dir).into());
            }
        }
    } else {
        // clap guarantees a file when --latest is absent.
        args.file.unwrap_or_default()
    };

    if args.cover {
        let content = tokio::fs::read_to_string(&path).await.unwrap_or_default();
        let title = publish::split_post(&content).title;
        info!(command = %cover_command(&title), "Generate a cover image with");
    }

    publish_path(config, runner, path).await
}

async fn blog(config: &Config, runner: &ProcessRunner, args: BlogArgs) -> Result<(), Box<dyn Error>> {
    let now = Local::now().naive_local();
    let blogger = Blogger::new(&config.blog, &StubDocs, config.blog_dir());
    let result = if args.compare {
        blogger.write_comparison(&args.techs, now).await
    } else {
        blogger.write_article(&args.techs.join(" "), now).await
    };
    let saved = match result {
        Ok(saved) => saved,
        Err(e) => {
            error!(error = %e, "Article generation failed");
            return Err(e.into());
        }
    };

    info!(tech = %saved.tech_name, tags = %saved.tags.join(", "), "Article ready");
    println!("{}", saved.dir.display());

    if args.cover {
        info!(command = %image_command(&saved.image_prompt), "Generate a cover image with");
    }

    if args.publish {
        publish_path(config, runner, saved.xiaohongshu_file()).await?;
    } else {
        info!(
            "Publish with: ai_daily_news publish {}",
            saved.xiaohongshu_file().display()
        );
    }
    Ok(())
}

async fn publish_path(
    config: &Config,
    runner: &ProcessRunner,
    path: PathBuf,
) -> Result<(), Box<dyn Error>> {
    if !config.xiaohongshu.enabled {
        warn!("Xiaohongshu publishing disabled in config; skipping");
        return Ok(());
    }

    match Publisher::new(&config.xiaohongshu, runner)
        .publish_file(&path)
        .await
    {
        Ok(_) => {
            println!("Post filled in. Upload a cover, review and submit manually.");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Publishing failed");
            warn!(
                url = %config.xiaohongshu.publish_url,
                file = %path.display(),
                "Fallback: open the creator page manually and paste the file content"
            );
            Err(e.into())
        }
    }
}

async fn check(config: &Config, runner: &ProcessRunner) -> Result<(), Box<dyn Error>> {
    let report = check::run_checks(
        runner,
        &openclaw_skills_dir(),
        &config.origin,
        &config.output_dir(),
    )
    .await;

    for skill in &report.skills {
        if skill.installed {
            println!("[OK] {} ({})", skill.description, skill.name);
        } else {
            println!(
                "[Missing] {} ({}) expected at {}; install: npx clawhub@latest install {}",
                skill.description,
                skill.name,
                skill.path.display(),
                skill.name
            );
        }
    }
    println!(
        "[{}] OpenClaw browser",
        if report.browser_connected { "OK" } else { "Not connected" }
    );
    match &report.config {
        ConfigOrigin::Loaded(path) => println!("[OK] Config file {}", path.display()),
        ConfigOrigin::Defaults => println!(
            "[Default] No config file; using built-in defaults (looked for {})",
            DEFAULT_CONFIG_FILES.join(", ")
        ),
        ConfigOrigin::Missing(path) => println!("[Missing] Config file {}", path.display()),
        ConfigOrigin::Invalid(path) => println!("[Invalid] Config file {}; see the warning above", path.display()),
    }
    println!(
        "[{}] Output directory {}",
        if report.output_writable { "OK" } else { "Not writable" },
        config.output_dir().display()
    );

    if report.all_ok() {
        Ok(())
    } else {
        Err("environment check failed".into())
    }
}
