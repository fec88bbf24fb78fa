//! Environment check for the external tools the pipeline depends on.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::config::ConfigOrigin;
use crate::runner::{CommandRunner, Invocation};
use crate::utils::ensure_writable_dir;

/// OpenClaw skills used by `generate` and `publish --cover`.
pub const REQUIRED_SKILLS: [(&str, &str); 3] = [
    ("ai-news-collectors", "AI news collector"),
    ("news-aggregator-skill-2", "multi-source news aggregator"),
    ("nano-banana-pro", "AI cover image generation"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillStatus {
    pub name: &'static str,
    pub description: &'static str,
    pub path: PathBuf,
    pub installed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub skills: Vec<SkillStatus>,
    pub browser_connected: bool,
    pub config: ConfigOrigin,
    pub output_writable: bool,
}

impl CheckReport {
    /// Running on built-in defaults is fine; a named file that is missing or
    /// broken is not.
    pub fn config_ok(&self) -> bool {
        matches!(self.config, ConfigOrigin::Defaults | ConfigOrigin::Loaded(_))
    }

    /// True when every check passed.
    pub fn all_ok(&self) -> bool {
        self.browser_connected
            && self.config_ok()
            && self.output_writable
            && self.skills.iter().all(|s| s.installed)
    }
}

/// Whether `openclaw browser status` output means a browser is attached.
pub fn browser_connected(success: bool, stdout: &str) -> bool {
    let lower = stdout.to_lowercase();
    success && !lower.contains("disconnected") && !lower.contains("not connected")
}

/// Check everything `generate` and `publish` need before a real run.
///
/// # Arguments
///
/// * `runner` - Used for `openclaw browser status`
/// * `skills_dir` - OpenClaw skills checkout holding [`REQUIRED_SKILLS`]
/// * `config` - Where the running configuration came from
/// * `output_dir` - Created if missing, then tested for writability
///
/// # Returns
///
/// A [`CheckReport`]. Individual failures are logged and recorded, never
/// returned as errors.
#[instrument(level = "info", skip_all, fields(skills_dir = %skills_dir.display()))]
pub async fn run_checks<R: CommandRunner>(
    runner: &R,
    skills_dir: &Path,
    config: &ConfigOrigin,
    output_dir: &Path,
) -> CheckReport {
    let skills: Vec<SkillStatus> = REQUIRED_SKILLS
        .iter()
        .map(|&(name, description)| {
            let path = skills_dir.join(name);
            let installed = path.is_dir();
            if installed {
                info!(skill = name, "Skill installed");
            } else {
                warn!(
                    skill = name,
                    install = %format!("npx clawhub@latest install {name}"),
                    "Skill missing"
                );
            }
            SkillStatus {
                name,
                description,
                path,
                installed,
            }
        })
        .collect();

    let status = Invocation::new("openclaw", ["browser", "status"], Duration::from_secs(10));
    let browser_connected = match runner.run(&status).await {
        Ok(out) => browser_connected(out.success, &out.stdout),
        Err(e) => {
            warn!(error = %e, "Could not query OpenClaw browser status");
            false
        }
    };
    if !browser_connected {
        warn!("OpenClaw browser is not connected; install and pair the Chrome extension");
    }

    match config {
        ConfigOrigin::Loaded(path) => info!(path = %path.display(), "Config file loaded"),
        ConfigOrigin::Defaults => info!("No config file; running on built-in defaults"),
        ConfigOrigin::Missing(path) => warn!(path = %path.display(), "Config file does not exist"),
        ConfigOrigin::Invalid(path) => warn!(path = %path.display(), "Config file is invalid"),
    }

    let output_writable = match ensure_writable_dir(output_dir).await {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %output_dir.display(), error = %e, "Output directory is not writable");
            false
        }
    };

    CheckReport {
        skills,
        browser_connected,
        config: config.clone(),
        output_writable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::FakeRunner;

    #[test]
    fn test_browser_connected() {
        assert!(browser_connected(true, "Browser: connected (tab 3)"));
        assert!(browser_connected(true, ""));
        assert!(!browser_connected(true, "Browser disconnected"));
        assert!(!browser_connected(false, "connected"));
    }

    #[tokio::test]
    async fn test_run_checks() {
        let tmp = tempfile::tempdir().unwrap();
        let skills_dir = tmp.path().join("skills");
        std::fs::create_dir_all(skills_dir.join("ai-news-collectors")).unwrap();
        let runner = FakeRunner::new().stdout("status", "connected");

        let config = ConfigOrigin::Loaded(tmp.path().join("config.yaml"));
        let report = run_checks(&runner, &skills_dir, &config, &tmp.path().join("output")).await;

        assert!(report.skills[0].installed);
        assert!(report.config_ok());
        assert!(!report.skills[1].installed);
        assert!(report.browser_connected);
        assert!(report.output_writable);
        assert!(!report.all_ok());
        assert_eq!(runner.calls()[0].args, ["browser", "status"]);
    }

    #[tokio::test]
    async fn test_run_checks_browser_timeout() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new().timeout("status");
        let report = run_checks(&runner, tmp.path(), &ConfigOrigin::Defaults, tmp.path()).await;
        assert!(!report.browser_connected);
        assert!(report.config_ok());
    }

    #[tokio::test]
    async fn test_run_checks_reports_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        for name in REQUIRED_SKILLS.map(|(name, _)| name) {
            std::fs::create_dir_all(tmp.path().join(name)).unwrap();
        }
        let runner = FakeRunner::new();

        let ok = run_checks(&runner, tmp.path(), &ConfigOrigin::Defaults, tmp.path()).await;
        assert!(ok.all_ok());

        let missing = ConfigOrigin::Missing(tmp.path().join("config.json"));
        let report = run_checks(&runner, tmp.path(), &missing, tmp.path()).await;
        assert_eq!(report.config, missing);
        assert!(!report.config_ok());
        assert!(!report.all_ok());

        let invalid = ConfigOrigin::Invalid(tmp.path().join("config.yaml"));
        assert!(!run_checks(&runner, tmp.path(), &invalid, tmp.path()).await.config_ok());
    }
}
