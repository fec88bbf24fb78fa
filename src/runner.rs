//! External process invocation with bounded timeouts.
//!
//! Every call to an outside tool (`npx openclaw skills run`, the news
//! aggregator script, `openclaw browser ...`) goes through the
//! [`CommandRunner`] trait so collectors and the publisher never spawn
//! processes directly.
//!
//! # Architecture
//!
//! - [`Invocation`]: program, arguments, working directory and timeout
//! - [`CommandRunner`]: async trait executing an invocation
//! - [`ProcessRunner`]: the real implementation on top of `tokio::process`
//!
//! A timed-out child is killed when its future is dropped.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// A single external command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub timeout: Duration,
}

impl Invocation {
    /// Create an invocation run in the current directory.
    ///
    /// # Arguments
    ///
    /// * `program` - Executable looked up on `PATH`
    /// * `args` - Arguments, passed without shell interpretation
    /// * `timeout` - Upper bound on the whole run; the child is killed past it
    pub fn new<I, S>(program: &str, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            timeout,
        }
    }

    /// Run in `dir` instead of the current directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// `program arg1 arg2 ...`, for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("`{program}` timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Runs external commands.
///
/// Implementors must enforce `Invocation::timeout` and report it as
/// [`RunError::Timeout`]. A process that exits non-zero is not an error at
/// this layer; callers inspect [`CommandOutput::success`].
pub trait CommandRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunError>;
}

/// [`CommandRunner`] backed by real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    #[instrument(level = "debug", skip_all, fields(program = %invocation.program))]
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunError> {
        let t0 = Instant::now();
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        let result = tokio::time::timeout(invocation.timeout, cmd.output()).await;
        let dt = t0.elapsed();

        match result {
            Ok(Ok(output)) => {
                debug!(
                    elapsed_ms = dt.as_millis() as u64,
                    status = %output.status,
                    stdout_bytes = output.stdout.len(),
                    "Command finished"
                );
                Ok(CommandOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    success: output.status.success(),
                })
            }
            Ok(Err(e)) => {
                warn!(error = %e, command = %invocation.display(), "Command could not be launched");
                Err(RunError::Spawn {
                    program: invocation.program.clone(),
                    source: e,
                })
            }
            Err(_) => Err(RunError::Timeout {
                program: invocation.program.clone(),
                secs: invocation.timeout.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted runner for tests: replies by program name and records calls.

    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    pub enum Reply {
        Ok(CommandOutput),
        Timeout,
    }

    #[derive(Default)]
    pub struct FakeRunner {
        replies: Mutex<HashMap<String, VecDeque<Reply>>>,
        calls: Mutex<Vec<Invocation>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a successful reply for the next call whose program or one of
        /// whose arguments equals `key`.
        pub fn stdout(self, key: &str, stdout: &str) -> Self {
            self.push(
                key,
                Reply::Ok(CommandOutput {
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                    success: true,
                }),
            )
        }

        pub fn failure(self, key: &str, stderr: &str) -> Self {
            self.push(
                key,
                Reply::Ok(CommandOutput {
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                    success: false,
                }),
            )
        }

        pub fn timeout(self, key: &str) -> Self {
            self.push(key, Reply::Timeout)
        }

        fn push(self, key: &str, reply: Reply) -> Self {
            self.replies
                .lock()
                .unwrap()
                .entry(key.to_string())
                .or_default()
                .push_back(reply);
            self
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandRunner for FakeRunner {
        async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunError> {
            self.calls.lock().unwrap().push(invocation.clone());
            let mut replies = self.replies.lock().unwrap();
            let key_for = |k: &str| replies.get(k).is_some_and(|q| !q.is_empty());
            let key = [
                invocation.args.iter().find(|a| key_for(a.as_str())).cloned(),
                Some(invocation.program.clone()).filter(|p| key_for(p.as_str())),
            ]
            .into_iter()
            .flatten()
            .next();

            match key.and_then(|k| replies.get_mut(&k).and_then(VecDeque::pop_front)) {
                Some(Reply::Ok(out)) => Ok(out),
                Some(Reply::Timeout) => Err(RunError::Timeout {
                    program: invocation.program.clone(),
                    secs: invocation.timeout.as_secs(),
                }),
                None => Ok(CommandOutput {
                    success: true,
                    ..Default::default()
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_display() {
        let inv = Invocation::new(
            "npx",
            ["openclaw", "skills", "run", "ai-news-collectors"],
            Duration::from_secs(180),
        );
        assert_eq!(inv.display(), "npx openclaw skills run ai-news-collectors");
        assert!(inv.cwd.is_none());
    }

    #[tokio::test]
    async fn test_process_runner_missing_program() {
        let inv = Invocation::new(
            "definitely-not-a-real-program-7f3a",
            Vec::<String>::new(),
            Duration::from_secs(5),
        );
        let err = ProcessRunner.run(&inv).await.unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_captures_stdout() {
        let inv = Invocation::new("sh", ["-c", "echo hello"], Duration::from_secs(5));
        let out = ProcessRunner.run(&inv).await.unwrap();
        assert!(out.success);
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_times_out() {
        let inv = Invocation::new("sh", ["-c", "sleep 5"], Duration::from_millis(100));
        let err = ProcessRunner.run(&inv).await.unwrap_err();
        assert!(matches!(err, RunError::Timeout { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_reports_exit_status() {
        let inv = Invocation::new("sh", ["-c", "echo oops >&2; exit 3"], Duration::from_secs(5));
        let out = ProcessRunner.run(&inv).await.unwrap();
        assert!(!out.success);
        assert_eq!(out.stderr.trim(), "oops");
    }
}
