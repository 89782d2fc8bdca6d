//! External command execution.
//!
//! Commands are spawned from an explicit argument list, never through a
//! shell, so date values and paths cannot inject extra arguments.

use std::fmt;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;

use churn_core::{VcsCommandError, VcsFailureKind};
use tokio::process::Command;

/// A fully specified process invocation.
///
/// # Examples
///
/// ```
/// use churn_pulse::process::CommandSpec;
///
/// let spec = CommandSpec::new("git", ["log", "--name-only"], ".");
/// assert_eq!(spec.to_string(), "git log --name-only");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name, resolved through `PATH`.
    pub program: String,
    /// Arguments, passed verbatim.
    pub args: Vec<String>,
    /// Working directory for the child.
    pub current_dir: PathBuf,
    /// Kill the child after this long.
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    /// Build a spec with no timeout.
    pub fn new<I, S>(program: impl Into<String>, args: I, current_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            current_dir: current_dir.into(),
            timeout: None,
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn failure(&self, kind: VcsFailureKind, stderr: &[u8]) -> VcsCommandError {
        VcsCommandError {
            command: self.to_string(),
            kind,
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs a command to completion and returns its standard output.
///
/// The seam between the churn pipeline and the operating system; tests
/// substitute a scripted implementation.
pub trait CommandRunner {
    /// Execute `spec`.
    ///
    /// # Errors
    ///
    /// Returns a [`VcsCommandError`] when the program cannot be started,
    /// exits unsuccessfully, or exceeds `spec.timeout`.
    fn run(&self, spec: &CommandSpec) -> Result<String, VcsCommandError>;
}

/// [`CommandRunner`] backed by `tokio::process`, driven on a current-thread
/// runtime so callers stay synchronous.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<String, VcsCommandError> {
        log::debug!("running `{spec}` in {}", spec.current_dir.display());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                spec.failure(
                    VcsFailureKind::Spawn {
                        message: format!("failed to start runtime: {e}"),
                    },
                    &[],
                )
            })?;

        let output = runtime.block_on(run_with_timeout(spec))?;
        if output.status.success() {
            log::debug!("`{spec}` produced {} bytes", output.stdout.len());
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(spec.failure(
                VcsFailureKind::Exit {
                    code: output.status.code(),
                },
                &output.stderr,
            ))
        }
    }
}

async fn run_with_timeout(spec: &CommandSpec) -> Result<Output, VcsCommandError> {
    // Dropping the output future on timeout kills the child and closes both
    // pipes, so processes it spawned cannot keep the call alive.
    let child = Command::new(&spec.program)
        .args(&spec.args)
        .current_dir(&spec.current_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            spec.failure(
                VcsFailureKind::Spawn {
                    message: e.to_string(),
                },
                &[],
            )
        })?;

    let wait_failed = |e: std::io::Error| {
        spec.failure(
            VcsFailureKind::Spawn {
                message: format!("failed to wait for child: {e}"),
            },
            &[],
        )
    };

    // A timeout too large to form a deadline is treated as no timeout.
    let deadline = spec
        .timeout
        .and_then(|timeout| tokio::time::Instant::now().checked_add(timeout));
    let Some(deadline) = deadline else {
        return child.wait_with_output().await.map_err(wait_failed);
    };

    match tokio::time::timeout_at(deadline, child.wait_with_output()).await {
        Ok(result) => result.map_err(wait_failed),
        Err(_) => {
            let after = spec.timeout.unwrap_or_default();
            log::warn!("killed `{spec}` after {}s", after.as_secs());
            Err(spec.failure(VcsFailureKind::Timeout { after }, &[]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn display_joins_program_and_args() {
        let spec = CommandSpec::new(
            "svn",
            ["log", "--revision", "{2020-01-01}:{2020-02-01}", "--verbose"],
            "/repo",
        );
        assert_eq!(
            spec.to_string(),
            "svn log --revision {2020-01-01}:{2020-02-01} --verbose"
        );
    }

    #[test]
    fn missing_program_is_a_spawn_failure() {
        let spec = CommandSpec::new("churn-test-no-such-program", ["log"], ".");
        let err = SystemRunner.run(&spec).unwrap_err();
        assert!(matches!(err.kind, VcsFailureKind::Spawn { .. }));
        assert_eq!(err.command, "churn-test-no-such-program log");
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout_on_success() {
        let spec = CommandSpec::new("sh", ["-c", "printf 'a.rb\\nb.rb\\n'"], ".");
        let out = SystemRunner.run(&spec).unwrap();
        assert_eq!(out, "a.rb\nb.rb\n");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_carries_code_and_stderr() {
        let spec = CommandSpec::new("sh", ["-c", "echo boom >&2; exit 3"], ".");
        let err = SystemRunner.run(&spec).unwrap_err();
        assert_eq!(err.kind, VcsFailureKind::Exit { code: Some(3) });
        assert_eq!(err.stderr, "boom");
    }

    #[cfg(unix)]
    #[test]
    fn slow_command_times_out() {
        let spec = CommandSpec::new("sh", ["-c", "exec sleep 5"], ".")
            .with_timeout(Some(Duration::from_millis(100)));
        let started = Instant::now();
        let err = SystemRunner.run(&spec).unwrap_err();
        assert!(matches!(err.kind, VcsFailureKind::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_does_not_wait_for_grandchildren() {
        // `sh` forks `sleep`, which inherits the output pipes.
        let spec = CommandSpec::new("sh", ["-c", "sleep 4; true"], ".")
            .with_timeout(Some(Duration::from_millis(100)));
        let started = Instant::now();
        let err = SystemRunner.run(&spec).unwrap_err();
        assert!(matches!(err.kind, VcsFailureKind::Timeout { .. }));
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "returned after {:?}",
            started.elapsed()
        );
    }

    #[cfg(unix)]
    #[test]
    fn huge_timeout_behaves_like_none() {
        let spec = CommandSpec::new("sh", ["-c", "echo ok"], ".")
            .with_timeout(Some(Duration::from_secs(u64::MAX)));
        assert_eq!(SystemRunner.run(&spec).unwrap(), "ok\n");
    }
}
