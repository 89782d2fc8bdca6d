use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur while computing churn.
///
/// Library crates return this type directly; the binary renders it through
/// `miette`, so every variant carries a diagnostic code naming the stage
/// that failed.
///
/// # Examples
///
/// ```
/// use churn_core::ChurnError;
///
/// let err = ChurnError::Config("since_days = 99999999 reaches before the earliest supported date".into());
/// assert!(err.to_string().contains("since_days"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ChurnError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(churn::io))]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(churn::config))]
    Config(String),

    /// Neither a `.git` nor a `.svn` directory exists at the target path.
    #[error("churning requires a git or subversion working copy: {}", .path.display())]
    #[diagnostic(
        code(churn::detect),
        help("run churn from the root of a git or svn working copy, or pass --path")
    )]
    NoRepositoryFound {
        /// Directory that was checked.
        path: PathBuf,
    },

    /// The version-control command failed to run or reported failure.
    #[error(transparent)]
    #[diagnostic(code(churn::vcs_command))]
    VcsCommand(#[from] VcsCommandError),

    /// A date value could not be parsed as `YYYY-MM-DD`.
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    #[diagnostic(code(churn::date))]
    InvalidDate {
        /// The rejected input.
        value: String,
    },

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(churn::json))]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization failure.
    #[error("YAML error: {0}")]
    #[diagnostic(code(churn::yaml))]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(churn::toml))]
    Toml(#[from] toml::de::Error),
}

/// A failed invocation of `git` or `svn`.
///
/// # Examples
///
/// ```
/// use churn_core::{VcsCommandError, VcsFailureKind};
///
/// let err = VcsCommandError {
///     command: "git log --name-only --pretty=format:".into(),
///     kind: VcsFailureKind::Exit { code: Some(128) },
///     stderr: "fatal: not a git repository".into(),
/// };
/// assert!(err.to_string().contains("exit code 128"));
/// assert!(err.to_string().contains("not a git repository"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{command}` failed ({kind}){}", stderr_suffix(.stderr))]
pub struct VcsCommandError {
    /// The command line that was executed.
    pub command: String,
    /// How the command failed.
    pub kind: VcsFailureKind,
    /// Captured standard error, trimmed.
    pub stderr: String,
}

impl VcsCommandError {
    /// Exit code of the process, when it exited on its own.
    pub fn exit_code(&self) -> Option<i32> {
        match self.kind {
            VcsFailureKind::Exit { code } => code,
            _ => None,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Classification of a [`VcsCommandError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsFailureKind {
    /// The program could not be started (usually not installed).
    Spawn {
        /// OS error message.
        message: String,
    },
    /// The program exited unsuccessfully. `None` means it was killed by a signal.
    Exit {
        /// Process exit code.
        code: Option<i32>,
    },
    /// The program ran past the configured timeout and was killed.
    Timeout {
        /// The timeout that elapsed.
        after: Duration,
    },
}

impl fmt::Display for VcsFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsFailureKind::Spawn { message } => write!(f, "could not start: {message}"),
            VcsFailureKind::Exit { code: Some(code) } => write!(f, "exit code {code}"),
            VcsFailureKind::Exit { code: None } => write!(f, "terminated by signal"),
            VcsFailureKind::Timeout { after } => {
                write!(f, "timed out after {}s", after.as_secs())
            }
        }
    }
}
