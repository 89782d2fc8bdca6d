//! Version-control log sources.
//!
//! A [`LogSource`] knows which command prints a repository's change history
//! and how to pull touched paths out of what it prints.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use churn_core::ChurnError;

use crate::extract;
use crate::process::{CommandRunner, CommandSpec};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Supported version-control systems.
///
/// # Examples
///
/// ```
/// use churn_pulse::source::LogSource;
///
/// assert_eq!(LogSource::Git.program(), "git");
/// assert_eq!(LogSource::Svn.to_string(), "subversion");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    /// `git log --name-only`.
    Git,
    /// `svn log --verbose`.
    Svn,
}

impl LogSource {
    /// Pick the source for the working copy rooted at `root`.
    ///
    /// `.git` is checked before `.svn`.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::NoRepositoryFound`] if neither exists.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use churn_pulse::source::LogSource;
    ///
    /// let source = LogSource::detect(Path::new(".")).unwrap();
    /// println!("using {source}");
    /// ```
    pub fn detect(root: &Path) -> Result<Self, ChurnError> {
        // `.git` may be a file in worktrees and submodules.
        if root.join(".git").exists() {
            Ok(LogSource::Git)
        } else if root.join(".svn").exists() {
            Ok(LogSource::Svn)
        } else {
            Err(ChurnError::NoRepositoryFound {
                path: root.to_path_buf(),
            })
        }
    }

    /// Executable name.
    pub fn program(self) -> &'static str {
        match self {
            LogSource::Git => "git",
            LogSource::Svn => "svn",
        }
    }

    /// Arguments for the log command, restricted to `since` when given.
    ///
    /// `today` closes the svn revision range.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use churn_pulse::source::LogSource;
    ///
    /// let since = NaiveDate::from_ymd_opt(2020, 1, 1);
    /// let today = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
    /// assert_eq!(
    ///     LogSource::Git.log_args(since, today),
    ///     vec!["log", "--after=2020-01-01", "--name-only", "--pretty=format:"]
    /// );
    /// assert_eq!(
    ///     LogSource::Svn.log_args(since, today),
    ///     vec!["log", "--revision", "{2020-01-01}:{2020-06-01}", "--verbose"]
    /// );
    /// ```
    pub fn log_args(self, since: Option<NaiveDate>, today: NaiveDate) -> Vec<String> {
        let mut args = vec!["log".to_string()];
        match self {
            LogSource::Git => {
                if let Some(since) = since {
                    args.push(format!("--after={}", since.format(DATE_FORMAT)));
                }
                args.push("--name-only".into());
                args.push("--pretty=format:".into());
            }
            LogSource::Svn => {
                if let Some(since) = since {
                    args.push("--revision".into());
                    args.push(format!(
                        "{{{}}}:{{{}}}",
                        since.format(DATE_FORMAT),
                        today.format(DATE_FORMAT)
                    ));
                }
                args.push("--verbose".into());
            }
        }
        args
    }

    /// Run the log command in `root` and return its standard output.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::VcsCommand`] if the command fails or times out.
    pub fn raw_log(
        self,
        runner: &dyn CommandRunner,
        root: &Path,
        since: Option<NaiveDate>,
        timeout: Option<Duration>,
    ) -> Result<String, ChurnError> {
        let today = chrono::Local::now().date_naive();
        let spec = CommandSpec::new(self.program(), self.log_args(since, today), root)
            .with_timeout(timeout);
        Ok(runner.run(&spec)?)
    }

    /// Pull touch events out of this source's raw log.
    ///
    /// # Examples
    ///
    /// ```
    /// use churn_pulse::source::LogSource;
    ///
    /// assert_eq!(LogSource::Git.extract("\nsrc/a.rs\n"), vec!["src/a.rs"]);
    /// assert_eq!(LogSource::Svn.extract("   A /src/a.rs"), vec!["/src/a.rs"]);
    /// ```
    pub fn extract(self, raw: &str) -> Vec<&str> {
        match self {
            LogSource::Git => extract::git_events(raw),
            LogSource::Svn => extract::svn_events(raw),
        }
    }
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSource::Git => write!(f, "git"),
            LogSource::Svn => write!(f, "subversion"),
        }
    }
}
