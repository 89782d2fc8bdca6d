//! The churn pipeline: detect, read the log, extract, aggregate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use churn_core::{ChurnError, ChurnOutput, ChurnRanking, ChurnSection};

use crate::aggregate::{aggregate, DEFAULT_MINIMUM_CHURN_COUNT};
use crate::process::{CommandRunner, SystemRunner};
use crate::source::LogSource;

/// Resolved settings for one churn run.
///
/// # Examples
///
/// ```
/// use churn_pulse::report::ChurnOptions;
///
/// let opts = ChurnOptions::default();
/// assert_eq!(opts.minimum_count, 5);
/// assert!(opts.start_date.is_none());
/// assert!(opts.timeout.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChurnOptions {
    /// Files changed fewer times than this are dropped.
    pub minimum_count: u64,
    /// Only scan commits on or after this date.
    pub start_date: Option<NaiveDate>,
    /// Kill the VCS command after this long.
    pub timeout: Option<Duration>,
}

impl Default for ChurnOptions {
    fn default() -> Self {
        Self {
            minimum_count: DEFAULT_MINIMUM_CHURN_COUNT,
            start_date: None,
            timeout: None,
        }
    }
}

impl ChurnOptions {
    /// Resolve options from a `[churn]` config section, relative to `today`.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::InvalidDate`] if the configured start date is malformed,
    /// or [`ChurnError::Config`] if `since_days` is out of range.
    pub fn from_section(section: &ChurnSection, today: NaiveDate) -> Result<Self, ChurnError> {
        Ok(Self {
            minimum_count: section.minimum_churn_count,
            start_date: section.resolve_start_date(today)?,
            timeout: section.timeout(),
        })
    }
}

/// Compute the ranking for `raw` log text produced by `source`.
///
/// # Examples
///
/// ```
/// use churn_core::ChurnRecord;
/// use churn_pulse::report::ranking_from_log;
/// use churn_pulse::source::LogSource;
///
/// let raw = "\na.rb\nb.rb\n\na.rb\n\na.rb\n";
/// let ranking = ranking_from_log(LogSource::Git, raw, 2);
/// assert_eq!(ranking, vec![ChurnRecord::new("a.rb", 3)]);
/// ```
pub fn ranking_from_log(source: LogSource, raw: &str, minimum_count: u64) -> ChurnRanking {
    let events = source.extract(raw);
    log::debug!("extracted {} touch events from {source} log", events.len());
    aggregate(events, minimum_count)
}

/// Churn analysis bound to one working copy.
///
/// The log source is chosen at construction, so a missing repository is
/// reported before any command runs.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use churn_pulse::report::{ChurnOptions, ChurnReport};
///
/// let report = ChurnReport::new(Path::new("."), ChurnOptions::default()).unwrap();
/// for record in report.run().unwrap().changes() {
///     println!("{:>4}  {}", record.times_changed, record.file_path);
/// }
/// ```
#[derive(Debug)]
pub struct ChurnReport<R = SystemRunner> {
    root: PathBuf,
    source: LogSource,
    options: ChurnOptions,
    runner: R,
}

impl ChurnReport<SystemRunner> {
    /// Detect the repository at `root` and run commands through the OS.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::NoRepositoryFound`] if `root` is not a working copy.
    pub fn new(root: &Path, options: ChurnOptions) -> Result<Self, ChurnError> {
        Self::with_runner(root, options, SystemRunner)
    }
}

impl<R: CommandRunner> ChurnReport<R> {
    /// Detect the repository at `root` and run commands through `runner`.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::NoRepositoryFound`] if `root` is not a working copy.
    pub fn with_runner(root: &Path, options: ChurnOptions, runner: R) -> Result<Self, ChurnError> {
        let source = LogSource::detect(root)?;
        log::info!("detected {source} working copy at {}", root.display());
        Ok(Self {
            root: root.to_path_buf(),
            source,
            options,
            runner,
        })
    }

    /// The detected log source.
    pub fn source(&self) -> LogSource {
        self.source
    }

    /// Read the history and build the `{churn: {changes}}` report.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::VcsCommand`] if the log command fails.
    pub fn run(&self) -> Result<ChurnOutput, ChurnError> {
        let raw = self.source.raw_log(
            &self.runner,
            &self.root,
            self.options.start_date,
            self.options.timeout,
        )?;
        let ranking = ranking_from_log(self.source, &raw, self.options.minimum_count);
        log::debug!(
            "{} files changed at least {} times",
            ranking.len(),
            self.options.minimum_count
        );
        Ok(ChurnOutput::new(ranking))
    }
}
