//! Turning raw VCS log text into touch events.
//!
//! A touch event is one file path observed in one commit. Both extractors
//! borrow from the raw text and keep the order in which paths appear.

use std::sync::LazyLock;

use regex::Regex;

/// An `A` (added) or `M` (modified) entry of `svn log --verbose`, capturing the
/// path up to its last word boundary.
static SVN_CHANGED_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W*[AM]\W+(/.*)\b").expect("invalid regex"));

/// Extract events from `git log --name-only --pretty=format:` output.
///
/// Every non-empty line is a path; blank lines separate commits.
///
/// # Examples
///
/// ```
/// use churn_pulse::extract::git_events;
///
/// let events = git_events("\na.rb\nb.rb\n\na.rb\n");
/// assert_eq!(events, vec!["a.rb", "b.rb", "a.rb"]);
/// ```
pub fn git_events(raw: &str) -> Vec<&str> {
    raw.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Extract events from `svn log --verbose` output.
///
/// Lines that are not added/modified path entries (revision headers,
/// separators, commit messages, deletions) are skipped.
///
/// # Examples
///
/// ```
/// use churn_pulse::extract::svn_events;
///
/// assert_eq!(svn_events("   M       /lib/foo.rb"), vec!["/lib/foo.rb"]);
/// assert!(svn_events("r5 | alice | 2020-01-01").is_empty());
/// ```
pub fn svn_events(raw: &str) -> Vec<&str> {
    raw.lines().filter_map(svn_changed_path).collect()
}

fn svn_changed_path(line: &str) -> Option<&str> {
    SVN_CHANGED_PATH
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
