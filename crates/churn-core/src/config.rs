use std::path::Path;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ChurnError;

/// Top-level configuration loaded from `.churn.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use churn_core::ChurnConfig;
///
/// let config = ChurnConfig::default();
/// assert_eq!(config.churn.minimum_churn_count, 5);
/// assert!(config.churn.start_date.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChurnConfig {
    /// Churn metric settings.
    #[serde(default)]
    pub churn: ChurnSection,
}

impl ChurnConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::Io`] if the file cannot be read, or
    /// [`ChurnError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use churn_core::ChurnConfig;
    /// use std::path::Path;
    ///
    /// let config = ChurnConfig::from_file(Path::new(".churn.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, ChurnError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use churn_core::ChurnConfig;
    ///
    /// let toml = r#"
    /// [churn]
    /// minimum_churn_count = 10
    /// "#;
    /// let config = ChurnConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.churn.minimum_churn_count, 10);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ChurnError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// The `[churn]` table.
///
/// # Examples
///
/// ```
/// use churn_core::ChurnSection;
///
/// let section = ChurnSection::default();
/// assert_eq!(section.minimum_churn_count, 5);
/// assert_eq!(section.timeout_secs, 300);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnSection {
    /// Files changed fewer times than this are left out (default: 5).
    #[serde(default = "default_minimum_churn_count")]
    pub minimum_churn_count: u64,
    /// Only scan commits on or after this date (`"YYYY-MM-DD"`).
    pub start_date: Option<String>,
    /// Only scan the last N days. Ignored when `start_date` is set.
    pub since_days: Option<u64>,
    /// Kill the VCS command after this many seconds; 0 disables (default: 300).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_minimum_churn_count() -> u64 {
    5
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for ChurnSection {
    fn default() -> Self {
        Self {
            minimum_churn_count: default_minimum_churn_count(),
            start_date: None,
            since_days: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ChurnSection {
    /// Resolve the history boundary once, relative to `today`.
    ///
    /// An explicit `start_date` wins over `since_days`; with neither set the
    /// whole history is scanned.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::InvalidDate`] if `start_date` is malformed, or
    /// [`ChurnError::Config`] if `since_days` reaches past the earliest
    /// representable date.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use churn_core::ChurnSection;
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
    /// let section = ChurnSection {
    ///     since_days: Some(30),
    ///     ..ChurnSection::default()
    /// };
    /// assert_eq!(
    ///     section.resolve_start_date(today).unwrap(),
    ///     NaiveDate::from_ymd_opt(2024, 3, 1)
    /// );
    /// ```
    pub fn resolve_start_date(&self, today: NaiveDate) -> Result<Option<NaiveDate>, ChurnError> {
        if let Some(ref raw) = self.start_date {
            return parse_date(raw).map(Some);
        }
        let Some(days) = self.since_days else {
            return Ok(None);
        };
        today
            .checked_sub_days(Days::new(days))
            .map(Some)
            .ok_or_else(|| {
                ChurnError::Config(format!(
                    "since_days = {days} reaches before the earliest supported date"
                ))
            })
    }

    /// The process timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`ChurnError::InvalidDate`] for anything else.
///
/// # Examples
///
/// ```
/// use churn_core::parse_date;
///
/// assert!(parse_date("2020-01-01").is_ok());
/// assert!(parse_date("01/01/2020").is_err());
/// ```
pub fn parse_date(value: &str) -> Result<NaiveDate, ChurnError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ChurnError::InvalidDate {
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = ChurnConfig::default();
        assert_eq!(config.churn.minimum_churn_count, 5);
        assert!(config.churn.start_date.is_none());
        assert!(config.churn.since_days.is_none());
        assert_eq!(config.churn.timeout(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ChurnConfig::from_toml("").unwrap();
        assert_eq!(config.churn.minimum_churn_count, 5);
        assert_eq!(config.churn.timeout_secs, 300);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[churn]
minimum_churn_count = 2
start_date = "2023-06-01"
timeout_secs = 0
"#;
        let config = ChurnConfig::from_toml(toml).unwrap();
        assert_eq!(config.churn.minimum_churn_count, 2);
        assert_eq!(config.churn.start_date.as_deref(), Some("2023-06-01"));
        assert_eq!(config.churn.timeout(), None);
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(ChurnConfig::from_toml("{{invalid}}").is_err());
    }

    #[test]
    fn start_date_wins_over_since_days() {
        let section = ChurnSection {
            start_date: Some("2022-02-02".into()),
            since_days: Some(7),
            ..ChurnSection::default()
        };
        let resolved = section.resolve_start_date(day(2024, 1, 1)).unwrap();
        assert_eq!(resolved, Some(day(2022, 2, 2)));
    }

    #[test]
    fn no_boundary_means_full_history() {
        let resolved = ChurnSection::default()
            .resolve_start_date(day(2024, 1, 1))
            .unwrap();
        assert_eq!(resolved, None);
    }

    #[test]
    fn oversized_since_days_is_a_config_error() {
        let section = ChurnSection {
            since_days: Some(u64::MAX),
            ..ChurnSection::default()
        };
        let err = section.resolve_start_date(day(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, ChurnError::Config(ref msg) if msg.contains("since_days")));
    }

    #[test]
    fn malformed_start_date_is_rejected() {
        let section = ChurnSection {
            start_date: Some("yesterday".into()),
            ..ChurnSection::default()
        };
        let err = section.resolve_start_date(day(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, ChurnError::InvalidDate { ref value } if value == "yesterday"));
    }
}
