use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChurnError;

/// How many times one file changed.
///
/// Field names are part of the report contract and stay snake_case.
///
/// # Examples
///
/// ```
/// use churn_core::ChurnRecord;
///
/// let record = ChurnRecord::new("lib/foo.rb", 7);
/// assert_eq!(record.file_path, "lib/foo.rb");
/// assert_eq!(record.times_changed, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnRecord {
    /// Path as reported by the version-control log.
    pub file_path: String,
    /// Number of commits that touched the file (always >= 1).
    pub times_changed: u64,
}

impl ChurnRecord {
    /// Create a record.
    pub fn new(file_path: impl Into<String>, times_changed: u64) -> Self {
        Self {
            file_path: file_path.into(),
            times_changed,
        }
    }
}

/// Records ordered by `times_changed` descending, ties by `file_path` ascending.
pub type ChurnRanking = Vec<ChurnRecord>;

/// The value handed to report consumers: `{churn: {changes: [...]}}`.
///
/// # Examples
///
/// ```
/// use churn_core::{ChurnOutput, ChurnRecord};
///
/// let output = ChurnOutput::new(vec![ChurnRecord::new("a.rb", 5)]);
/// let json = output.to_json().unwrap();
/// assert!(json.contains("\"churn\""));
/// assert!(json.contains("\"changes\""));
/// assert!(json.contains("\"times_changed\": 5"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChurnOutput {
    /// The churn section.
    pub churn: ChurnChanges,
}

/// Inner `changes` mapping of a [`ChurnOutput`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChurnChanges {
    /// The ranked records.
    pub changes: ChurnRanking,
}

impl ChurnOutput {
    /// Wrap a ranking in the report shape.
    pub fn new(changes: ChurnRanking) -> Self {
        Self {
            churn: ChurnChanges { changes },
        }
    }

    /// The ranked records.
    pub fn changes(&self) -> &[ChurnRecord] {
        &self.churn.changes
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String, ChurnError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::Yaml`] if encoding fails.
    pub fn to_yaml(&self) -> Result<String, ChurnError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Output format for rendering results.
///
/// # Examples
///
/// ```
/// use churn_core::OutputFormat;
///
/// let fmt: OutputFormat = "yml".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Yaml);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Text,
    /// `{churn: {changes}}` as JSON.
    Json,
    /// `{churn: {changes}}` as YAML.
    Yaml,
    /// Markdown table.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yaml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!(
            "markdown".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert!("html".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn output_format_display_round_trips() {
        for fmt in [
            OutputFormat::Text,
            OutputFormat::Json,
            OutputFormat::Yaml,
            OutputFormat::Markdown,
        ] {
            assert_eq!(fmt.to_string().parse::<OutputFormat>().unwrap(), fmt);
        }
    }

    #[test]
    fn json_shape_matches_report_contract() {
        let output = ChurnOutput::new(vec![
            ChurnRecord::new("a.rb", 6),
            ChurnRecord::new("b.rb", 5),
        ]);
        let value: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();
        let changes = value["churn"]["changes"].as_array().unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0]["file_path"], "a.rb");
        assert_eq!(changes[0]["times_changed"], 6);
        assert_eq!(value.as_object().unwrap().len(), 1);
    }

    #[test]
    fn yaml_shape_matches_report_contract() {
        let output = ChurnOutput::new(vec![ChurnRecord::new("lib/foo.rb", 9)]);
        let yaml = output.to_yaml().unwrap();
        let parsed: ChurnOutput = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, output);
        assert!(yaml.starts_with("churn:"));
        assert!(yaml.contains("file_path: lib/foo.rb"));
    }

    #[test]
    fn empty_output_still_has_changes_key() {
        let json = ChurnOutput::default().to_json().unwrap();
        assert!(json.contains("\"changes\": []"));
    }
}
