use crate::detection::Detector;
use crate::error::{BuildError, Result};
use regex::Regex;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

fn default_search_path() -> String {
    ".".to_string()
}

fn default_true() -> bool {
    true
}

/// Declarative description of one linter
///
/// The catalog key is the job identifier; `short_name` names the step and `long_name`
/// the job.
#[derive(Debug, Clone, Deserialize)]
pub struct LinterRule {
    pub short_name: String,
    pub long_name: String,

    /// Directory searched for matching files
    #[serde(default = "default_search_path")]
    pub path: String,

    /// Regular expression over file names
    pub pattern: String,

    /// Action invoked by the linter step
    pub uses: String,

    /// Configuration file expected at the repository root
    #[serde(default)]
    pub config: Option<String>,

    /// Extra step parameters merged over the shared defaults
    #[serde(default)]
    pub options: Mapping,

    #[serde(default)]
    pub permissions: Option<Value>,

    /// Extra clause AND-ed into the job condition
    #[serde(default)]
    pub condition: Option<String>,

    /// Keep an existing configuration file instead of refreshing it
    #[serde(default = "default_true")]
    pub preserve_config: bool,

    #[serde(default)]
    pub config_transforms: Vec<ConfigTransform>,
}

/// Uncomments lines of the bundled configuration when a marker is present in the repository
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigTransform {
    pub file: String,
    pub token: String,
    pub uncomment: String,
}

impl LinterRule {
    pub fn file_pattern(&self) -> Result<Regex> {
        Regex::new(&self.pattern).map_err(|source| BuildError::InvalidPattern {
            pattern: self.pattern.clone(),
            source,
        })
    }

    /// Text to uncomment in the bundled configuration; the first applicable rule wins
    pub fn applicable_transform(&self, detector: &Detector) -> Option<&str> {
        self.config_transforms
            .iter()
            .find(|t| detector.file_contains(&t.file, &t.token))
            .map(|t| t.uncomment.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Defaults;
    use std::fs;
    use tempfile::TempDir;

    const RUBOCOP: &str = r#"
short_name: Rubocop
long_name: Ruby Linter
pattern: '\.rb$'
uses: cloud-officer/ci-actions/linters/rubocop@master
config: .rubocop.yml
config_transforms:
  - file: Gemfile
    token: rails
    uncomment: rubocop-rails
  - file: Gemfile
    token: rspec
    uncomment: rubocop-rspec
"#;

    #[test]
    fn test_defaults_applied() {
        let rule: LinterRule = serde_yaml::from_str(RUBOCOP).unwrap();
        assert_eq!(rule.path, ".");
        assert!(rule.preserve_config);
        assert!(rule.options.is_empty());
        assert!(rule.file_pattern().unwrap().is_match("app.rb"));
    }

    #[test]
    fn test_invalid_pattern() {
        let mut rule: LinterRule = serde_yaml::from_str(RUBOCOP).unwrap();
        rule.pattern = "([".to_string();
        assert!(matches!(
            rule.file_pattern(),
            Err(BuildError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_first_applicable_transform_wins() {
        let repo = TempDir::new().unwrap();
        fs::write(
            repo.path().join("Gemfile"),
            "gem 'rails'\ngem 'rspec-rails'\n",
        )
        .unwrap();
        let detector = Detector::new(repo.path(), &Defaults::default());
        let rule: LinterRule = serde_yaml::from_str(RUBOCOP).unwrap();

        assert_eq!(rule.applicable_transform(&detector), Some("rubocop-rails"));
    }

    #[test]
    fn test_no_transform_without_marker() {
        let repo = TempDir::new().unwrap();
        let detector = Detector::new(repo.path(), &Defaults::default());
        let rule: LinterRule = serde_yaml::from_str(RUBOCOP).unwrap();

        assert!(rule.applicable_transform(&detector).is_none());
    }
}
