use super::options::{Service, SetupOption};
use crate::error::{BuildError, Result};
use regex::Regex;
use serde::Deserialize;

/// Declarative description of one language test suite
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageRule {
    pub short_name: String,
    pub long_name: String,

    /// Alternation of source file extensions, e.g. `js|jsx|ts`; languages without one
    /// are never detected
    #[serde(default)]
    pub file_extension: Option<String>,

    #[serde(rename = "runs-on", default)]
    pub runs_on: Option<String>,

    #[serde(default)]
    pub version_files: Vec<VersionFile>,

    #[serde(default)]
    pub setup_options: Vec<SetupOption>,

    /// Extra clause OR-ed into the unit test gate
    #[serde(default)]
    pub condition: Option<String>,

    pub unit_test_framework_name: String,
    pub unit_test_framework_default: String,

    #[serde(default)]
    pub dependencies: Vec<DependencyRule>,
}

/// File pinning a runtime version, e.g. `.nvmrc` for `node-version`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionFile {
    pub file: String,
    pub option: String,
}

/// A dependency manifest recognised for a language
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependencyRule {
    pub dependency_file: String,
    pub package_manager_name: String,
    pub package_manager_default: String,

    /// Command refreshing the dependencies, collected into the dependency update workflow
    #[serde(default)]
    pub package_manager_update: Option<String>,

    #[serde(default)]
    pub mongodb_dependency: Option<String>,

    #[serde(default)]
    pub mysql_dependency: Option<String>,

    #[serde(default)]
    pub redis_dependency: Option<String>,

    #[serde(default)]
    pub elasticsearch_dependency: Option<String>,

    #[serde(default)]
    pub dependabot_ecosystem: Option<String>,
}

impl LanguageRule {
    /// Job identifier of this language's unit tests
    pub fn job_id(&self) -> String {
        format!("{}_unit_tests", self.short_name)
    }

    pub fn job_name(&self) -> String {
        format!("{} Unit Tests", self.long_name)
    }

    /// File name pattern for source files, `None` when detection is disabled
    pub fn source_pattern(&self) -> Result<Option<Regex>> {
        let Some(extension) = self.file_extension.as_deref() else {
            return Ok(None);
        };

        let pattern = format!(r"^.*\.({})$", extension);
        Regex::new(&pattern)
            .map(Some)
            .map_err(|source| BuildError::InvalidPattern { pattern, source })
    }
}

impl DependencyRule {
    /// Marker substring for `service` in this manifest, if any
    pub fn marker(&self, service: Service) -> Option<&str> {
        let marker = match service {
            Service::Mongodb => &self.mongodb_dependency,
            Service::Mysql => &self.mysql_dependency,
            Service::Redis => &self.redis_dependency,
            Service::Elasticsearch => &self.elasticsearch_dependency,
        };
        marker.as_deref().filter(|m| !m.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GO: &str = r#"
short_name: go
long_name: Go
file_extension: go
version_files:
  - file: .go-version
    option: go-version
setup_options:
  - name: go-version
    value: '1.22'
unit_test_framework_name: Go Test
unit_test_framework_default: go test ./...
dependencies:
  - dependency_file: go.mod
    package_manager_name: Go Modules
    package_manager_default: go mod download
    package_manager_update: go get -u ./... && go mod tidy
    mongodb_dependency: go.mongodb.org/mongo-driver
    redis_dependency: ''
    dependabot_ecosystem: gomod
"#;

    #[test]
    fn test_language_rule_deserialize() {
        let rule: LanguageRule = serde_yaml::from_str(GO).unwrap();
        assert_eq!(rule.job_id(), "go_unit_tests");
        assert_eq!(rule.job_name(), "Go Unit Tests");
        assert_eq!(rule.version_files[0].option, "go-version");
        assert!(rule.runs_on.is_none());
        assert_eq!(rule.dependencies[0].dependabot_ecosystem.as_deref(), Some("gomod"));
    }

    #[test]
    fn test_source_pattern() {
        let rule: LanguageRule = serde_yaml::from_str(GO).unwrap();
        let pattern = rule.source_pattern().unwrap().unwrap();
        assert!(pattern.is_match("main.go"));
        assert!(!pattern.is_match("main.gox"));
        assert!(!pattern.is_match("go.mod"));
    }

    #[test]
    fn test_source_pattern_disabled() {
        let mut rule: LanguageRule = serde_yaml::from_str(GO).unwrap();
        rule.file_extension = None;
        assert!(rule.source_pattern().unwrap().is_none());
    }

    #[test]
    fn test_markers_ignore_empty_values() {
        let rule: LanguageRule = serde_yaml::from_str(GO).unwrap();
        let dependency = &rule.dependencies[0];
        assert_eq!(
            dependency.marker(Service::Mongodb),
            Some("go.mongodb.org/mongo-driver")
        );
        assert!(dependency.marker(Service::Redis).is_none());
        assert!(dependency.marker(Service::Mysql).is_none());
    }
}
