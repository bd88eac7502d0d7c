//! Configuration for workflow generation
//!
//! Two pieces of configuration flow through a run:
//!
//! - [`Defaults`]: the immutable conventions the synthesizer applies (runner labels,
//!   file locations, action references, detection exclusions). It is constructed once
//!   and passed into the synthesizer so tests can substitute alternate conventions.
//! - [`CatalogPaths`]: where the rule catalogs live. Every catalog must exist and parse
//!   before synthesis starts; see [`CatalogPaths::validate`].
//!
//! # Environment Variables
//!
//! - `GITHUB_BUILD_CONFIG_DIR`: root the catalog paths are resolved against - default:
//!   the `config/` directory bundled with the crate
//! - `GITHUB_BUILD_LOG_LEVEL`: logging level - default: "info"

use crate::detection::{ALWAYS_IGNORED_DIRS, DEFAULT_MAX_DEPTH};
use crate::error::{BuildError, Result};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_BUILD_FILE: &str = ".github/workflows/build.yml";
const DEFAULT_DEPENDENCIES_WORKFLOW_FILE: &str = ".github/workflows/dependencies.yml";
const DEFAULT_DEPENDABOT_FILE: &str = ".github/dependabot.yml";
const DEFAULT_UBUNTU_RUNNER: &str = "ubuntu-latest";
const DEFAULT_MACOS_RUNNER: &str = "macos-latest";
const DEFAULT_ACTIONS_REPOSITORY: &str = "cloud-officer/ci-actions";
const DEFAULT_ACTIONS_VERSION: &str = "master";

/// Timeout applied to every generated job that has no previous value
pub const DEFAULT_JOB_TIMEOUT_MINUTES: u64 = 30;

pub const DEFAULT_LINTERS_CONFIG_FILE: &str = "linters.yaml";
pub const DEFAULT_LANGUAGES_CONFIG_FILE: &str = "languages.yaml";
pub const DEFAULT_GITIGNORE_CONFIG_FILE: &str = "gitignore.yaml";
pub const OPTIONS_APT_CONFIG_FILE: &str = "options/apt.yaml";
pub const OPTIONS_MONGODB_CONFIG_FILE: &str = "options/mongodb.yaml";
pub const OPTIONS_MYSQL_CONFIG_FILE: &str = "options/mysql.yaml";
pub const OPTIONS_REDIS_CONFIG_FILE: &str = "options/redis.yaml";
pub const OPTIONS_ELASTICSEARCH_CONFIG_FILE: &str = "options/elasticsearch.yaml";

/// Conventions applied while synthesizing a workflow
#[derive(Debug, Clone)]
pub struct Defaults {
    /// Generated build workflow, relative to the repository root
    pub build_file: PathBuf,

    /// Generated dependency-update workflow
    pub dependencies_workflow_file: PathBuf,

    /// Generated dependabot configuration
    pub dependabot_file: PathBuf,

    pub ubuntu_runner: String,
    pub macos_runner: String,

    /// Repository hosting the reusable CI actions (`owner/repo`)
    pub actions_repository: String,

    /// Ref the CI actions are pinned to
    pub actions_version: String,

    pub job_timeout_minutes: u64,

    /// Directory names never descended into during detection
    pub ignored_dirs: Vec<String>,

    /// Maximum directory depth for detection walks
    pub max_depth: usize,

    /// Presence of this file enables the code deploy jobs
    pub deploy_descriptor: PathBuf,

    /// Presence of this path enables the AWS commands job
    pub aws_marker: PathBuf,

    /// Lock file whose presence folds license checking into unit tests
    pub platform_lock_file: PathBuf,

    /// Languages whose setup step is replayed before deployment
    pub predeploy_languages: Vec<String>,

    pub deploy_environments: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            build_file: PathBuf::from(DEFAULT_BUILD_FILE),
            dependencies_workflow_file: PathBuf::from(DEFAULT_DEPENDENCIES_WORKFLOW_FILE),
            dependabot_file: PathBuf::from(DEFAULT_DEPENDABOT_FILE),
            ubuntu_runner: DEFAULT_UBUNTU_RUNNER.to_string(),
            macos_runner: DEFAULT_MACOS_RUNNER.to_string(),
            actions_repository: DEFAULT_ACTIONS_REPOSITORY.to_string(),
            actions_version: DEFAULT_ACTIONS_VERSION.to_string(),
            job_timeout_minutes: DEFAULT_JOB_TIMEOUT_MINUTES,
            ignored_dirs: ALWAYS_IGNORED_DIRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_depth: DEFAULT_MAX_DEPTH,
            deploy_descriptor: PathBuf::from("appspec.yml"),
            aws_marker: PathBuf::from(".aws"),
            platform_lock_file: PathBuf::from("Podfile.lock"),
            predeploy_languages: vec!["go".to_string(), "php".to_string()],
            deploy_environments: vec!["beta".to_string(), "rc".to_string(), "prod".to_string()],
        }
    }
}

impl Defaults {
    /// Reference to one of the shared CI actions, e.g. `owner/repo/setup@master`
    pub fn action(&self, name: &str) -> String {
        format!(
            "{}/{}@{}",
            self.actions_repository, name, self.actions_version
        )
    }

    pub fn is_predeploy_language(&self, short_name: &str) -> bool {
        self.predeploy_languages.iter().any(|l| l == short_name)
    }
}

/// Locations of every rule catalog consumed by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPaths {
    pub linters: PathBuf,
    pub languages: PathBuf,
    pub gitignore: PathBuf,
    pub apt: PathBuf,
    pub mongodb: PathBuf,
    pub mysql: PathBuf,
    pub redis: PathBuf,
    pub elasticsearch: PathBuf,
}

impl CatalogPaths {
    /// Bundled catalogs under `root`
    pub fn under(root: &Path) -> Self {
        Self {
            linters: root.join(DEFAULT_LINTERS_CONFIG_FILE),
            languages: root.join(DEFAULT_LANGUAGES_CONFIG_FILE),
            gitignore: root.join(DEFAULT_GITIGNORE_CONFIG_FILE),
            apt: root.join(OPTIONS_APT_CONFIG_FILE),
            mongodb: root.join(OPTIONS_MONGODB_CONFIG_FILE),
            mysql: root.join(OPTIONS_MYSQL_CONFIG_FILE),
            redis: root.join(OPTIONS_REDIS_CONFIG_FILE),
            elasticsearch: root.join(OPTIONS_ELASTICSEARCH_CONFIG_FILE),
        }
    }

    /// Directory holding the bundled default linter configurations
    pub fn bundled_linter_configs(&self) -> PathBuf {
        self.linters
            .parent()
            .map(|dir| dir.join("linters"))
            .unwrap_or_else(|| PathBuf::from("linters"))
    }

    fn entries(&self) -> [(&'static str, &Path); 8] {
        [
            ("linters config", self.linters.as_path()),
            ("languages config", self.languages.as_path()),
            ("APT options", self.apt.as_path()),
            ("MongoDB options", self.mongodb.as_path()),
            ("MySQL options", self.mysql.as_path()),
            ("Redis options", self.redis.as_path()),
            ("Elasticsearch options", self.elasticsearch.as_path()),
            ("gitignore config", self.gitignore.as_path()),
        ]
    }

    /// Checks that every catalog exists and is well-formed YAML
    ///
    /// # Errors
    ///
    /// `MissingConfig` or `InvalidConfig` naming the first offending catalog
    pub fn validate(&self) -> Result<()> {
        for (name, path) in self.entries() {
            if !path.is_file() {
                return Err(BuildError::MissingConfig {
                    name: name.to_string(),
                    path: path.to_path_buf(),
                });
            }

            let content = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
            serde_yaml::from_str::<serde_yaml::Value>(&content).map_err(|source| {
                BuildError::InvalidConfig {
                    name: name.to_string(),
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        }
        Ok(())
    }
}

impl fmt::Display for CatalogPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rule Catalogs:")?;
        for (name, path) in self.entries() {
            writeln!(f, "  {}: {}", name, path.display())?;
        }
        Ok(())
    }
}

/// Root the catalogs are resolved against when no override is given
pub fn default_config_dir() -> PathBuf {
    env::var("GITHUB_BUILD_CONFIG_DIR")
        .ok()
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("config"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn write_catalogs(root: &Path) {
        fs::create_dir_all(root.join("options")).unwrap();
        for file in [
            DEFAULT_LINTERS_CONFIG_FILE,
            DEFAULT_LANGUAGES_CONFIG_FILE,
            DEFAULT_GITIGNORE_CONFIG_FILE,
            OPTIONS_APT_CONFIG_FILE,
            OPTIONS_MONGODB_CONFIG_FILE,
            OPTIONS_MYSQL_CONFIG_FILE,
            OPTIONS_REDIS_CONFIG_FILE,
            OPTIONS_ELASTICSEARCH_CONFIG_FILE,
        ] {
            fs::write(root.join(file), "valid: yaml\n").unwrap();
        }
    }

    #[test]
    fn test_defaults_action_reference() {
        let defaults = Defaults::default();
        assert_eq!(defaults.action("setup"), "cloud-officer/ci-actions/setup@master");
        assert_eq!(defaults.job_timeout_minutes, 30);
    }

    #[test]
    fn test_defaults_ignored_dirs() {
        let defaults = Defaults::default();
        for dir in ["node_modules", "vendor", ".git"] {
            assert!(defaults.ignored_dirs.iter().any(|d| d == dir));
        }
    }

    #[test]
    fn test_validate_bundled_catalogs() {
        let paths = CatalogPaths::under(&Path::new(env!("CARGO_MANIFEST_DIR")).join("config"));
        assert!(paths.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_catalog() {
        let temp_dir = TempDir::new().unwrap();
        write_catalogs(temp_dir.path());
        let mut paths = CatalogPaths::under(temp_dir.path());
        paths.linters = PathBuf::from("custom/path/linters.yaml");

        let err = paths.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required linters config file: custom/path/linters.yaml"
        );
    }

    #[test]
    fn test_validate_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_catalogs(temp_dir.path());
        fs::write(
            temp_dir.path().join(DEFAULT_LANGUAGES_CONFIG_FILE),
            "invalid: yaml: syntax: [",
        )
        .unwrap();

        let err = CatalogPaths::under(temp_dir.path()).validate().unwrap_err();
        assert!(matches!(err, BuildError::InvalidConfig { .. }));
        assert!(err.to_string().contains("Invalid YAML in languages config file"));
    }

    #[test]
    #[serial]
    fn test_default_config_dir_from_env() {
        env::set_var("GITHUB_BUILD_CONFIG_DIR", "/opt/github-build/config");
        assert_eq!(default_config_dir(), PathBuf::from("/opt/github-build/config"));
        env::remove_var("GITHUB_BUILD_CONFIG_DIR");
        assert!(default_config_dir().ends_with("config"));
    }
}
