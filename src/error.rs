//! Error taxonomy for workflow generation
//!
//! Configuration problems abort before anything is written, version mismatches abort
//! only under strict mode, and remote validation failures enumerate the offending
//! status checks. Detection misses are never errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Missing required {name} file: {}", .path.display())]
    MissingConfig { name: String, path: PathBuf },

    #[error("Invalid YAML in {name} file ({}): {source}", .path.display())]
    InvalidConfig {
        name: String,
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("{0}")]
    Config(String),

    #[error("Failed to read workflow {}: {source}", .path.display())]
    WorkflowRead { path: PathBuf, source: io::Error },

    #[error("Failed to parse workflow {}: {source}", .path.display())]
    WorkflowParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("{field} mismatch: current value '{existing}' differs from recommended '{recommended}'")]
    VersionMismatch {
        field: String,
        existing: String,
        recommended: String,
    },

    #[error("Job '{job}' depends on '{needs}' which is not defined before it")]
    DanglingDependency { job: String, needs: String },

    #[error("Job '{job}' has more than one step with id '{id}'")]
    DuplicateStepId { job: String, id: String },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("{}", format_check_mismatch(.branch, .missing, .extra))]
    StatusCheckMismatch {
        branch: String,
        missing: Vec<String>,
        extra: Vec<String>,
    },

    #[error("GitHub API {method} {path} failed with status {status}: {message}")]
    Remote {
        method: &'static str,
        path: String,
        status: u16,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl BuildError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}

fn format_check_mismatch(branch: &str, missing: &[String], extra: &[String]) -> String {
    let mut message = format!("{} branch required status checks do not match", branch);
    if !missing.is_empty() {
        message.push_str(&format!("; missing: {}", missing.join(", ")));
    }
    if !extra.is_empty() {
        message.push_str(&format!("; unexpected: {}", extra.join(", ")));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_message_names_file() {
        let err = BuildError::MissingConfig {
            name: "linters config".to_string(),
            path: PathBuf::from("custom/path/linters.yaml"),
        };
        assert_eq!(
            err.to_string(),
            "Missing required linters config file: custom/path/linters.yaml"
        );
    }

    #[test]
    fn test_status_check_mismatch_lists_entries() {
        let err = BuildError::StatusCheckMismatch {
            branch: "master".to_string(),
            missing: vec!["Go Unit Tests".to_string()],
            extra: vec!["Old Job".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("missing: Go Unit Tests"));
        assert!(message.contains("unexpected: Old Job"));
    }

    #[test]
    fn test_version_mismatch_message() {
        let err = BuildError::VersionMismatch {
            field: "GO_VERSION".to_string(),
            existing: "1.21".to_string(),
            recommended: "1.22".to_string(),
        };
        assert!(err.to_string().starts_with("GO_VERSION mismatch"));
    }
}
