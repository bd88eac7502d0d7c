use super::job::Job;
use super::serde_helpers::{is_blank, null_default, sorted_mapping, sorted_value};
use crate::error::{BuildError, Result};
use crate::fs::write_atomic;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Root CI document: triggers, workflow-level settings and the job graph
///
/// Job insertion order is meaningful: dependency lists and required status checks are
/// computed by iterating `jobs` in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "run-name", default, skip_serializing_if = "Option::is_none")]
    pub run_name: Option<String>,

    #[serde(
        default,
        serialize_with = "sorted_value",
        skip_serializing_if = "is_blank"
    )]
    pub on: Value,

    #[serde(
        default,
        serialize_with = "sorted_value",
        skip_serializing_if = "is_blank"
    )]
    pub permissions: Value,

    #[serde(
        default,
        deserialize_with = "null_default",
        serialize_with = "sorted_mapping",
        skip_serializing_if = "Mapping::is_empty"
    )]
    pub env: Mapping,

    #[serde(
        default,
        deserialize_with = "null_default",
        serialize_with = "sorted_mapping",
        skip_serializing_if = "Mapping::is_empty"
    )]
    pub defaults: Mapping,

    #[serde(default, skip_serializing_if = "is_blank")]
    pub concurrency: Value,

    #[serde(default, deserialize_with = "null_default")]
    pub jobs: IndexMap<String, Job>,
}

document_fields! {
    /// Workflow-level settings carried over from the previous document
    Workflow => WorkflowField {
        Name => name: "name", set_name(String),
        RunName => run_name: "run-name", set_run_name(String),
        On => on: "on", set_on(Value),
        Permissions => permissions: "permissions", set_permissions(Value),
        Env => env: "env", set_env(Mapping),
        Defaults => defaults: "defaults", set_defaults(Mapping),
        Concurrency => concurrency: "concurrency", set_concurrency(Value),
    }
}

fn legacy_placeholder() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{GITHUB_([A-Z_]+)\}").expect("valid regex"))
}

fn is_comment_only(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

impl Workflow {
    /// Parses a workflow document; an empty or comment-only document is an empty workflow
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if is_comment_only(content) {
            return Ok(Self::default());
        }

        let mut workflow: Workflow = serde_yaml::from_str(content)?;
        for (id, job) in workflow.jobs.iter_mut() {
            job.id = id.clone();
        }
        Ok(workflow)
    }

    /// Loads the previous document, `None` when it does not exist yet
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| BuildError::WorkflowRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content)
            .map(Some)
            .map_err(|source| BuildError::WorkflowParse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Appends a job, replacing any job with the same identifier in place
    pub fn insert_job(&mut self, job: Job) {
        self.jobs.insert(job.id.clone(), job);
    }

    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.get(id)
    }

    pub fn has_job(&self, id: &str) -> bool {
        self.jobs.contains_key(id)
    }

    /// Identifiers of every job in insertion order
    pub fn job_ids(&self) -> Vec<String> {
        self.jobs.keys().cloned().collect()
    }

    /// Canonical text of the document
    pub fn to_yaml(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(legacy_placeholder()
            .replace_all(&yaml, |caps: &regex::Captures| {
                format!("${{{{github.{}}}}}", caps[1].to_lowercase())
            })
            .into_owned())
    }

    /// Writes the document, creating parent directories, with an optional first-line header
    pub fn write(&self, path: &Path, header: Option<&str>) -> Result<()> {
        let mut content = String::new();
        if let Some(header) = header {
            content.push_str(header);
            content.push('\n');
        }
        content.push_str(&self.to_yaml()?);
        write_atomic(path, content.as_bytes())
    }
}
