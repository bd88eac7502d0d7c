//! Required status checks derived from the final job graph
//!
//! The remote branch protection must require exactly this list, so the names follow the
//! runner's own convention: a job's display name, and for matrix jobs one entry per
//! combination with the values in parentheses, e.g. `Tests (ubuntu-latest, 18)`.

use crate::workflow::{Job, Workflow};
use serde_yaml::{Mapping, Value};

const MATRIX_KEY: &str = "matrix";

/// Matrix keys that adjust combinations rather than define a dimension
const MATRIX_MODIFIERS: &[&str] = &["include", "exclude"];

/// Every status check produced by `workflow`, in job order
pub fn required_checks(workflow: &Workflow) -> Vec<String> {
    workflow.jobs.values().flat_map(job_checks).collect()
}

/// Status checks produced by one job
pub fn job_checks(job: &Job) -> Vec<String> {
    let name = job.display_name();
    let dimensions = matrix_dimensions(&job.strategy);
    if dimensions.is_empty() {
        return vec![name.to_string()];
    }

    combinations(&dimensions)
        .into_iter()
        .map(|combination| format!("{} ({})", name, combination.join(", ")))
        .collect()
}

fn matrix_dimensions(strategy: &Mapping) -> Vec<Vec<String>> {
    let Some(Value::Mapping(matrix)) = strategy.get(MATRIX_KEY) else {
        return Vec::new();
    };

    matrix
        .iter()
        .filter(|(key, _)| !key.as_str().is_some_and(|k| MATRIX_MODIFIERS.contains(&k)))
        .filter_map(|(_, values)| values.as_sequence())
        .filter(|values| !values.is_empty())
        .map(|values| values.iter().map(matrix_value).collect())
        .collect()
}

fn matrix_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Cartesian product in dimension order, the first dimension varying slowest
fn combinations(dimensions: &[Vec<String>]) -> Vec<Vec<String>> {
    dimensions.iter().fold(vec![Vec::new()], |acc, values| {
        acc.iter()
            .flat_map(|prefix| {
                values.iter().map(move |value| {
                    let mut combination = prefix.clone();
                    combination.push(value.clone());
                    combination
                })
            })
            .collect()
    })
}
