use super::serde_helpers::{is_blank, null_default, string_or_seq};
use super::step::Step;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// A vertex in the workflow's dependency graph
///
/// The identifier is the key under `jobs:` and is kept out of the serialized body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(skip)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "is_blank")]
    pub permissions: Value,

    #[serde(rename = "runs-on", default, skip_serializing_if = "Option::is_none")]
    pub runs_on: Option<Value>,

    #[serde(
        default,
        deserialize_with = "string_or_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub needs: Vec<String>,

    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default, skip_serializing_if = "is_blank")]
    pub environment: Value,

    #[serde(default, skip_serializing_if = "is_blank")]
    pub concurrency: Value,

    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Mapping::is_empty")]
    pub outputs: Mapping,

    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Mapping::is_empty")]
    pub env: Mapping,

    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Mapping::is_empty")]
    pub defaults: Mapping,

    #[serde(rename = "timeout-minutes", default, skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<Value>,

    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Mapping::is_empty")]
    pub strategy: Mapping,

    #[serde(rename = "continue-on-error", default, skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<Value>,

    #[serde(default, skip_serializing_if = "is_blank")]
    pub container: Value,

    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Mapping::is_empty")]
    pub services: Mapping,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,

    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Mapping::is_empty")]
    pub with: Mapping,

    #[serde(default, skip_serializing_if = "is_blank")]
    pub secrets: Value,

    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
}

document_fields! {
    /// Fields a regenerated job may inherit from its previous incarnation
    Job => JobField {
        Name => name: "name", set_name(String),
        Permissions => permissions: "permissions", set_permissions(Value),
        RunsOn => runs_on: "runs-on", set_runs_on(Value),
        Needs => needs: "needs", set_needs(Vec<String>),
        If => condition: "if", set_condition(String),
        Environment => environment: "environment", set_environment(Value),
        Concurrency => concurrency: "concurrency", set_concurrency(Value),
        Outputs => outputs: "outputs", set_outputs(Mapping),
        Env => env: "env", set_env(Mapping),
        Defaults => defaults: "defaults", set_defaults(Mapping),
        TimeoutMinutes => timeout_minutes: "timeout-minutes", set_timeout_minutes(Value),
        Strategy => strategy: "strategy", set_strategy(Mapping),
        ContinueOnError => continue_on_error: "continue-on-error", set_continue_on_error(Value),
        Container => container: "container", set_container(Value),
        Services => services: "services", set_services(Mapping),
        Uses => uses: "uses", set_uses(String),
        With => with: "with", set_with(Mapping),
        Secrets => secrets: "secrets", set_secrets(Value),
    }
}

impl JobField {
    /// Everything except the fields every synthesized job computes itself
    pub fn inheritable(computed: &[JobField]) -> Vec<JobField> {
        Self::ALL
            .iter()
            .copied()
            .filter(|field| !computed.contains(field))
            .collect()
    }
}

impl Job {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn add_step(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Step of this job with the given display name
    pub fn step(&self, name: &str) -> Option<&Step> {
        Step::find(&self.steps, name)
    }

    /// Display name used for status checks, falling back to the identifier
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> Job {
        let mut mapping = Mapping::new();
        mapping.insert(Value::from("key"), Value::from("value"));

        Job {
            id: "build".to_string(),
            name: Some("Build".to_string()),
            permissions: Value::from("read-all"),
            runs_on: Some(Value::from("ubuntu-latest")),
            needs: vec!["variables".to_string()],
            condition: Some("always()".to_string()),
            environment: Value::from("production"),
            concurrency: Value::from("deploy"),
            outputs: mapping.clone(),
            env: mapping.clone(),
            defaults: mapping.clone(),
            timeout_minutes: Some(Value::from(30)),
            strategy: mapping.clone(),
            continue_on_error: Some(Value::Bool(false)),
            container: Value::from("node:20"),
            services: mapping.clone(),
            uses: Some("org/repo/.github/workflows/x.yml@main".to_string()),
            with: mapping,
            secrets: Value::from("inherit"),
            steps: vec![Step::new("Checkout")],
        }
    }

    #[test]
    fn test_serialized_keys_follow_field_order() {
        let yaml = serde_yaml::to_value(populated()).unwrap();
        let keys: Vec<&str> = yaml
            .as_mapping()
            .unwrap()
            .keys()
            .map(|k| k.as_str().unwrap())
            .collect();

        let mut expected: Vec<&str> = JobField::ALL.iter().map(|f| f.key()).collect();
        expected.push("steps");
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let mut job = Job::new("lint");
        job.name = Some("Lint".to_string());
        job.permissions = Value::Mapping(Mapping::new());
        job.container = Value::Null;

        let yaml = serde_yaml::to_string(&job).unwrap();
        assert_eq!(yaml, "name: Lint\n");
    }

    #[test]
    fn test_falsy_scalars_are_kept() {
        let mut job = Job::new("lint");
        job.continue_on_error = Some(Value::Bool(false));
        job.timeout_minutes = Some(Value::from(0));

        let yaml = serde_yaml::to_string(&job).unwrap();
        assert!(yaml.contains("continue-on-error: false"));
        assert!(yaml.contains("timeout-minutes: 0"));
    }

    #[test]
    fn test_inheritable_excludes_computed() {
        let fields = JobField::inheritable(&[JobField::Name, JobField::Needs, JobField::If]);
        assert!(!fields.contains(&JobField::Needs));
        assert!(fields.contains(&JobField::RunsOn));
        assert_eq!(fields.len(), JobField::ALL.len() - 3);
    }

    #[test]
    fn test_copy_fields_from_previous_job() {
        let previous = populated();
        let mut job = Job::new("build");
        job.copy_fields(Some(&previous), &[JobField::RunsOn, JobField::Strategy]);

        assert_eq!(job.runs_on, previous.runs_on);
        assert_eq!(job.strategy, previous.strategy);
        assert!(job.name.is_none());
        assert!(job.steps.is_empty());
    }

    #[test]
    fn test_deserialize_single_need() {
        let job: Job = serde_yaml::from_str("name: Deploy\nneeds: codedeploy\n").unwrap();
        assert_eq!(job.needs, vec!["codedeploy"]);
        assert_eq!(job.display_name(), "Deploy");
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        assert_eq!(Job::new("variables").display_name(), "variables");
    }
}
