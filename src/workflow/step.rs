use super::serde_helpers::null_default;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// One executable unit inside a job
///
/// The display name is the merge key: a regenerated step finds its previous
/// incarnation by name alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,

    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Mapping::is_empty")]
    pub with: Mapping,

    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "Mapping::is_empty")]
    pub env: Mapping,

    #[serde(rename = "continue-on-error", default, skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<Value>,

    #[serde(rename = "timeout-minutes", default, skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<Value>,
}

document_fields! {
    /// Fields a regenerated step inherits from its previous incarnation
    Step => StepField {
        Id => id: "id", set_id(String),
        If => condition: "if", set_condition(String),
        Uses => uses: "uses", set_uses(String),
        Run => run: "run", set_run(String),
        Shell => shell: "shell", set_shell(String),
        With => with: "with", set_with(Mapping),
        Env => env: "env", set_env(Mapping),
        ContinueOnError => continue_on_error: "continue-on-error", set_continue_on_error(Value),
        TimeoutMinutes => timeout_minutes: "timeout-minutes", set_timeout_minutes(Value),
    }
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// First step in `steps` with the given display name
    pub fn find<'a>(steps: &'a [Step], name: &str) -> Option<&'a Step> {
        steps.iter().find(|step| step.name == name)
    }
}
