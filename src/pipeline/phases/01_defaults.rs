use crate::error::Result;
use crate::pipeline::context::SynthesisContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::workflow::WorkflowField;
use serde_yaml::Value;

pub const DEFAULT_WORKFLOW_NAME: &str = "Build";

/// Pull requests on open/edit/reopen/sync; pushes to master, version branches and tags
pub fn default_triggers() -> Value {
    let yaml = r#"
pull_request:
  types: [opened, edited, reopened, synchronize]
push:
  branches: [master, "[0-9]*"]
  tags: ["**"]
"#;
    serde_yaml::from_str(yaml).unwrap_or(Value::Null)
}

/// Workflow-level settings: carried over from the previous document, else fallbacks
pub struct DefaultsPhase;

impl WorkflowPhase for DefaultsPhase {
    fn execute(&self, context: &mut SynthesisContext) -> Result<()> {
        let old = &context.old;
        let new = &mut context.new;

        new.copy_fields(
            Some(old),
            &[
                WorkflowField::Name,
                WorkflowField::RunName,
                WorkflowField::Permissions,
                WorkflowField::Env,
                WorkflowField::Defaults,
                WorkflowField::Concurrency,
            ],
        );

        if new.name.is_none() {
            new.name = Some(DEFAULT_WORKFLOW_NAME.to_string());
        }
        new.on = default_triggers();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::context_with_old;

    #[test]
    fn test_fallbacks_for_new_workflow() {
        let (_repo, mut context) = context_with_old("");
        DefaultsPhase.execute(&mut context).unwrap();

        assert_eq!(context.new.name.as_deref(), Some("Build"));
        assert!(context.new.env.is_empty());
        let types = &context.new.on["pull_request"]["types"];
        assert_eq!(types.as_sequence().unwrap().len(), 4);
        assert_eq!(context.new.on["push"]["tags"][0], Value::from("**"));
    }

    #[test]
    fn test_previous_settings_carried_over() {
        let (_repo, mut context) = context_with_old(
            "name: CI\nrun-name: Deploy by ${{github.actor}}\nenv:\n  GO_VERSION: '1.21'\non:\n  workflow_dispatch: {}\njobs: {}\n",
        );
        DefaultsPhase.execute(&mut context).unwrap();

        assert_eq!(context.new.name.as_deref(), Some("CI"));
        assert_eq!(
            context.new.run_name.as_deref(),
            Some("Deploy by ${{github.actor}}")
        );
        assert_eq!(context.new.env["GO_VERSION"], Value::from("1.21"));
        // triggers are always regenerated
        assert!(context.new.on.get("workflow_dispatch").is_none());
    }
}
