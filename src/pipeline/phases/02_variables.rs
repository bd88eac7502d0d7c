use crate::error::Result;
use crate::pipeline::context::{apply_default_with, with_params, SynthesisContext};
use crate::pipeline::expressions::{step_output, SSH_KEY, VARIABLES_JOB, VARIABLE_OUTPUTS};
use crate::pipeline::phase_trait::WorkflowPhase;
use serde_yaml::{Mapping, Value};

pub const VARIABLES_STEP: &str = "Prepare variables";

/// Resolves repository metadata into outputs read by every later condition
pub struct VariablesPhase;

impl WorkflowPhase for VariablesPhase {
    fn execute(&self, context: &mut SynthesisContext) -> Result<()> {
        let mut job = context.seed_job(VARIABLES_JOB);
        job.name = Some("Prepare Variables".to_string());
        job.runs_on = Some(Value::from(context.defaults.ubuntu_runner.as_str()));
        job.outputs = VARIABLE_OUTPUTS
            .iter()
            .map(|name| (Value::from(*name), Value::from(step_output(name))))
            .collect::<Mapping>();

        let mut step = context.seed_step(VARIABLES_JOB, VARIABLES_STEP);
        step.id = Some(VARIABLES_JOB.to_string());
        step.uses = Some(context.defaults.action("variables"));
        apply_default_with(&mut step, with_params(&[("ssh-key", SSH_KEY)]));
        job.add_step(step);

        context.new.insert_job(job);
        Ok(())
    }
}
