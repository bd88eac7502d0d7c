use crate::error::Result;
use crate::pipeline::context::{apply_default_with, with_params, SynthesisContext};
use crate::pipeline::expressions::{
    aggregate_gate, AWS_ACCESS_KEY_ID, AWS_REGION, AWS_SECRET_ACCESS_KEY, SSH_KEY,
};
use crate::pipeline::phase_trait::WorkflowPhase;
use serde_yaml::Value;
use tracing::{debug, info};

pub const AWS_JOB: &str = "aws";

/// Direct AWS commands, gated like the deploy job but without per-environment jobs
pub struct AwsPhase;

impl WorkflowPhase for AwsPhase {
    fn execute(&self, context: &mut SynthesisContext) -> Result<()> {
        if !context.detector.exists(&context.defaults.aws_marker) {
            debug!("No AWS marker");
            return Ok(());
        }

        info!("Adding AWS commands");
        let upstream = context.upstream_jobs();

        let mut job = context.seed_job(AWS_JOB);
        job.name = Some("AWS".to_string());
        job.runs_on = Some(Value::from(context.defaults.ubuntu_runner.as_str()));
        job.condition = Some(aggregate_gate(&context.defaults, &upstream));
        job.needs = upstream;

        let mut step = context.seed_step(AWS_JOB, "AWS Commands");
        step.uses = Some(context.defaults.action("aws"));
        apply_default_with(
            &mut step,
            with_params(&[
                ("ssh-key", SSH_KEY),
                ("aws-access-key-id", AWS_ACCESS_KEY_ID),
                ("aws-secret-access-key", AWS_SECRET_ACCESS_KEY),
                ("aws-region", AWS_REGION),
                ("shell-commands", "echo \"Add your commands here!\""),
            ]),
        );
        job.add_step(step);

        context.new.insert_job(job);
        Ok(())
    }
}
