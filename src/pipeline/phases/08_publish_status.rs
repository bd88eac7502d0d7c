use crate::error::Result;
use crate::pipeline::context::{apply_default_with, with_params, SynthesisContext};
use crate::pipeline::expressions::{wrap, SLACK_WEBHOOK_URL};
use crate::pipeline::phase_trait::WorkflowPhase;
use serde_yaml::Value;
use tracing::info;

pub const SLACK_JOB: &str = "slack";
const PUBLISH_STEP: &str = "Publish Statuses";

/// Reports every upstream result, whether or not it failed
pub struct PublishStatusPhase;

impl WorkflowPhase for PublishStatusPhase {
    fn execute(&self, context: &mut SynthesisContext) -> Result<()> {
        if context.options.skip_slack {
            return Ok(());
        }

        info!("Adding status publishing");
        let upstream = context.upstream_jobs();

        let mut job = context.seed_job(SLACK_JOB);
        job.name = Some(PUBLISH_STEP.to_string());
        job.runs_on = Some(Value::from(context.defaults.ubuntu_runner.as_str()));
        job.needs = upstream;
        job.condition = Some(wrap("always()"));

        let mut step = context.seed_step(SLACK_JOB, PUBLISH_STEP);
        step.uses = Some(context.defaults.action("slack"));
        let jobs = wrap("toJSON(needs)");
        apply_default_with(
            &mut step,
            with_params(&[("webhook-url", SLACK_WEBHOOK_URL), ("jobs", jobs.as_str())]),
        );
        job.add_step(step);

        context.new.insert_job(job);
        Ok(())
    }
}
