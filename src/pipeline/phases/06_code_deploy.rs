use crate::catalog::ServiceOptions;
use crate::error::Result;
use crate::pipeline::context::{apply_default_with, with_params, SynthesisContext};
use crate::pipeline::expressions::{
    aggregate_gate, capitalize, environment_gate, flag_set, output_reference, wrap,
    AWS_ACCESS_KEY_ID, AWS_REGION, AWS_SECRET_ACCESS_KEY, CODEDEPLOY_BUCKET, SSH_KEY,
    VARIABLES_JOB,
};
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::workflow::Step;
use serde_yaml::Value;
use tracing::{debug, info};

pub const CODEDEPLOY_JOB: &str = "codedeploy";

/// Aggregating deploy job plus one job per deployment environment
pub struct CodeDeployPhase;

impl WorkflowPhase for CodeDeployPhase {
    fn execute(&self, context: &mut SynthesisContext) -> Result<()> {
        if !context.detector.exists(&context.defaults.deploy_descriptor) {
            debug!("No deployment descriptor");
            return Ok(());
        }

        info!("Adding code deploy");
        add_aggregate_job(context);

        let environments = context.defaults.deploy_environments.clone();
        for environment in &environments {
            add_environment_job(context, environment);
        }

        Ok(())
    }
}

/// Setup steps replayed before packaging, stripped of conditions and service parameters
fn replayed_steps(recorded: &[Step]) -> Vec<Step> {
    recorded
        .iter()
        .cloned()
        .map(|mut step| {
            step.condition = None;
            step.with
                .retain(|key, _| !key.as_str().is_some_and(ServiceOptions::is_service_parameter));
            step
        })
        .collect()
}

fn add_aggregate_job(context: &mut SynthesisContext) {
    let upstream = context.upstream_jobs();

    let mut job = context.seed_job(CODEDEPLOY_JOB);
    job.name = Some("Code Deploy".to_string());
    job.runs_on = Some(Value::from(context.defaults.ubuntu_runner.as_str()));
    job.condition = Some(aggregate_gate(&context.defaults, &upstream));
    job.needs = upstream;

    if context.predeploy_steps.is_empty() {
        let mut checkout = context.seed_step(CODEDEPLOY_JOB, "Checkout");
        checkout.uses = Some(context.defaults.action("codedeploy/checkout"));
        apply_default_with(&mut checkout, with_params(&[("ssh-key", SSH_KEY)]));
        job.add_step(checkout);
    } else {
        job.steps = replayed_steps(&context.predeploy_steps);
    }

    let mut update = context.seed_step(CODEDEPLOY_JOB, "Update Packages");
    update.condition = Some(wrap(&flag_set("UPDATE_PACKAGES")));
    update.shell = Some("bash".to_string());
    update.run = Some("touch update-packages".to_string());
    job.add_step(update);

    let mut zip = context.seed_step(CODEDEPLOY_JOB, "Zip");
    zip.shell = Some("bash".to_string());
    if zip.run.is_none() {
        zip.run = Some(format!(
            "zip --quiet --recurse-paths \"{}.zip\" ./*",
            output_reference("BUILD_NAME")
        ));
    }
    job.add_step(zip);

    let mut upload = context.seed_step(CODEDEPLOY_JOB, "S3Copy");
    upload.uses = Some(context.defaults.action("codedeploy/s3copy"));
    let target = format!("s3://{}/${{GITHUB_REPOSITORY}}", CODEDEPLOY_BUCKET);
    apply_default_with(
        &mut upload,
        with_params(&[
            ("aws-access-key-id", AWS_ACCESS_KEY_ID),
            ("aws-secret-access-key", AWS_SECRET_ACCESS_KEY),
            ("aws-region", AWS_REGION),
            ("source", "deployment"),
            ("target", target.as_str()),
        ]),
    );
    job.add_step(upload);

    context.new.insert_job(job);
}

fn add_environment_job(context: &mut SynthesisContext, environment: &str) {
    let id = format!("{}_deploy", environment);
    let name = format!("{} Deploy", capitalize(environment));

    let mut job = context.seed_job(&id);
    job.name = Some(name.clone());
    job.runs_on = Some(Value::from(context.defaults.ubuntu_runner.as_str()));
    job.needs = vec![VARIABLES_JOB.to_string(), CODEDEPLOY_JOB.to_string()];
    job.condition = Some(environment_gate(CODEDEPLOY_JOB, environment));

    let mut step = context.seed_step(&id, &name);
    step.uses = Some(context.defaults.action("codedeploy/deploy"));
    let s3_key = format!("${{GITHUB_REPOSITORY}}/{}.zip", output_reference("BUILD_NAME"));
    apply_default_with(
        &mut step,
        with_params(&[
            ("aws-access-key-id", AWS_ACCESS_KEY_ID),
            ("aws-secret-access-key", AWS_SECRET_ACCESS_KEY),
            ("aws-region", AWS_REGION),
            ("application-name", context.options.application_name.as_str()),
            ("deployment-group-name", environment),
            ("s3-bucket", CODEDEPLOY_BUCKET),
            ("s3-key", s3_key.as_str()),
        ]),
    );
    job.add_step(step);

    context.new.insert_job(job);
}
