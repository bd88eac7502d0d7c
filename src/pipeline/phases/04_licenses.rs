use crate::error::Result;
use crate::pipeline::context::{apply_default_with, with_params, SynthesisContext};
use crate::pipeline::expressions::{not_skipped, wrap, GITHUB_TOKEN, SSH_KEY, VARIABLES_JOB};
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::workflow::Step;
use tracing::{debug, info};

pub const LICENSES_JOB: &str = "licenses";
pub const LICENSES_STEP: &str = "Licenses";

/// Decides the unit test gate and, without a platform lock file, adds the license job
///
/// With a platform lock file the license data is produced by the test run itself, so
/// both concerns share one gate and the license step moves into the unit test jobs.
pub struct LicensesPhase;

impl WorkflowPhase for LicensesPhase {
    fn execute(&self, context: &mut SynthesisContext) -> Result<()> {
        if context.detector.exists(&context.defaults.platform_lock_file) {
            context.unit_test_gate = format!(
                "{} || {}",
                not_skipped("SKIP_LICENSES"),
                not_skipped("SKIP_TESTS")
            );
            debug!("Platform lock file present, license checks run with unit tests");
            return Ok(());
        }

        context.unit_test_gate = not_skipped("SKIP_TESTS");
        if context.options.skip_license_check {
            return Ok(());
        }

        info!("Adding license check");
        let mut job = context.seed_job(LICENSES_JOB);
        job.name = Some("Licenses Check".to_string());
        job.runs_on = Some(context.previous_runner(LICENSES_JOB, &context.defaults.ubuntu_runner));
        job.needs = vec![VARIABLES_JOB.to_string()];
        job.condition = Some(wrap(&not_skipped("SKIP_LICENSES")));

        let step = license_step(context, LICENSES_JOB);
        job.add_step(step);
        context.new.insert_job(job);

        Ok(())
    }
}

/// License scanning step of `job_id`, seeded from its previous incarnation
pub fn license_step(context: &SynthesisContext, job_id: &str) -> Step {
    let mut step = context.seed_step(job_id, LICENSES_STEP);
    step.uses = Some(context.defaults.action("soup"));
    apply_default_with(&mut step, license_params());
    step
}

pub fn license_params() -> serde_yaml::Mapping {
    with_params(&[
        ("ssh-key", SSH_KEY),
        ("github-token", GITHUB_TOKEN),
        ("parameters", "--no_prompt"),
    ])
}
