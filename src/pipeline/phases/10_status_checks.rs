use crate::error::Result;
use crate::pipeline::context::SynthesisContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::status::required_checks;
use tracing::debug;

/// Derives the status checks branch protection must require
pub struct StatusChecksPhase;

impl WorkflowPhase for StatusChecksPhase {
    fn execute(&self, context: &mut SynthesisContext) -> Result<()> {
        context.required_checks = required_checks(&context.new);
        debug!(checks = ?context.required_checks, "Derived required status checks");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::context_with_old;
    use crate::workflow::Job;

    #[test]
    fn test_checks_follow_job_order() {
        let (_repo, mut context) = context_with_old("");
        let mut variables = Job::new("variables");
        variables.name = Some("Prepare Variables".to_string());
        context.new.insert_job(variables);
        context.new.insert_job(Job::new("licenses"));

        StatusChecksPhase.execute(&mut context).unwrap();

        assert_eq!(context.required_checks, vec!["Prepare Variables", "licenses"]);
    }
}
