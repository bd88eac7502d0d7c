use crate::error::{BuildError, Result};
use crate::pipeline::context::SynthesisContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use std::collections::HashSet;

/// Every dependency must name a job inserted before the dependent one, and step ids
/// must be unique within their job
pub struct ValidatePhase;

impl WorkflowPhase for ValidatePhase {
    fn execute(&self, context: &mut SynthesisContext) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::new();

        for (id, job) in &context.new.jobs {
            if let Some(missing) = job.needs.iter().find(|need| !seen.contains(need.as_str())) {
                return Err(BuildError::DanglingDependency {
                    job: id.clone(),
                    needs: missing.clone(),
                });
            }
            seen.insert(id.as_str());

            let mut step_ids: HashSet<&str> = HashSet::new();
            for step_id in job.steps.iter().filter_map(|step| step.id.as_deref()) {
                if !step_ids.insert(step_id) {
                    return Err(BuildError::DuplicateStepId {
                        job: id.clone(),
                        id: step_id.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
