use super::context::SynthesisContext;
use crate::error::Result;

/// One ordered step of workflow synthesis
///
/// Phases run strictly in sequence; later phases read state earlier ones wrote.
pub trait WorkflowPhase {
    fn execute(&self, context: &mut SynthesisContext) -> Result<()>;
}
