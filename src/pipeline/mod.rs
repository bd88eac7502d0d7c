pub mod context;
pub mod expressions;
pub mod orchestrator;
pub mod phase_trait;
pub mod phases;

pub use context::{SynthesisContext, SynthesisOptions};
pub use orchestrator::{SynthesisOutput, Synthesizer};
pub use phase_trait::WorkflowPhase;
