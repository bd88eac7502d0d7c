//! Document model for CI workflows
//!
//! [`Workflow`], [`Job`] and [`Step`] mirror the structure of the emitted YAML. Each
//! type declares its copyable fields through `document_fields!`, which provides the
//! field enums used to seed a regenerated object from its previous incarnation and the
//! partial setters used while building one. Serialization omits absent values and empty
//! collections and keeps keys in a fixed order so repeated runs produce identical text.

#[macro_use]
mod fields;

mod document;
mod job;
pub mod serde_helpers;
mod step;

pub use document::{Workflow, WorkflowField};
pub use job::{Job, JobField};
pub use step::{Step, StepField};
