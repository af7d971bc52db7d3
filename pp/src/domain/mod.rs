//! Domain types for the planpipe pipeline
//!
//! Every record that crosses a stage boundary lives here. Field names and
//! enum wire values are a serialization contract — downstream consumers
//! (e.g. a future YAML exporter) depend on them structurally.

mod category;
mod id;
mod intake;
mod outcome;
mod plan;
mod priority;
mod refinement;
mod task;

pub use category::{RequestCategory, TaskCategory};
pub use id::generate_id;
pub use intake::IntakeResult;
pub use outcome::{Action, ActionType, FinalResult};
pub use plan::Plan;
pub use priority::Priority;
pub use refinement::RefinementResult;
pub use task::{Task, TaskStatus};
