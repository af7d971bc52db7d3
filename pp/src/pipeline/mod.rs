//! The four-stage request pipeline
//!
//! Intake classifies, planning decomposes, refinement fills gaps, and the
//! coordinator drives the sequence and consolidates the outputs. Every
//! model-backed path has a deterministic rule-based twin, so the pipeline
//! always produces a full result for non-empty input.

mod coordinator;
mod error;
mod intake;
mod planning;
mod refinement;

pub use coordinator::Coordinator;
pub use error::PipelineError;
pub use intake::IntakeStage;
pub use planning::PlanningStage;
pub use refinement::{RefinementStage, completeness_score, required_slots};
