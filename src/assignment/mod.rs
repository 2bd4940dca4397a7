pub mod commands;
pub mod orchestrator;
pub mod synthesis;

pub use orchestrator::AssignmentEngine;
pub use synthesis::{apply_feedback, synthesize_project, PROJECT_PALETTE};
