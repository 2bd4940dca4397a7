pub mod assignment;
pub mod context;
pub mod project;
pub mod tab;

pub use assignment::{AssignmentMethod, ScoreBreakdown, ScoringResult, TabAssignment};
pub use context::{ActiveContext, RecentTabActivity};
pub use project::{Project, ProjectRule, RuleKind, Subproject, SubprojectSignature};
pub use tab::{PageSignals, Tab, TabId, WindowId};
