//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish the
//! engine's use cases: analyze, suggest, apply, learn, compose.

pub mod analysis_service;
pub mod composer;
pub mod fix_applier;
pub mod learning_service;
pub mod suggestion_service;

pub use analysis_service::{AnalysisService, DEFAULT_RELATED_LINE_WINDOW};
pub use composer::SuggestionComposer;
pub use fix_applier::{FixApplier, FixOutcome};
pub use learning_service::{KnowledgeStatistics, LearningService};
pub use suggestion_service::{GENERIC_FIX_CONFIDENCE, GENERIC_FIX_ID, SuggestionService};
