//! Application layer for Mend.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (analysis, suggestions, fix
//!   application, learning, composition)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Engine**: The `RecoveryEngine` facade wiring services over shared ports
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. All business rules live in `crate::domain`.

pub mod engine;
pub mod error;
pub mod locks;
pub mod ports;
pub mod services;

pub use engine::{EngineSettings, RecoveryEngine};
pub use error::ApplicationError;
pub use locks::KeyedLocks;
pub use ports::{DiagnosticSource, KnowledgeStore, SourceEditor};
pub use services::{
    AnalysisService, FixApplier, FixOutcome, KnowledgeStatistics, LearningService,
    SuggestionComposer, SuggestionService,
};
