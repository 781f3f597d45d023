//! Infrastructure adapters for Mend.
//!
//! This crate implements the ports defined in `mend-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod diagnostic_source;
pub mod knowledge_store;
pub mod rule_loader;
pub mod source_editor;

mod io;

// Re-export commonly used adapters
pub use diagnostic_source::{
    DiagnosticFormat, JsonDiagnosticSource, TscDiagnosticSource, detect_format, source_for,
};
pub use knowledge_store::{InMemoryKnowledgeStore, JsonFileKnowledgeStore};
pub use rule_loader::RulePackLoader;
pub use source_editor::{LocalSourceEditor, MemorySourceEditor};
