//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `mend-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `KnowledgeStore`: knowledge-base persistence
//!   - `SourceEditor`: whole-file reads and writes
//!   - `DiagnosticSource`: checker output ingestion
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (`RecoveryEngine` is the entry point used by the CLI)

pub mod output;

pub use output::{DiagnosticSource, KnowledgeStore, SourceEditor};

#[cfg(test)]
pub use output::{MockDiagnosticSource, MockKnowledgeStore, MockSourceEditor};
