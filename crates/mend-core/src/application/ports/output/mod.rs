//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `mend-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::{Diagnostic, KnowledgeBaseEntry, Signature, TextBuffer};
use crate::error::MendResult;

/// Port for the persistent knowledge base.
///
/// Implemented by:
/// - `mend_adapters::knowledge_store::InMemoryKnowledgeStore` (testing, ephemeral runs)
/// - `mend_adapters::knowledge_store::JsonFileKnowledgeStore` (production)
///
/// Entries are only ever inserted or replaced by a newer version of the same
/// signature; the learning service never deletes.
#[cfg_attr(test, mockall::automock)]
pub trait KnowledgeStore: Send + Sync {
    /// Snapshot of the entry for `signature`, if any.
    fn get(&self, signature: &Signature) -> MendResult<Option<KnowledgeBaseEntry>>;

    /// Insert or update an entry. Durable stores persist before returning.
    fn put(&self, entry: KnowledgeBaseEntry) -> MendResult<()>;

    /// Snapshot of every entry.
    fn entries(&self) -> MendResult<Vec<KnowledgeBaseEntry>>;

    /// Persist any buffered state.
    fn flush(&self) -> MendResult<()>;
}

/// Port for reading and writing whole source files.
///
/// Implemented by:
/// - `mend_adapters::source_editor::LocalSourceEditor` (production)
/// - `mend_adapters::source_editor::MemorySourceEditor` (testing)
///
/// Snapshot and rollback discipline lives in the core; editors only move
/// complete buffers.
#[cfg_attr(test, mockall::automock)]
pub trait SourceEditor: Send + Sync {
    fn read(&self, path: &Path) -> MendResult<TextBuffer>;

    /// Replace the file's content with `text`.
    fn write(&self, path: &Path, text: &TextBuffer) -> MendResult<()>;

    fn exists(&self, path: &Path) -> bool;
}

/// Port for loading diagnostics produced by an external checker.
///
/// Implemented by:
/// - `mend_adapters::diagnostic_source::JsonDiagnosticSource`
/// - `mend_adapters::diagnostic_source::TscDiagnosticSource`
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticSource: Send + Sync {
    /// Every diagnostic found at `input` (a file or a directory).
    fn diagnostics(&self, input: &Path) -> MendResult<Vec<Diagnostic>>;
}
