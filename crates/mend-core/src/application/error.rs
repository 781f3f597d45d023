//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::FailureKind;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// The knowledge store could not be read or written.
    #[error("Knowledge store error: {reason}")]
    KnowledgeStore { reason: String },

    /// Another writer advanced the entry since it was read.
    #[error("Knowledge entry {signature} changed since it was read")]
    StoreConflict { signature: String },

    /// A keyed lock was poisoned by a panicking holder.
    #[error("Lock poisoned while {during}")]
    StoreLockError { during: &'static str },

    /// Reading or writing a source file failed.
    #[error("Source I/O error at {path}: {reason}")]
    SourceIo { path: PathBuf, reason: String },

    /// Only automatic fixes can be applied without a human.
    #[error("Fix '{fix_id}' is {fix_type}, only automatic fixes can be applied")]
    FixNotAutomatic { fix_id: String, fix_type: String },

    /// An automatic fix that cannot be rolled back was constructed outside
    /// the builder.
    #[error("Automatic fix '{fix_id}' declares no rollback capability")]
    RollbackUnavailable { fix_id: String },

    /// Restoring the snapshot after a failed post-condition failed.
    #[error("Rollback failed for {path}: {reason}")]
    RollbackFailed { path: PathBuf, reason: String },

    /// Flushing persisted state failed.
    #[error("Persistence error at {path}: {reason}")]
    Persistence { path: PathBuf, reason: String },

    /// A source editor is required for this operation.
    #[error("Required adapter not configured: {name}")]
    AdapterNotConfigured { name: &'static str },

    /// Validation failed (application-level, not domain).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::KnowledgeStore { .. } | Self::Persistence { .. } => vec![
                "Check that the knowledge-base file is readable and writable".into(),
                "Try: mend config get knowledge.path".into(),
            ],
            Self::StoreConflict { .. } => vec![
                "Another mend process updated the knowledge base at the same time".into(),
                "Run the command again".into(),
            ],
            Self::StoreLockError { .. } => vec![
                "A previous operation panicked while holding a lock".into(),
                "Restart the process and try again".into(),
            ],
            Self::SourceIo { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that the file exists and you have write permissions".into(),
            ],
            Self::FixNotAutomatic { .. } => vec![
                "Apply this fix by hand, then record the outcome with `mend learn`".into(),
                "Try: mend suggest <INPUT> to see which fixes are automatic".into(),
            ],
            Self::RollbackUnavailable { .. } => {
                vec!["Rebuild the fix through the rule book so its type is enforced".into()]
            }
            Self::RollbackFailed { path, .. } => vec![
                format!("{} may contain a partial edit", path.display()),
                "Restore the file from version control".into(),
            ],
            Self::AdapterNotConfigured { name } => vec![
                format!("Required component not configured: {}", name),
                "This is likely a configuration error".into(),
            ],
            Self::ValidationFailed(_) => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> FailureKind {
        match self {
            Self::KnowledgeStore { .. }
            | Self::Persistence { .. }
            | Self::StoreLockError { .. }
            | Self::RollbackFailed { .. }
            | Self::RollbackUnavailable { .. } => FailureKind::Internal,
            Self::StoreConflict { .. } => FailureKind::Conflict,
            Self::SourceIo { .. } => FailureKind::NotFound,
            Self::FixNotAutomatic { .. } | Self::ValidationFailed(_) => FailureKind::Validation,
            Self::AdapterNotConfigured { .. } => FailureKind::Configuration,
        }
    }
}
