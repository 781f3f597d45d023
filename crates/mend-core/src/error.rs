//! Unified error handling for Mend Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{DomainError, FailureCategory};

/// Root error type for Mend Core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MendError {
    /// Errors from the domain layer (invalid records, broken invariants).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration failures).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl MendError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Mend".into(),
                "Please report it together with the input that triggered it".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> FailureKind {
        match self {
            Self::Domain(e) => match e.category() {
                FailureCategory::Validation => FailureKind::Validation,
                FailureCategory::Conflict => FailureKind::Conflict,
                FailureCategory::Internal => FailureKind::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => FailureKind::Configuration,
            Self::Internal { .. } => FailureKind::Internal,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Application(ApplicationError::StoreLockError { .. })
                | Self::Application(ApplicationError::StoreConflict { .. })
                | Self::Application(ApplicationError::KnowledgeStore { .. })
        )
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Conflict,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type MendResult<T> = Result<T, MendError>;
