// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

use crate::domain::entities::fix_state::FixState;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (outcomes embed them as text, callers may retry)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("Invalid diagnostic ({field}): {reason}")]
    InvalidDiagnostic { field: &'static str, reason: String },

    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    #[error("Invalid fix '{fix_id}': {reason}")]
    InvalidFix { fix_id: String, reason: String },

    #[error("Invalid rule '{rule_id}': {reason}")]
    InvalidRule { rule_id: String, reason: String },

    #[error("Unknown error category: {0}")]
    UnknownCategory(String),

    #[error("Invalid signature '{0}': expected TS<code>:<CATEGORY>")]
    InvalidSignature(String),

    // ========================================================================
    // Text Buffer Errors
    // ========================================================================
    #[error("Edit span {start}..{end} is outside the buffer (length {len})")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Edit span {start}..{end} does not fall on a character boundary")]
    SpanNotOnCharBoundary { start: usize, end: usize },

    #[error("Edit spans overlap at offset {offset}")]
    OverlappingSpans { offset: usize },

    // ========================================================================
    // Constraint Violations
    // ========================================================================
    #[error("Illegal fix state transition: {from} -> {to}")]
    InvalidTransition { from: FixState, to: FixState },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidDiagnostic { field, reason } => vec![
                format!("The diagnostic field '{}' is invalid: {}", field, reason),
                "Lines and columns are 1-based; messages must not be empty".into(),
                "Check the output of the tool that produced the diagnostics".into(),
            ],
            Self::InvalidResolution(reason) => vec![
                format!("Resolution rejected: {}", reason),
                "Provide a non-empty solution and a positive time to resolve".into(),
            ],
            Self::InvalidRule { rule_id, reason } => vec![
                format!("Rule '{}' could not be loaded: {}", rule_id, reason),
                "Confidence must be within 0.0..=1.0".into(),
                "Every rule needs at least one post-condition".into(),
            ],
            Self::UnknownCategory(name) => vec![
                format!("'{}' is not a known category", name),
                "Known categories: SYNTAX_ERROR, TYPE_ERROR, IMPORT_ERROR, CONFIGURATION_ERROR,"
                    .into(),
                "  DECLARATION_ERROR, STRICT_MODE_ERROR, UNUSED_CODE, DEPRECATED_API, GENERIC_ERROR"
                    .into(),
            ],
            Self::InvalidSignature(_) => vec![
                "Signatures look like TS2304:IMPORT_ERROR".into(),
                "Try: mend kb list".into(),
            ],
            Self::SpanOutOfBounds { .. }
            | Self::SpanNotOnCharBoundary { .. }
            | Self::OverlappingSpans { .. } => vec![
                "The file changed since the fix was suggested".into(),
                "Re-run the checker and request fresh suggestions".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::InvalidDiagnostic { .. }
            | Self::InvalidResolution(_)
            | Self::InvalidRule { .. }
            | Self::UnknownCategory(_)
            | Self::InvalidSignature(_) => FailureCategory::Validation,
            Self::SpanOutOfBounds { .. }
            | Self::SpanNotOnCharBoundary { .. }
            | Self::OverlappingSpans { .. } => FailureCategory::Conflict,
            Self::InvalidFix { .. } | Self::InvalidTransition { .. } => FailureCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Validation,
    Conflict,
    Internal,
}
