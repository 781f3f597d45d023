//! Diagnostic records and their knowledge-base signature.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{
    error::DomainError,
    value_objects::{ErrorCategory, Severity},
};

/// A single problem reported by an external type checker or linter.
///
/// Diagnostics are immutable facts. Classification produces a normalized
/// copy rather than mutating the original.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub file: PathBuf,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
    pub message: String,
    pub code: u32,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default = "generic_category")]
    pub category: ErrorCategory,
}

fn generic_category() -> ErrorCategory {
    ErrorCategory::GenericError
}

impl Diagnostic {
    /// Create an error-severity diagnostic with an unresolved category.
    pub fn new(
        file: impl Into<PathBuf>,
        line: u32,
        column: u32,
        code: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            message: message.into(),
            code,
            severity: Severity::Error,
            category: ErrorCategory::GenericError,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_category(mut self, category: ErrorCategory) -> Self {
        self.category = category;
        self
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Knowledge-base key for this diagnostic.
    pub fn signature(&self) -> Signature {
        Signature::new(self.code, self.category)
    }

    /// Human-readable location, `file:line:column`.
    pub fn location(&self) -> String {
        format!("{}:{}:{}", self.file.display(), self.line, self.column)
    }

    /// Reject malformed input at the API boundary.
    ///
    /// Never coerces: a zero line is an error, not line 1.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.file.as_os_str().is_empty() {
            return Err(DomainError::InvalidDiagnostic {
                field: "file",
                reason: "path must not be empty".into(),
            });
        }
        if self.line == 0 {
            return Err(DomainError::InvalidDiagnostic {
                field: "line",
                reason: "must be a positive 1-based line number".into(),
            });
        }
        if self.column == 0 {
            return Err(DomainError::InvalidDiagnostic {
                field: "column",
                reason: "must be a positive 1-based column number".into(),
            });
        }
        if self.message.trim().is_empty() {
            return Err(DomainError::InvalidDiagnostic {
                field: "message",
                reason: "must not be empty".into(),
            });
        }
        if self.category == ErrorCategory::UnusedCode && self.severity != Severity::Warning {
            return Err(DomainError::InvalidDiagnostic {
                field: "severity",
                reason: format!(
                    "UNUSED_CODE diagnostics must be warnings, got {}",
                    self.severity
                ),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} TS{}: {}",
            self.location(),
            self.severity,
            self.code,
            self.message
        )
    }
}

// ── Signature ────────────────────────────────────────────────────────────────

/// Normalized `(code, category)` key used to group diagnostics.
///
/// Serialized as its textual form (`TS2304:IMPORT_ERROR`) so it can key JSON
/// maps directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Signature {
    code: u32,
    category: ErrorCategory,
}

impl Signature {
    pub const fn new(code: u32, category: ErrorCategory) -> Self {
        Self { code, category }
    }

    pub const fn code(&self) -> u32 {
        self.code
    }

    pub const fn category(&self) -> ErrorCategory {
        self.category
    }

    /// Whether two signatures are related (same code or same category).
    pub fn shares_code_or_category(&self, other: &Signature) -> bool {
        self.code == other.code || self.category == other.category
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TS{}:{}", self.code, self.category)
    }
}

impl FromStr for Signature {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (code, category) = s
            .split_once(':')
            .ok_or_else(|| DomainError::InvalidSignature(s.to_string()))?;

        let code = code
            .trim()
            .trim_start_matches("TS")
            .trim_start_matches("ts")
            .parse::<u32>()
            .map_err(|_| DomainError::InvalidSignature(s.to_string()))?;
        let category = ErrorCategory::from_str(category)
            .map_err(|_| DomainError::InvalidSignature(s.to_string()))?;

        Ok(Self::new(code, category))
    }
}

impl From<Signature> for String {
    fn from(signature: Signature) -> Self {
        signature.to_string()
    }
}

impl TryFrom<String> for Signature {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
