//! Domain value objects: ErrorCategory, Severity, ImpactLevel, FixComplexity,
//! FixType, UserFeedback, ResourceKind.
//!
//! # Design
//!
//! These are pure value types: `Copy`, equality-by-value, no identity.
//! They hold NO rule logic. Root causes, tips, and fix patterns live in
//! `catalog.rs`. This file's only job is to define the closed enumerations,
//! their string representations, and their `FromStr` parsers.
//!
//! # Adding New Variants
//!
//! 1. Add the enum variant here
//! 2. Add the `as_str` arm and the `FromStr` arm here
//! 3. Add a `CategoryDef` entry in `catalog.rs` (categories only)

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── ErrorCategory ────────────────────────────────────────────────────────────

/// Closed taxonomy of diagnostic categories.
///
/// This is data describing a diagnostic, not a failure of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    SyntaxError,
    TypeError,
    ImportError,
    ConfigurationError,
    DeclarationError,
    StrictModeError,
    UnusedCode,
    DeprecatedApi,
    GenericError,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 9] = [
        Self::SyntaxError,
        Self::TypeError,
        Self::ImportError,
        Self::ConfigurationError,
        Self::DeclarationError,
        Self::StrictModeError,
        Self::UnusedCode,
        Self::DeprecatedApi,
        Self::GenericError,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SyntaxError => "SYNTAX_ERROR",
            Self::TypeError => "TYPE_ERROR",
            Self::ImportError => "IMPORT_ERROR",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
            Self::DeclarationError => "DECLARATION_ERROR",
            Self::StrictModeError => "STRICT_MODE_ERROR",
            Self::UnusedCode => "UNUSED_CODE",
            Self::DeprecatedApi => "DEPRECATED_API",
            Self::GenericError => "GENERIC_ERROR",
        }
    }

    /// Short human label used in CLI output.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SyntaxError => "syntax",
            Self::TypeError => "type",
            Self::ImportError => "import",
            Self::ConfigurationError => "configuration",
            Self::DeclarationError => "declaration",
            Self::StrictModeError => "strict mode",
            Self::UnusedCode => "unused code",
            Self::DeprecatedApi => "deprecated API",
            Self::GenericError => "generic",
        }
    }

    pub const fn is_generic(&self) -> bool {
        matches!(self, Self::GenericError)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCategory {
    type Err = DomainError;

    /// Accepts the canonical spelling as well as kebab/lowercase short forms
    /// (`import`, `import-error`, `strict_mode`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "syntax_error" | "syntax" => Ok(Self::SyntaxError),
            "type_error" | "type" => Ok(Self::TypeError),
            "import_error" | "import" => Ok(Self::ImportError),
            "configuration_error" | "configuration" | "config" => Ok(Self::ConfigurationError),
            "declaration_error" | "declaration" => Ok(Self::DeclarationError),
            "strict_mode_error" | "strict_mode" | "strict" => Ok(Self::StrictModeError),
            "unused_code" | "unused" => Ok(Self::UnusedCode),
            "deprecated_api" | "deprecated" => Ok(Self::DeprecatedApi),
            "generic_error" | "generic" => Ok(Self::GenericError),
            _ => Err(DomainError::UnknownCategory(s.to_string())),
        }
    }
}

// ── Severity ─────────────────────────────────────────────────────────────────

/// Severity as reported by the upstream checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

impl Severity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warning" | "warn" => Ok(Self::Warning),
            "info" | "message" | "suggestion" => Ok(Self::Info),
            other => Err(DomainError::InvalidDiagnostic {
                field: "severity",
                reason: format!("unknown severity: {other}"),
            }),
        }
    }
}

// ── ImpactLevel ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ImpactLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// One step less severe, saturating at `Low`.
    pub const fn lowered(self) -> Self {
        match self {
            Self::Critical => Self::High,
            Self::High => Self::Medium,
            Self::Medium | Self::Low => Self::Low,
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── FixComplexity ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixComplexity {
    Simple,
    Moderate,
    Complex,
}

impl FixComplexity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
        }
    }

    /// One step harder, saturating at `Complex`.
    pub const fn raised(self) -> Self {
        match self {
            Self::Simple => Self::Moderate,
            Self::Moderate | Self::Complex => Self::Complex,
        }
    }
}

impl fmt::Display for FixComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── FixType ──────────────────────────────────────────────────────────────────

/// How much human involvement a fix needs.
///
/// Ordered from most to least autonomous so that clamping is a simple
/// "move right" operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixType {
    Automatic,
    SemiAutomatic,
    Manual,
}

impl FixType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::SemiAutomatic => "semi-automatic",
            Self::Manual => "manual",
        }
    }

    /// Minimum confidence an automatic fix must carry.
    pub const AUTOMATIC_THRESHOLD: f64 = 0.7;

    /// Clamp downward: automatic becomes semi-automatic, others unchanged.
    pub const fn downgraded(self) -> Self {
        match self {
            Self::Automatic => Self::SemiAutomatic,
            other => other,
        }
    }
}

impl fmt::Display for FixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FixType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "automatic" | "auto" => Ok(Self::Automatic),
            "semi-automatic" | "semi" => Ok(Self::SemiAutomatic),
            "manual" => Ok(Self::Manual),
            other => Err(DomainError::InvalidRule {
                rule_id: String::new(),
                reason: format!("unknown fix type: {other}"),
            }),
        }
    }
}

// ── UserFeedback ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserFeedback {
    Helpful,
    NotHelpful,
    PartiallyHelpful,
}

impl UserFeedback {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Helpful => "helpful",
            Self::NotHelpful => "not_helpful",
            Self::PartiallyHelpful => "partially_helpful",
        }
    }

    /// Direction this feedback pushes the confidence adjustment.
    pub const fn polarity(&self) -> f64 {
        match self {
            Self::Helpful => 1.0,
            Self::NotHelpful => -1.0,
            Self::PartiallyHelpful => 0.0,
        }
    }
}

impl fmt::Display for UserFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserFeedback {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "helpful" => Ok(Self::Helpful),
            "not_helpful" | "unhelpful" => Ok(Self::NotHelpful),
            "partially_helpful" | "partial" => Ok(Self::PartiallyHelpful),
            other => Err(DomainError::InvalidResolution(format!(
                "unknown feedback: {other}"
            ))),
        }
    }
}

// ── ResourceKind ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Documentation,
    Tutorial,
    Reference,
    Video,
}

impl ResourceKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Documentation => "documentation",
            Self::Tutorial => "tutorial",
            Self::Reference => "reference",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_canonical_and_short_forms() {
        assert_eq!(
            ErrorCategory::from_str("IMPORT_ERROR").unwrap(),
            ErrorCategory::ImportError
        );
        assert_eq!(
            ErrorCategory::from_str("strict-mode").unwrap(),
            ErrorCategory::StrictModeError
        );
        assert!(ErrorCategory::from_str("banana").is_err());
    }

    #[test]
    fn category_round_trips_through_display() {
        for category in ErrorCategory::ALL {
            assert_eq!(
                ErrorCategory::from_str(&category.to_string()).unwrap(),
                category
            );
        }
    }

    #[test]
    fn category_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCategory::DeprecatedApi).unwrap();
        assert_eq!(json, "\"DEPRECATED_API\"");
    }

    #[test]
    fn fix_type_only_clamps_downward() {
        assert_eq!(FixType::Automatic.downgraded(), FixType::SemiAutomatic);
        assert_eq!(FixType::SemiAutomatic.downgraded(), FixType::SemiAutomatic);
        assert_eq!(FixType::Manual.downgraded(), FixType::Manual);
    }

    #[test]
    fn fix_type_serializes_kebab() {
        let json = serde_json::to_string(&FixType::SemiAutomatic).unwrap();
        assert_eq!(json, "\"semi-automatic\"");
    }

    #[test]
    fn feedback_polarity() {
        assert!(UserFeedback::Helpful.polarity() > 0.0);
        assert!(UserFeedback::NotHelpful.polarity() < 0.0);
        assert_eq!(UserFeedback::PartiallyHelpful.polarity(), 0.0);
    }

    #[test]
    fn impact_lowering_saturates() {
        assert_eq!(ImpactLevel::Critical.lowered(), ImpactLevel::High);
        assert_eq!(ImpactLevel::Low.lowered(), ImpactLevel::Low);
    }

    #[test]
    fn complexity_raising_saturates() {
        assert_eq!(FixComplexity::Simple.raised(), FixComplexity::Moderate);
        assert_eq!(FixComplexity::Complex.raised(), FixComplexity::Complex);
    }
}
