//! Core domain layer for Mend.
//!
//! Pure logic only: the taxonomy, the records that flow through the engine,
//! classification, the static catalog, fix rules, condition predicates, and
//! the fix state machine. No I/O; persistence and file access are ports in
//! the application layer.

pub mod catalog;
pub mod classifier;
pub mod conditions;
pub mod entities;
pub mod error;
pub mod rules;
pub mod value_objects;

mod validation;

pub use classifier::ErrorClassifier;
pub use conditions::{Condition, ConditionContext, ConditionFailure};
pub use entities::{
    analysis::ErrorAnalysis,
    diagnostic::{Diagnostic, Signature},
    fix::{Fix, FixBuilder, FixValidation, rank},
    fix_state::{FixState, FixStateMachine},
    knowledge::{ADJUSTMENT_ALPHA, BlendPolicy, KnowledgeBaseEntry, LearnedSolution},
    resolution::Resolution,
    suggestion::{ComprehensiveErrorSuggestion, LearningResource},
    text::{Span, TextBuffer, TextChange},
};
pub use error::{DomainError, FailureCategory};
pub use rules::{EditKind, PatternRule, RuleBook};
pub use validation::DomainValidator;
pub use value_objects::{
    ErrorCategory, FixComplexity, FixType, ImpactLevel, ResourceKind, Severity, UserFeedback,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_must_match_the_diagnostic_code() {
        let d = Diagnostic::new("a.ts", 1, 1, 2304, "Cannot find name 'x'.");
        let r = Resolution::new(2322, "convert", true);
        assert!(DomainValidator::validate_feedback(&d, &r).is_err());
        let r = Resolution::new(2304, "import it", true);
        assert!(DomainValidator::validate_feedback(&d, &r).is_ok());
    }

    #[test]
    fn normalized_builtin_suggestions_respect_fix_invariants() {
        let book = RuleBook::builtin().unwrap();
        for def in catalog::CODE_REGISTRY {
            let d = ErrorClassifier::normalize(&Diagnostic::new("a.ts", 1, 1, def.code, "msg"));
            for fix in book.matching_fixes(&d, None).unwrap() {
                DomainValidator::validate_fix(&fix).unwrap();
            }
        }
    }
}
