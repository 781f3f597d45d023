//! Assigns an [`ErrorCategory`] to a diagnostic.
//!
//! Resolution order: the known-code registry, then the upstream category
//! when it is specific, then code ranges, then message heuristics, then
//! `GENERIC_ERROR`. Unused-code findings reported as anything other than a
//! warning only exist under strict flags and are routed to
//! `STRICT_MODE_ERROR`.

use crate::domain::{
    catalog,
    entities::diagnostic::Diagnostic,
    value_objects::{ErrorCategory, Severity},
};

const MESSAGE_HINTS: &[(&str, ErrorCategory)] = &[
    ("Cannot find module", ErrorCategory::ImportError),
    ("has no exported member", ErrorCategory::ImportError),
    ("is deprecated", ErrorCategory::DeprecatedApi),
    ("implicitly has", ErrorCategory::StrictModeError),
    ("is possibly 'null'", ErrorCategory::StrictModeError),
    ("is possibly 'undefined'", ErrorCategory::StrictModeError),
    ("is declared but", ErrorCategory::UnusedCode),
    ("Duplicate identifier", ErrorCategory::DeclarationError),
    ("is not assignable to", ErrorCategory::TypeError),
];

pub struct ErrorClassifier;

impl ErrorClassifier {
    /// The category `diagnostic` belongs to. Never fails.
    pub fn classify(diagnostic: &Diagnostic) -> ErrorCategory {
        let category = Self::base_category(diagnostic);
        if category == ErrorCategory::UnusedCode && diagnostic.severity != Severity::Warning {
            ErrorCategory::StrictModeError
        } else {
            category
        }
    }

    /// A copy of `diagnostic` carrying its resolved category.
    pub fn normalize(diagnostic: &Diagnostic) -> Diagnostic {
        let category = Self::classify(diagnostic);
        diagnostic.clone().with_category(category)
    }

    fn base_category(diagnostic: &Diagnostic) -> ErrorCategory {
        if let Some(def) = catalog::code_def(diagnostic.code) {
            return def.category;
        }
        if !diagnostic.category.is_generic() {
            return diagnostic.category;
        }
        if let Some(category) = by_code_range(diagnostic.code) {
            return category;
        }
        MESSAGE_HINTS
            .iter()
            .find(|(hint, _)| diagnostic.message.contains(hint))
            .map_or(ErrorCategory::GenericError, |(_, category)| *category)
    }
}

fn by_code_range(code: u32) -> Option<ErrorCategory> {
    match code {
        1000..=1999 => Some(ErrorCategory::SyntaxError),
        5000..=5999 => Some(ErrorCategory::ConfigurationError),
        6133 | 6196 | 6198 => Some(ErrorCategory::UnusedCode),
        _ => None,
    }
}
