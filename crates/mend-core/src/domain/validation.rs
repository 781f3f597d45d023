use crate::domain::{
    entities::{diagnostic::Diagnostic, fix::Fix, resolution::Resolution},
    error::DomainError,
    rules::PatternRule,
};

/// Centralized domain validation.
///
/// Services validate at the boundary through this type; entities carry the
/// checks themselves.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_diagnostic(diagnostic: &Diagnostic) -> Result<(), DomainError> {
        diagnostic.validate()
    }

    /// A resolution must describe the diagnostic it is reported for.
    pub fn validate_feedback(
        diagnostic: &Diagnostic,
        resolution: &Resolution,
    ) -> Result<(), DomainError> {
        diagnostic.validate()?;
        resolution.validate()?;
        if resolution.error_code != diagnostic.code {
            return Err(DomainError::InvalidResolution(format!(
                "resolution is for TS{} but the diagnostic is TS{}",
                resolution.error_code, diagnostic.code
            )));
        }
        Ok(())
    }

    pub fn validate_fix(fix: &Fix) -> Result<(), DomainError> {
        fix.validate()
    }

    pub fn validate_rule(rule: &PatternRule) -> Result<(), DomainError> {
        rule.validate()
    }
}
