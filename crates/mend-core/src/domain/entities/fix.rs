//! Candidate remediations and the builder that enforces their invariants.
//!
//! Every `Fix` in the system is produced by [`FixBuilder::build`], which is
//! the single place the invariants are enforced:
//!
//! - `automatic` ⇒ confidence ≥ 0.7, rollback possible, non-empty change set
//!   (otherwise the type is clamped to `semi-automatic`, never upward)
//! - `manual` ⇒ `test_required`
//! - more than two pre-conditions ⇒ `test_required`
//! - post-conditions are never empty (construction fails)

use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::text::TextChange,
    error::DomainError,
    value_objects::{ErrorCategory, FixType},
};

/// How a fix can be checked before and after it is applied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixValidation {
    pub pre_conditions: Vec<String>,
    pub post_conditions: Vec<String>,
    pub side_effects: Vec<String>,
    pub test_required: bool,
}

/// A candidate remediation for one diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fix {
    pub id: String,
    pub description: String,
    #[serde(rename = "type")]
    pub fix_type: FixType,
    pub confidence: f64,
    pub category: ErrorCategory,
    pub changes: Vec<TextChange>,
    pub validation: FixValidation,
    pub rollback_possible: bool,
}

impl Fix {
    pub fn builder(id: impl Into<String>, description: impl Into<String>) -> FixBuilder {
        FixBuilder::new(id, description)
    }

    pub fn is_automatic(&self) -> bool {
        self.fix_type == FixType::Automatic
    }

    /// Re-derive the fix after its confidence changed (e.g. after a
    /// knowledge-base blend), clamping the type downward if needed.
    pub fn with_confidence(self, confidence: f64) -> Self {
        let mut fix = self;
        fix.confidence = confidence.clamp(0.0, 1.0);
        enforce(&mut fix);
        fix
    }

    /// Verify the invariants hold. Used on fixes that arrive from outside
    /// the builder (deserialized input).
    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |reason: &str| DomainError::InvalidFix {
            fix_id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.description.trim().is_empty() {
            return Err(invalid("description must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(invalid("confidence must be within 0.0..=1.0"));
        }
        if self.validation.post_conditions.is_empty() {
            return Err(invalid("at least one post-condition is required"));
        }
        if self.fix_type == FixType::Automatic {
            if self.confidence < FixType::AUTOMATIC_THRESHOLD {
                return Err(invalid("automatic fixes need confidence >= 0.7"));
            }
            if !self.rollback_possible {
                return Err(invalid("automatic fixes must be rollback-capable"));
            }
        }
        if self.fix_type == FixType::Manual && !self.validation.test_required {
            return Err(invalid("manual fixes must require testing"));
        }
        if self.validation.pre_conditions.len() > 2 && !self.validation.test_required {
            return Err(invalid("fixes with many pre-conditions must require testing"));
        }
        Ok(())
    }
}

fn enforce(fix: &mut Fix) {
    if fix.fix_type == FixType::Automatic
        && (fix.confidence < FixType::AUTOMATIC_THRESHOLD
            || !fix.rollback_possible
            || fix.changes.is_empty())
    {
        fix.fix_type = fix.fix_type.downgraded();
    }
    if fix.fix_type == FixType::Manual || fix.validation.pre_conditions.len() > 2 {
        fix.validation.test_required = true;
    }
}

/// Builder for [`Fix`].
#[derive(Debug, Clone)]
pub struct FixBuilder {
    fix: Fix,
}

impl FixBuilder {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            fix: Fix {
                id: id.into(),
                description: description.into(),
                fix_type: FixType::Manual,
                confidence: 0.0,
                category: ErrorCategory::GenericError,
                changes: Vec::new(),
                validation: FixValidation::default(),
                rollback_possible: false,
            },
        }
    }

    pub fn fix_type(mut self, fix_type: FixType) -> Self {
        self.fix.fix_type = fix_type;
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.fix.confidence = confidence;
        self
    }

    pub fn category(mut self, category: ErrorCategory) -> Self {
        self.fix.category = category;
        self
    }

    pub fn changes(mut self, changes: Vec<TextChange>) -> Self {
        self.fix.changes = changes;
        self
    }

    pub fn pre_condition(mut self, condition: impl Into<String>) -> Self {
        self.fix.validation.pre_conditions.push(condition.into());
        self
    }

    pub fn post_condition(mut self, condition: impl Into<String>) -> Self {
        self.fix.validation.post_conditions.push(condition.into());
        self
    }

    pub fn side_effect(mut self, effect: impl Into<String>) -> Self {
        self.fix.validation.side_effects.push(effect.into());
        self
    }

    pub fn test_required(mut self, required: bool) -> Self {
        self.fix.validation.test_required = required;
        self
    }

    pub fn rollback_possible(mut self, possible: bool) -> Self {
        self.fix.rollback_possible = possible;
        self
    }

    pub fn build(self) -> Result<Fix, DomainError> {
        let mut fix = self.fix;

        if fix.description.trim().is_empty() {
            return Err(DomainError::InvalidFix {
                fix_id: fix.id,
                reason: "description must not be empty".into(),
            });
        }
        if !(0.0..=1.0).contains(&fix.confidence) || fix.confidence.is_nan() {
            return Err(DomainError::InvalidFix {
                fix_id: fix.id,
                reason: format!("confidence {} is outside 0.0..=1.0", fix.confidence),
            });
        }
        if fix.validation.post_conditions.is_empty() {
            return Err(DomainError::InvalidFix {
                fix_id: fix.id,
                reason: "at least one post-condition is required".into(),
            });
        }

        enforce(&mut fix);
        Ok(fix)
    }
}

/// Stable sort by confidence, highest first.
pub fn rank(fixes: &mut [Fix]) {
    fixes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn automatic(confidence: f64) -> FixBuilder {
        Fix::builder("f", "Add missing import")
            .fix_type(FixType::Automatic)
            .confidence(confidence)
            .changes(vec![TextChange::insert(0, "import x from 'x';\n")])
            .post_condition("import statement present")
            .rollback_possible(true)
    }

    #[test]
    fn automatic_fix_keeps_type_above_threshold() {
        let fix = automatic(0.8).build().unwrap();
        assert_eq!(fix.fix_type, FixType::Automatic);
        assert!(fix.validate().is_ok());
    }

    #[test]
    fn low_confidence_automatic_is_clamped() {
        let fix = automatic(0.5).build().unwrap();
        assert_eq!(fix.fix_type, FixType::SemiAutomatic);
    }

    #[test]
    fn automatic_without_rollback_is_clamped() {
        let fix = automatic(0.9).rollback_possible(false).build().unwrap();
        assert_eq!(fix.fix_type, FixType::SemiAutomatic);
    }

    #[test]
    fn automatic_without_changes_is_clamped() {
        let fix = automatic(0.9).changes(vec![]).build().unwrap();
        assert_eq!(fix.fix_type, FixType::SemiAutomatic);
    }

    #[test]
    fn manual_fix_requires_tests() {
        let fix = Fix::builder("m", "Investigate")
            .confidence(0.3)
            .post_condition("diagnostic no longer reported")
            .build()
            .unwrap();
        assert!(fix.validation.test_required);
    }

    #[test]
    fn many_preconditions_require_tests() {
        let fix = automatic(0.9)
            .pre_condition("a")
            .pre_condition("b")
            .pre_condition("c")
            .build()
            .unwrap();
        assert!(fix.validation.test_required);
    }

    #[test]
    fn missing_postconditions_is_an_error() {
        let result = Fix::builder("x", "Do something").confidence(0.5).build();
        assert!(matches!(result, Err(DomainError::InvalidFix { .. })));
    }

    #[test]
    fn confidence_out_of_range_is_an_error() {
        assert!(automatic(1.2).build().is_err());
    }

    #[test]
    fn lowering_confidence_never_upgrades() {
        let fix = automatic(0.9).build().unwrap().with_confidence(0.6);
        assert_eq!(fix.fix_type, FixType::SemiAutomatic);
        let fix = fix.with_confidence(0.95);
        assert_eq!(fix.fix_type, FixType::SemiAutomatic);
    }

    #[test]
    fn rank_is_stable() {
        let mk = |id: &str, c: f64| {
            Fix::builder(id, id)
                .confidence(c)
                .post_condition("ok")
                .build()
                .unwrap()
        };
        let mut fixes = vec![mk("a", 0.5), mk("b", 0.9), mk("c", 0.5)];
        rank(&mut fixes);
        let ids: Vec<_> = fixes.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn fix_serializes_type_field() {
        let json = serde_json::to_value(automatic(0.8).build().unwrap()).unwrap();
        assert_eq!(json["type"], "automatic");
        assert!(json["validation"]["postConditions"].is_array());
        assert_eq!(json["rollbackPossible"], true);
    }
}
