//! Feedback records describing how a diagnostic was actually resolved.

use serde::{Deserialize, Serialize};

use crate::domain::{error::DomainError, value_objects::UserFeedback};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub error_code: u32,
    /// Text signature of the problem, e.g. the diagnostic message shape.
    pub pattern: String,
    pub solution: String,
    pub success: bool,
    /// Minutes spent resolving.
    pub time_to_resolve: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_feedback: Option<UserFeedback>,
}

impl Resolution {
    pub fn new(error_code: u32, solution: impl Into<String>, success: bool) -> Self {
        Self {
            error_code,
            pattern: String::new(),
            solution: solution.into(),
            success,
            time_to_resolve: 1,
            user_feedback: None,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_time(mut self, minutes: u32) -> Self {
        self.time_to_resolve = minutes;
        self
    }

    pub fn with_feedback(mut self, feedback: UserFeedback) -> Self {
        self.user_feedback = Some(feedback);
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.solution.trim().is_empty() {
            return Err(DomainError::InvalidResolution(
                "solution must not be empty".into(),
            ));
        }
        if self.time_to_resolve == 0 {
            return Err(DomainError::InvalidResolution(
                "time to resolve must be a positive number of minutes".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_solution_is_rejected() {
        assert!(Resolution::new(2304, " ", true).validate().is_err());
    }

    #[test]
    fn zero_minutes_is_rejected() {
        assert!(Resolution::new(2304, "import it", true)
            .with_time(0)
            .validate()
            .is_err());
    }

    #[test]
    fn feedback_serializes_snake_case() {
        let r = Resolution::new(2304, "import it", true).with_feedback(UserFeedback::NotHelpful);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["userFeedback"], "not_helpful");
        assert_eq!(json["timeToResolve"], 1);
    }
}
