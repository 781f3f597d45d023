//! States of one automatic-fix application attempt.
//!
//! ```text
//! Proposed → PreconditionChecked → Applied → PostconditionValidated → Committed
//!                    │                │                 │
//!                    └────────────────┴────────┬────────┘
//!                                              ▼
//!                                         RolledBack → Proposed (caller retry)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FixState {
    Proposed,
    PreconditionChecked,
    Applied,
    PostconditionValidated,
    Committed,
    RolledBack,
}

impl FixState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Proposed => "proposed",
            Self::PreconditionChecked => "precondition-checked",
            Self::Applied => "applied",
            Self::PostconditionValidated => "postcondition-validated",
            Self::Committed => "committed",
            Self::RolledBack => "rolled-back",
        }
    }

    pub const fn can_transition_to(self, next: FixState) -> bool {
        matches!(
            (self, next),
            (Self::Proposed, Self::PreconditionChecked)
                | (Self::PreconditionChecked, Self::Applied)
                | (Self::Applied, Self::PostconditionValidated)
                | (Self::PostconditionValidated, Self::Committed)
                | (Self::PreconditionChecked, Self::RolledBack)
                | (Self::Applied, Self::RolledBack)
                | (Self::PostconditionValidated, Self::RolledBack)
                | (Self::RolledBack, Self::Proposed)
        )
    }

    pub fn transition(self, next: FixState) -> Result<FixState, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::RolledBack)
    }
}

impl fmt::Display for FixState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records every state an attempt passes through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixStateMachine {
    current: FixState,
    trail: Vec<FixState>,
}

impl FixStateMachine {
    pub fn new() -> Self {
        Self {
            current: FixState::Proposed,
            trail: vec![FixState::Proposed],
        }
    }

    pub fn current(&self) -> FixState {
        self.current
    }

    pub fn advance(&mut self, next: FixState) -> Result<FixState, DomainError> {
        self.current = self.current.transition(next)?;
        self.trail.push(next);
        Ok(self.current)
    }

    pub fn trail(&self) -> &[FixState] {
        &self.trail
    }

    pub fn into_trail(self) -> Vec<FixState> {
        self.trail
    }
}

impl Default for FixStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
