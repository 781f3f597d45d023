//! Automatic fix application with snapshot rollback.
//!
//! One traversal of the fix state machine per call:
//!
//! 1. read the file once; that buffer is the immutable snapshot
//! 2. check pre-conditions against the snapshot (failure writes nothing)
//! 3. apply every change against the snapshot in one batch and write it
//! 4. re-read and check post-conditions; on failure write the snapshot back
//!
//! A per-file lock keeps traversals on the same file from interleaving.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    application::{ApplicationError, locks::KeyedLocks, ports::SourceEditor},
    domain::{
        ConditionContext, Diagnostic, Fix, FixState, FixStateMachine, FixType, Resolution,
        TextBuffer, TextChange, conditions,
    },
    error::{MendError, MendResult},
};

/// Result of one traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixOutcome {
    pub attempt_id: Uuid,
    pub fix_id: String,
    pub file: PathBuf,
    /// `Committed` or `RolledBack`.
    pub state: FixState,
    pub success: bool,
    pub applied_changes: Vec<TextChange>,
    pub side_effects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub trail: Vec<FixState>,
}

impl FixOutcome {
    /// Knowledge-base record for this attempt.
    pub fn to_resolution(&self, diagnostic: &Diagnostic, fix: &Fix) -> Resolution {
        Resolution::new(diagnostic.code, fix.description.clone(), self.success)
            .with_pattern(diagnostic.message.clone())
    }
}

pub struct FixApplier {
    editor: Arc<dyn SourceEditor>,
    locks: KeyedLocks<PathBuf>,
}

impl FixApplier {
    pub fn new(editor: Arc<dyn SourceEditor>) -> Self {
        Self {
            editor,
            locks: KeyedLocks::new(),
        }
    }

    /// Compute the edited text without writing anything.
    pub fn preview(&self, diagnostic: &Diagnostic, fix: &Fix) -> MendResult<TextBuffer> {
        ensure_applicable(fix)?;
        let before = self.editor.read(diagnostic.file())?;
        let ctx = ConditionContext {
            diagnostic,
            fix,
            before: &before,
            after: None,
        };
        conditions::evaluate(&fix.validation.pre_conditions, &ctx)
            .map_err(|failure| ApplicationError::ValidationFailed(failure.to_string()))?;
        Ok(before.apply_batch(&fix.changes)?)
    }

    /// Apply an automatic fix.
    ///
    /// Condition failures are normal outcomes (`success == false`). Errors
    /// are reserved for fixes that may not enter the state machine, I/O that
    /// fails before anything was written, and a rollback that could not
    /// restore the snapshot.
    #[instrument(skip_all, fields(fix = %fix.id, file = %diagnostic.file().display()))]
    pub fn apply(&self, diagnostic: &Diagnostic, fix: &Fix) -> MendResult<FixOutcome> {
        ensure_applicable(fix)?;
        fix.validate()?;

        let path = diagnostic.file().to_path_buf();
        let handle = self.locks.handle(&lock_key(&path))?;
        let _guard = handle.lock().map_err(|_| ApplicationError::StoreLockError {
            during: "applying a fix",
        })?;

        let mut machine = FixStateMachine::new();
        let attempt = Attempt {
            id: Uuid::new_v4(),
            fix,
            path: &path,
        };

        let before = self.editor.read(&path)?;
        let pre = ConditionContext {
            diagnostic,
            fix,
            before: &before,
            after: None,
        };
        machine.advance(FixState::PreconditionChecked)?;
        if let Err(failure) = conditions::evaluate(&fix.validation.pre_conditions, &pre) {
            info!(%failure, "Pre-condition failed, nothing written");
            machine.advance(FixState::RolledBack)?;
            return Ok(attempt.failed(machine, failure.to_string()));
        }

        let after = match before.apply_batch(&fix.changes) {
            Ok(after) => after,
            Err(e) => {
                machine.advance(FixState::RolledBack)?;
                return Ok(attempt.failed(machine, e.to_string()));
            }
        };
        if let Err(e) = self.editor.write(&path, &after) {
            warn!(error = %e, "Write failed, restoring snapshot");
            self.restore(&path, &before)?;
            machine.advance(FixState::RolledBack)?;
            return Ok(attempt.failed(machine, e.to_string()));
        }
        machine.advance(FixState::Applied)?;

        let reread = self.editor.read(&path);
        let verdict = match &reread {
            Ok(current) => {
                let post = ConditionContext {
                    after: Some(current),
                    ..pre
                };
                conditions::evaluate(&fix.validation.post_conditions, &post)
                    .map_err(|failure| failure.to_string())
            }
            Err(e) => Err(format!("could not re-read the file: {e}")),
        };

        match verdict {
            Ok(()) => {
                machine.advance(FixState::PostconditionValidated)?;
                machine.advance(FixState::Committed)?;
                info!(changes = fix.changes.len(), "Fix committed");
                Ok(attempt.committed(machine))
            }
            Err(reason) => {
                warn!(%reason, "Post-condition failed, rolling back");
                self.restore(&path, &before)?;
                machine.advance(FixState::RolledBack)?;
                Ok(attempt.failed(machine, reason))
            }
        }
    }

    fn restore(&self, path: &Path, snapshot: &TextBuffer) -> MendResult<()> {
        self.editor.write(path, snapshot).map_err(|e| {
            MendError::from(ApplicationError::RollbackFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        })
    }
}

/// Spellings of one file share a key: absolute, `.` dropped and `..` folded
/// lexically. Symlinks are not resolved.
fn lock_key(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut key = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match key.components().next_back() {
                Some(Component::Normal(_)) => {
                    key.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => key.push(component),
            },
            other => key.push(other),
        }
    }
    key
}

fn ensure_applicable(fix: &Fix) -> MendResult<()> {
    if fix.fix_type != FixType::Automatic {
        return Err(ApplicationError::FixNotAutomatic {
            fix_id: fix.id.clone(),
            fix_type: fix.fix_type.to_string(),
        }
        .into());
    }
    if !fix.rollback_possible {
        return Err(ApplicationError::RollbackUnavailable {
            fix_id: fix.id.clone(),
        }
        .into());
    }
    Ok(())
}

struct Attempt<'a> {
    id: Uuid,
    fix: &'a Fix,
    path: &'a Path,
}

impl Attempt<'_> {
    fn committed(&self, machine: FixStateMachine) -> FixOutcome {
        FixOutcome {
            attempt_id: self.id,
            fix_id: self.fix.id.clone(),
            file: self.path.to_path_buf(),
            state: machine.current(),
            success: true,
            applied_changes: self.fix.changes.clone(),
            side_effects: self.fix.validation.side_effects.clone(),
            error: None,
            trail: machine.into_trail(),
        }
    }

    fn failed(&self, machine: FixStateMachine, error: String) -> FixOutcome {
        FixOutcome {
            attempt_id: self.id,
            fix_id: self.fix.id.clone(),
            file: self.path.to_path_buf(),
            state: machine.current(),
            success: false,
            applied_changes: Vec::new(),
            side_effects: Vec::new(),
            error: Some(error),
            trail: machine.into_trail(),
        }
    }
}
