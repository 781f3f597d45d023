//! Machine-checkable pre- and post-conditions.
//!
//! Fixes declare conditions as text. The registry maps each known phrase to
//! a predicate over the file text before (and, for post-conditions, after)
//! the edit. Text the registry does not recognise fails closed.

use std::fmt;

use crate::domain::entities::{diagnostic::Diagnostic, fix::Fix, text::TextBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    EditsWithinBounds,
    TargetPositionExists,
    ImportAbsent,
    ImportPresent,
    InsertedTextPresent,
    LineCountDecreased,
    BufferChanged,
    BalancedDelimiters,
}

impl Condition {
    pub const ALL: [Condition; 8] = [
        Self::EditsWithinBounds,
        Self::TargetPositionExists,
        Self::ImportAbsent,
        Self::ImportPresent,
        Self::InsertedTextPresent,
        Self::LineCountDecreased,
        Self::BufferChanged,
        Self::BalancedDelimiters,
    ];

    pub const fn phrase(&self) -> &'static str {
        match self {
            Self::EditsWithinBounds => "edits within file bounds",
            Self::TargetPositionExists => "target position exists",
            Self::ImportAbsent => "import not already present",
            Self::ImportPresent => "import statement present",
            Self::InsertedTextPresent => "inserted text present",
            Self::LineCountDecreased => "line count decreased",
            Self::BufferChanged => "buffer changed",
            Self::BalancedDelimiters => "balanced delimiters",
        }
    }

    /// Case- and whitespace-insensitive lookup.
    pub fn lookup(text: &str) -> Option<Self> {
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::ALL
            .into_iter()
            .find(|c| c.phrase().eq_ignore_ascii_case(&normalized))
    }

    fn check(&self, ctx: &ConditionContext<'_>) -> Result<(), String> {
        match self {
            Self::EditsWithinBounds => ctx
                .before
                .validate_changes(&ctx.fix.changes)
                .map_err(|e| e.to_string()),
            Self::TargetPositionExists => ctx
                .before
                .offset_of(ctx.diagnostic.line, ctx.diagnostic.column)
                .map(|_| ())
                .ok_or_else(|| format!("{} is past the end of the file", ctx.diagnostic.location())),
            Self::ImportAbsent => {
                let imports = import_lines(ctx.fix);
                if imports.is_empty() {
                    return Err("the fix inserts no import".into());
                }
                match imports.iter().find(|line| ctx.before.as_str().contains(*line)) {
                    Some(line) => Err(format!("`{line}` is already present")),
                    None => Ok(()),
                }
            }
            Self::ImportPresent => {
                let after = ctx.after()?;
                let imports = import_lines(ctx.fix);
                if imports.is_empty() {
                    return Err("the fix inserts no import".into());
                }
                match imports.iter().find(|line| !after.as_str().contains(*line)) {
                    Some(line) => Err(format!("`{line}` is missing after the edit")),
                    None => Ok(()),
                }
            }
            Self::InsertedTextPresent => inserted_text_present(ctx.fix, ctx.after()?),
            Self::LineCountDecreased => {
                let (before, after) = (ctx.before.line_count(), ctx.after()?.line_count());
                if after < before {
                    Ok(())
                } else {
                    Err(format!("line count went from {before} to {after}"))
                }
            }
            Self::BufferChanged => {
                if ctx.after()?.as_str() != ctx.before.as_str() {
                    Ok(())
                } else {
                    Err("the text is unchanged".into())
                }
            }
            Self::BalancedDelimiters => balanced(ctx.after.unwrap_or(ctx.before).as_str()),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// What a condition is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    pub diagnostic: &'a Diagnostic,
    pub fix: &'a Fix,
    /// Snapshot taken before any edit.
    pub before: &'a TextBuffer,
    /// Text re-read after the edit; `None` while checking pre-conditions.
    pub after: Option<&'a TextBuffer>,
}

impl<'a> ConditionContext<'a> {
    fn after(&self) -> Result<&'a TextBuffer, String> {
        self.after
            .ok_or_else(|| "can only be checked after the edit".to_string())
    }
}

/// The first condition that did not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionFailure {
    pub condition: String,
    pub reason: String,
}

impl fmt::Display for ConditionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "condition '{}' failed: {}", self.condition, self.reason)
    }
}

/// Evaluate every condition in order, stopping at the first failure.
pub fn evaluate(conditions: &[String], ctx: &ConditionContext<'_>) -> Result<(), ConditionFailure> {
    for text in conditions {
        let outcome = match Condition::lookup(text) {
            Some(condition) => condition.check(ctx),
            None => Err("cannot verify condition automatically".to_string()),
        };
        outcome.map_err(|reason| ConditionFailure {
            condition: text.clone(),
            reason,
        })?;
    }
    Ok(())
}

/// Whether every condition in the list has a registered predicate.
pub fn all_recognised(conditions: &[String]) -> bool {
    conditions.iter().all(|c| Condition::lookup(c).is_some())
}

fn import_lines(fix: &Fix) -> Vec<&str> {
    fix.changes
        .iter()
        .map(|c| c.new_text.trim())
        .filter(|t| t.starts_with("import "))
        .collect()
}

fn inserted_text_present(fix: &Fix, after: &TextBuffer) -> Result<(), String> {
    let mut changes: Vec<_> = fix.changes.iter().collect();
    changes.sort_by_key(|c| (c.span.start, c.span.length));

    let text = after.as_str();
    let mut shift: isize = 0;
    for change in changes {
        let start = change.span.start as isize + shift;
        let end = start + change.new_text.len() as isize;
        let found = usize::try_from(start)
            .ok()
            .zip(usize::try_from(end).ok())
            .and_then(|(s, e)| text.get(s..e));
        if found != Some(change.new_text.as_str()) {
            return Err(format!(
                "'{}' not found at offset {start}",
                change.new_text.escape_debug()
            ));
        }
        shift += change.new_text.len() as isize - change.span.length as isize;
    }
    Ok(())
}

/// Bracket balance, ignoring string literals and line comments.
fn balanced(text: &str) -> Result<(), String> {
    let mut stack = Vec::new();
    let mut chars = text.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            match c {
                '\\' => {
                    chars.next();
                }
                _ if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            '(' | '[' | '{' => stack.push(c),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(expected) {
                    return Err(format!("unmatched '{c}'"));
                }
            }
            _ => {}
        }
    }
    match stack.last() {
        Some(open) => Err(format!("unclosed '{open}'")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{entities::text::TextChange, value_objects::FixType};

    fn fix(changes: Vec<TextChange>) -> Fix {
        Fix::builder("f", "fix")
            .fix_type(FixType::Automatic)
            .confidence(0.9)
            .changes(changes)
            .post_condition("buffer changed")
            .rollback_possible(true)
            .build()
            .unwrap()
    }

    fn diag() -> Diagnostic {
        Diagnostic::new("a.ts", 1, 1, 2304, "Cannot find name 'useState'.")
    }

    #[test]
    fn lookup_is_forgiving_about_case_and_spacing() {
        assert_eq!(
            Condition::lookup("  Import  statement present "),
            Some(Condition::ImportPresent)
        );
        assert_eq!(Condition::lookup("the code compiles"), None);
    }

    #[test]
    fn unknown_condition_fails_closed() {
        let before = TextBuffer::from("x");
        let f = fix(vec![TextChange::insert(0, "y")]);
        let d = diag();
        let ctx = ConditionContext {
            diagnostic: &d,
            fix: &f,
            before: &before,
            after: None,
        };
        let err = evaluate(&["tests pass".to_string()], &ctx).unwrap_err();
        assert!(err.reason.contains("cannot verify"));
    }

    #[test]
    fn import_conditions() {
        let line = "import { useState } from 'react';\n";
        let f = fix(vec![TextChange::insert(0, line)]);
        let d = diag();
        let before = TextBuffer::from("const [a] = useState(0);\n");
        let after = before.apply_batch(&f.changes).unwrap();

        let pre = ConditionContext {
            diagnostic: &d,
            fix: &f,
            before: &before,
            after: None,
        };
        assert!(evaluate(&["import not already present".into()], &pre).is_ok());

        let post = ConditionContext {
            after: Some(&after),
            ..pre
        };
        assert!(evaluate(&["import statement present".into()], &post).is_ok());

        let already = ConditionContext {
            before: &after,
            ..pre
        };
        assert!(evaluate(&["import not already present".into()], &already).is_err());
    }

    #[test]
    fn inserted_text_accounts_for_earlier_edits() {
        let f = fix(vec![TextChange::insert(0, "ab"), TextChange::insert(3, ";")]);
        let d = diag();
        let before = TextBuffer::from("let\n");
        let after = before.apply_batch(&f.changes).unwrap();
        assert_eq!(after.as_str(), "ablet;\n");
        let ctx = ConditionContext {
            diagnostic: &d,
            fix: &f,
            before: &before,
            after: Some(&after),
        };
        assert!(evaluate(&["inserted text present".into()], &ctx).is_ok());
        // The untouched snapshot does not contain the insertions.
        let ctx = ConditionContext {
            after: Some(&before),
            ..ctx
        };
        assert!(evaluate(&["inserted text present".into()], &ctx).is_err());
    }

    #[test]
    fn inserted_text_orders_same_offset_edits_like_the_buffer() {
        use crate::domain::entities::text::Span;

        let f = fix(vec![
            TextChange::replace(Span::new(4, 1), "yy"),
            TextChange::insert(4, "mut "),
        ]);
        let d = diag();
        let before = TextBuffer::from("let x = 1;\n");
        let after = before.apply_batch(&f.changes).unwrap();
        assert_eq!(after.as_str(), "let mut yy = 1;\n");
        let ctx = ConditionContext {
            diagnostic: &d,
            fix: &f,
            before: &before,
            after: Some(&after),
        };
        assert!(evaluate(&["inserted text present".into()], &ctx).is_ok());
    }

    #[test]
    fn recognised_lists_reject_unknown_phrases() {
        assert!(all_recognised(&["buffer changed".into(), "Balanced  delimiters".into()]));
        assert!(!all_recognised(&["buffer changed".into(), "tests pass".into()]));
        assert!(all_recognised(&[]));
    }

    #[test]
    fn post_conditions_need_the_edited_text() {
        let f = fix(vec![TextChange::insert(0, "x")]);
        let d = diag();
        let before = TextBuffer::from("y");
        let ctx = ConditionContext {
            diagnostic: &d,
            fix: &f,
            before: &before,
            after: None,
        };
        assert!(evaluate(&["buffer changed".into()], &ctx).is_err());
    }

    #[test]
    fn balanced_delimiters_skip_strings_and_comments() {
        assert!(balanced("f(a, [1, 2], { b: ')' }) // (").is_ok());
        assert!(balanced("f(a").is_err());
        assert!(balanced("f)").is_err());
    }

    #[test]
    fn target_position_must_exist() {
        let f = fix(vec![TextChange::insert(0, "x")]);
        let d = Diagnostic::new("a.ts", 9, 1, 1005, "';' expected.");
        let before = TextBuffer::from("one line\n");
        let ctx = ConditionContext {
            diagnostic: &d,
            fix: &f,
            before: &before,
            after: None,
        };
        assert!(evaluate(&["target position exists".into()], &ctx).is_err());
    }
}
