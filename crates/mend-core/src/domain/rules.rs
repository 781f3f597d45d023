//! Fix pattern rules and the rule book that matches them against diagnostics.
//!
//! A rule is data: which diagnostics it recognises (code list, category,
//! message regex) and the fix template it yields. Regex captures fill `${1}`
//! style placeholders in the description and in edit text.

use std::collections::HashSet;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::domain::{
    catalog, conditions,
    entities::{
        diagnostic::Diagnostic,
        fix::{Fix, FixBuilder},
        text::{TextBuffer, TextChange},
    },
    error::DomainError,
    value_objects::{ErrorCategory, FixType},
};

/// The change a rule makes, resolved against the file text at suggestion
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "kebab-case")]
pub enum EditKind {
    /// Guidance only; no change set.
    None,
    InsertAtStart(String),
    /// Insert at the diagnostic's line/column.
    InsertAtPosition(String),
    /// Insert right after the identifier starting at the diagnostic position.
    InsertAfterToken(String),
    /// Remove the diagnostic's whole line.
    DeleteLine,
    /// `import { <capture 1> } from '<module>';` for well-known exports.
    InsertImport,
}

impl EditKind {
    pub fn needs_source(&self) -> bool {
        matches!(
            self,
            Self::InsertAtPosition(_) | Self::InsertAfterToken(_) | Self::DeleteLine
        )
    }

    /// Compute the change set. Returns an empty set when the edit cannot be
    /// located (no source text, position past the end, unknown module).
    pub fn resolve(
        &self,
        diagnostic: &Diagnostic,
        captures: Option<&Captures<'_>>,
        source: Option<&TextBuffer>,
    ) -> Vec<TextChange> {
        match self {
            Self::None => Vec::new(),
            Self::InsertAtStart(text) => vec![TextChange::insert(0, expand(text, captures))],
            Self::InsertImport => {
                let Some(symbol) = captures.and_then(|c| c.get(1)).map(|m| m.as_str()) else {
                    return Vec::new();
                };
                match catalog::module_for(symbol) {
                    Some(module) => vec![TextChange::insert(0, import_line(symbol, module))],
                    None => Vec::new(),
                }
            }
            Self::InsertAtPosition(text) => source
                .and_then(|buf| buf.offset_of(diagnostic.line, diagnostic.column))
                .map(|offset| vec![TextChange::insert(offset, expand(text, captures))])
                .unwrap_or_default(),
            Self::InsertAfterToken(text) => source
                .and_then(|buf| {
                    let start = buf.offset_of(diagnostic.line, diagnostic.column)?;
                    let end = buf.token_end(start)?;
                    (end > start).then_some(end)
                })
                .map(|offset| vec![TextChange::insert(offset, expand(text, captures))])
                .unwrap_or_default(),
            Self::DeleteLine => source
                .and_then(|buf| buf.line_span(diagnostic.line))
                .filter(|span| span.length > 0)
                .map(|span| vec![TextChange::delete(span)])
                .unwrap_or_default(),
        }
    }
}

/// Canonical import statement inserted by [`EditKind::InsertImport`].
pub fn import_line(symbol: &str, module: &str) -> String {
    format!("import {{ {symbol} }} from '{module}';\n")
}

fn expand(template: &str, captures: Option<&Captures<'_>>) -> String {
    match captures {
        Some(caps) => {
            let mut out = String::new();
            caps.expand(template, &mut out);
            out
        }
        None => template.to_string(),
    }
}

/// A fix pattern rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRule {
    pub id: String,
    /// Diagnostic codes this rule applies to; empty means any code.
    #[serde(default)]
    pub codes: Vec<u32>,
    #[serde(default)]
    pub category: Option<ErrorCategory>,
    /// Regex matched against the diagnostic message.
    #[serde(default)]
    pub message_pattern: Option<String>,
    pub description: String,
    pub fix_type: FixType,
    /// Base confidence before any knowledge-base blending.
    pub confidence: f64,
    #[serde(default = "no_edit")]
    pub edit: EditKind,
    #[serde(default)]
    pub pre_conditions: Vec<String>,
    pub post_conditions: Vec<String>,
    #[serde(default)]
    pub side_effects: Vec<String>,
    #[serde(default)]
    pub rollback_possible: bool,
}

fn no_edit() -> EditKind {
    EditKind::None
}

impl PatternRule {
    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |reason: String| DomainError::InvalidRule {
            rule_id: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty".into()));
        }
        if self.description.trim().is_empty() {
            return Err(invalid("description must not be empty".into()));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(invalid(format!(
                "confidence {} is outside 0.0..=1.0",
                self.confidence
            )));
        }
        if self.post_conditions.is_empty() {
            return Err(invalid("at least one post-condition is required".into()));
        }
        if self.codes.is_empty() && self.category.is_none() && self.message_pattern.is_none() {
            return Err(invalid(
                "a rule must name codes, a category, or a message pattern".into(),
            ));
        }
        if self.fix_type == FixType::Automatic
            && !(conditions::all_recognised(&self.pre_conditions)
                && conditions::all_recognised(&self.post_conditions))
        {
            return Err(invalid(
                "automatic rules may only use conditions that can be checked".into(),
            ));
        }
        if self.edit == EditKind::InsertImport && self.message_pattern.is_none() {
            return Err(invalid(
                "insert-import edits need a message pattern capturing the symbol".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: PatternRule,
    regex: Option<Regex>,
}

impl CompiledRule {
    /// `None` when the rule does not apply, otherwise the message captures
    /// (if the rule has a pattern).
    fn recognise<'m>(&self, diagnostic: &'m Diagnostic) -> Option<Option<Captures<'m>>> {
        if !self.rule.codes.is_empty() && !self.rule.codes.contains(&diagnostic.code) {
            return None;
        }
        if self.rule.category.is_some_and(|c| c != diagnostic.category) {
            return None;
        }
        match &self.regex {
            Some(regex) => regex.captures(&diagnostic.message).map(Some),
            None => Some(None),
        }
    }
}

/// Validated, compiled set of rules in priority order.
#[derive(Debug, Clone)]
pub struct RuleBook {
    rules: Vec<CompiledRule>,
}

impl RuleBook {
    /// The built-in catalog.
    pub fn builtin() -> Result<Self, DomainError> {
        Self::with_rules(catalog::builtin_rules())
    }

    pub fn with_rules(rules: Vec<PatternRule>) -> Result<Self, DomainError> {
        let mut book = Self { rules: Vec::new() };
        book.extend(rules)?;
        Ok(book)
    }

    /// Append rules after the existing ones. Ids must stay unique.
    pub fn extend(&mut self, rules: Vec<PatternRule>) -> Result<(), DomainError> {
        let mut seen: HashSet<String> = self.rules.iter().map(|r| r.rule.id.clone()).collect();

        for rule in rules {
            rule.validate()?;
            if !seen.insert(rule.id.clone()) {
                return Err(DomainError::InvalidRule {
                    rule_id: rule.id,
                    reason: "duplicate rule id".into(),
                });
            }
            let regex = rule
                .message_pattern
                .as_deref()
                .map(Regex::new)
                .transpose()
                .map_err(|e| DomainError::InvalidRule {
                    rule_id: rule.id.clone(),
                    reason: format!("invalid message pattern: {e}"),
                })?;
            self.rules.push(CompiledRule { rule, regex });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether any rule recognising `diagnostic` edits relative to the
    /// source text.
    pub fn needs_source(&self, diagnostic: &Diagnostic) -> bool {
        self.rules
            .iter()
            .any(|c| c.rule.edit.needs_source() && c.recognise(diagnostic).is_some())
    }

    /// Instantiate a fix for every rule that recognises `diagnostic`, in
    /// rule order.
    pub fn matching_fixes(
        &self,
        diagnostic: &Diagnostic,
        source: Option<&TextBuffer>,
    ) -> Result<Vec<Fix>, DomainError> {
        let mut fixes = Vec::new();
        for compiled in &self.rules {
            let rule = &compiled.rule;
            let Some(captures) = compiled.recognise(diagnostic) else {
                continue;
            };

            let changes = rule.edit.resolve(diagnostic, captures.as_ref(), source);
            let mut builder = FixBuilder::new(
                format!("{}-{}", diagnostic.code, rule.id),
                expand(&rule.description, captures.as_ref()),
            )
            .fix_type(rule.fix_type)
            .confidence(rule.confidence)
            .category(diagnostic.category)
            .changes(changes)
            .rollback_possible(rule.rollback_possible);

            for condition in &rule.pre_conditions {
                builder = builder.pre_condition(condition.clone());
            }
            for condition in &rule.post_conditions {
                builder = builder.post_condition(condition.clone());
            }
            for effect in &rule.side_effects {
                builder = builder.side_effect(effect.clone());
            }
            fixes.push(builder.build()?);
        }
        Ok(fixes)
    }
}
