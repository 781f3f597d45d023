//! TOML rule-pack loader.
//!
//! Rule packs extend the built-in catalog with project-specific fixes.
//!
//! # File format
//!
//! ```toml
//! [[rule]]
//! id              = "await-async-call"
//! codes           = [1308]
//! category        = "syntax"             # optional; short or canonical name
//! message_pattern = "'await' expressions" # optional regex over the message
//! description     = "Mark the enclosing function async"
//! fix_type        = "manual"             # automatic | semi-automatic | manual
//! confidence      = 0.6
//! post_conditions = ["diagnostic no longer reported"]
//!
//! # Optional change set; `text` may use `${1}` message captures.
//! edit = { kind = "insert-at-position", text = "async " }
//! ```
//!
//! Edit kinds: `none`, `insert-at-start`, `insert-at-position`,
//! `insert-after-token`, `delete-line`, `insert-import`.
//!
//! A pack is all-or-nothing: one invalid rule rejects the file, and a
//! directory load fails on the first bad file.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use mend_core::{
    domain::{DomainValidator, EditKind, ErrorCategory, FixType, PatternRule, RuleBook},
    error::{MendError, MendResult},
};

/// Failures while loading rule packs.
#[derive(Debug, Error)]
pub enum RulePackError {
    #[error("rule pack not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read rule pack {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rule pack {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("invalid rule '{rule_id}' in {path}: {reason}")]
    InvalidRule {
        path: PathBuf,
        rule_id: String,
        reason: String,
    },
}

impl From<RulePackError> for MendError {
    fn from(e: RulePackError) -> Self {
        MendError::Configuration {
            message: e.to_string(),
        }
    }
}

// ── Manifest types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackManifest {
    #[serde(default)]
    rule: Vec<RuleEntry>,
}

/// One `[[rule]]` table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleEntry {
    id: String,
    #[serde(default)]
    codes: Vec<u32>,
    category: Option<String>,
    message_pattern: Option<String>,
    description: String,
    fix_type: String,
    confidence: f64,
    edit: Option<EditEntry>,
    #[serde(default)]
    pre_conditions: Vec<String>,
    #[serde(default)]
    post_conditions: Vec<String>,
    #[serde(default)]
    side_effects: Vec<String>,
    #[serde(default)]
    rollback_possible: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EditEntry {
    kind: String,
    text: Option<String>,
}

impl EditEntry {
    fn into_edit(self) -> Result<EditKind, String> {
        let text = |kind: &str, text: Option<String>| {
            text.ok_or_else(|| format!("edit kind '{kind}' requires `text`"))
        };
        match self.kind.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "none" => Ok(EditKind::None),
            "insert-at-start" => Ok(EditKind::InsertAtStart(text(&self.kind, self.text)?)),
            "insert-at-position" => Ok(EditKind::InsertAtPosition(text(&self.kind, self.text)?)),
            "insert-after-token" => Ok(EditKind::InsertAfterToken(text(&self.kind, self.text)?)),
            "delete-line" => Ok(EditKind::DeleteLine),
            "insert-import" => Ok(EditKind::InsertImport),
            other => Err(format!("unknown edit kind '{other}'")),
        }
    }
}

impl RuleEntry {
    fn into_rule(self) -> Result<PatternRule, String> {
        let category = self
            .category
            .as_deref()
            .map(str::parse::<ErrorCategory>)
            .transpose()
            .map_err(|e| e.to_string())?;
        let fix_type = self
            .fix_type
            .parse::<FixType>()
            .map_err(|e| e.to_string())?;
        if let Some(pattern) = &self.message_pattern {
            Regex::new(pattern).map_err(|e| format!("message_pattern does not compile: {e}"))?;
        }
        let edit = match self.edit {
            Some(edit) => edit.into_edit()?,
            None => EditKind::None,
        };

        let rule = PatternRule {
            id: self.id,
            codes: self.codes,
            category,
            message_pattern: self.message_pattern,
            description: self.description,
            fix_type,
            confidence: self.confidence,
            edit,
            pre_conditions: self.pre_conditions,
            post_conditions: self.post_conditions,
            side_effects: self.side_effects,
            rollback_possible: self.rollback_possible,
        };
        DomainValidator::validate_rule(&rule).map_err(|e| e.to_string())?;
        Ok(rule)
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads [`PatternRule`]s from TOML files or directories of `*.toml` files.
pub struct RulePackLoader {
    paths: Vec<PathBuf>,
}

impl RulePackLoader {
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Load every configured pack, in configuration order (directories in
    /// path order). Rule ids must be unique across all packs.
    #[instrument(skip(self), fields(paths = self.paths.len()))]
    pub fn load_all(&self) -> Result<Vec<PatternRule>, RulePackError> {
        let mut rules = Vec::new();
        let mut seen = HashSet::new();

        for path in &self.paths {
            for file in pack_files(path)? {
                for rule in load_file(&file)? {
                    if !seen.insert(rule.id.clone()) {
                        return Err(RulePackError::InvalidRule {
                            path: file,
                            rule_id: rule.id,
                            reason: "duplicate rule id".into(),
                        });
                    }
                    rules.push(rule);
                }
            }
        }

        info!(count = rules.len(), "Rule packs loaded");
        Ok(rules)
    }

    /// Append every configured pack to `book`, after its existing rules.
    pub fn extend(&self, book: &mut RuleBook) -> MendResult<usize> {
        let rules = self.load_all()?;
        let count = rules.len();
        book.extend(rules)?;
        Ok(count)
    }
}

fn pack_files(path: &Path) -> Result<Vec<PathBuf>, RulePackError> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(RulePackError::NotFound(path.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).min_depth(1) {
        let entry = entry.map_err(|e| RulePackError::Parse {
            path: path.to_path_buf(),
            reason: format!("directory walk error: {e}"),
        })?;
        let is_toml = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if entry.file_type().is_file() && is_toml {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Load one pack file.
#[instrument(skip(path), fields(file = %path.display()))]
pub fn load_file(path: &Path) -> Result<Vec<PatternRule>, RulePackError> {
    let raw = fs::read_to_string(path).map_err(|source| RulePackError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest: PackManifest = toml::from_str(&raw).map_err(|e| RulePackError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut rules = Vec::with_capacity(manifest.rule.len());
    for entry in manifest.rule {
        let rule_id = entry.id.clone();
        let rule = entry
            .into_rule()
            .map_err(|reason| RulePackError::InvalidRule {
                path: path.to_path_buf(),
                rule_id,
                reason,
            })?;
        rules.push(rule);
    }
    debug!(count = rules.len(), "loaded rule pack");
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mend_core::domain::{Diagnostic, ErrorClassifier};
    use tempfile::TempDir;

    const PACK: &str = r#"
[[rule]]
id = "await-in-async"
codes = [1308]
category = "syntax"
message_pattern = "'await' expressions"
description = "Mark the enclosing function async"
fix_type = "manual"
confidence = 0.6
post_conditions = ["diagnostic no longer reported"]

[[rule]]
id = "semicolon-at-cursor"
codes = [1005]
message_pattern = "'(;)' expected"
description = "Insert '${1}'"
fix_type = "automatic"
confidence = 0.8
edit = { kind = "insert-at-position", text = "${1}" }
pre_conditions = ["target position exists"]
post_conditions = ["inserted text present"]
rollback_possible = true
"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_rules_with_edits() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "pack.toml", PACK);
        let rules = load_file(&path).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].category, Some(ErrorCategory::SyntaxError));
        assert_eq!(rules[0].fix_type, FixType::Manual);
        assert_eq!(rules[1].edit, EditKind::InsertAtPosition("${1}".into()));
        assert!(rules[1].rollback_possible);
    }

    #[test]
    fn invalid_regex_rejects_the_pack() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "bad.toml",
            &PACK.replace("'await' expressions", "(unclosed"),
        );
        let err = load_file(&path).unwrap_err();
        assert!(matches!(
            err,
            RulePackError::InvalidRule { ref rule_id, .. } if rule_id == "await-in-async"
        ));
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.toml", &PACK.replace("0.6", "1.5"));
        assert!(matches!(
            load_file(&path),
            Err(RulePackError::InvalidRule { .. })
        ));
    }

    #[test]
    fn missing_post_conditions_are_rejected() {
        let dir = TempDir::new().unwrap();
        let pack = r#"
[[rule]]
id = "nothing-checked"
codes = [2322]
description = "Convert the value"
fix_type = "manual"
confidence = 0.5
"#;
        let path = write(&dir, "bad.toml", pack);
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn automatic_rule_with_unverifiable_postcondition_is_rejected() {
        let dir = TempDir::new().unwrap();
        let pack = PACK.replace(
            r#"post_conditions = ["inserted text present"]"#,
            r#"post_conditions = ["the build passes"]"#,
        );
        let path = write(&dir, "bad.toml", &pack);
        assert!(matches!(
            load_file(&path),
            Err(RulePackError::InvalidRule { ref rule_id, .. }) if rule_id == "semicolon-at-cursor"
        ));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "typo.toml", &PACK.replace("fix_type", "fixtype"));
        assert!(matches!(load_file(&path), Err(RulePackError::Parse { .. })));
    }

    #[test]
    fn directories_load_in_path_order_and_ids_stay_unique() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b/second.toml", PACK);
        write(&dir, "a/first.toml", PACK);
        let err = RulePackLoader::new([dir.path()]).load_all().unwrap_err();
        assert!(matches!(
            err,
            RulePackError::InvalidRule { ref reason, .. } if reason == "duplicate rule id"
        ));
    }

    #[test]
    fn missing_path_is_not_found() {
        let loader = RulePackLoader::new(["/definitely/not/here.toml"]);
        assert!(matches!(loader.load_all(), Err(RulePackError::NotFound(_))));
    }

    #[test]
    fn loaded_rules_extend_the_builtin_book() {
        let dir = TempDir::new().unwrap();
        write(&dir, "pack.toml", PACK);
        let mut book = RuleBook::builtin().unwrap();
        let before = book.len();
        let added = RulePackLoader::new([dir.path()]).extend(&mut book).unwrap();
        assert_eq!(added, 2);
        assert_eq!(book.len(), before + 2);

        let d = ErrorClassifier::normalize(&Diagnostic::new(
            "a.ts",
            1,
            1,
            1308,
            "'await' expressions are only allowed within async functions.",
        ));
        let fixes = book.matching_fixes(&d, None).unwrap();
        assert!(fixes.iter().any(|f| f.id == "1308-await-in-async"));
    }
}
