//! Ranked fix suggestions.
//!
//! Candidates come from the rule book, are blended with knowledge-base
//! history, and are topped up with solutions users reported as working.
//! Output is deterministic for a given input and knowledge-base state.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    application::ports::{KnowledgeStore, SourceEditor},
    domain::{
        BlendPolicy, Diagnostic, DomainValidator as validator, ErrorClassifier, Fix, FixType,
        KnowledgeBaseEntry, RuleBook, TextBuffer, catalog, rank,
    },
    error::MendResult,
};

/// Id of the fallback suggested when no rule recognises a diagnostic.
pub const GENERIC_FIX_ID: &str = "generic-investigate";

/// Confidence of the generic fallback.
pub const GENERIC_FIX_CONFIDENCE: f64 = 0.3;

/// How many learned solutions are offered alongside rule-based fixes.
const LEARNED_LIMIT: usize = 3;

/// Learned solutions start slightly below their observed success rate.
const LEARNED_DISCOUNT: f64 = 0.9;

pub struct SuggestionService {
    store: Arc<dyn KnowledgeStore>,
    rules: Arc<RuleBook>,
    editor: Option<Arc<dyn SourceEditor>>,
    blend: BlendPolicy,
}

impl SuggestionService {
    pub fn new(store: Arc<dyn KnowledgeStore>, rules: Arc<RuleBook>) -> Self {
        Self {
            store,
            rules,
            editor: None,
            blend: BlendPolicy::default(),
        }
    }

    /// Resolve edits against the current file text.
    pub fn with_sources(mut self, editor: Arc<dyn SourceEditor>) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn with_blend(mut self, blend: BlendPolicy) -> Self {
        self.blend = blend;
        self
    }

    /// Ranked fixes for `diagnostic`, never empty.
    #[instrument(skip_all, fields(diagnostic = %diagnostic))]
    pub fn suggest_fixes(&self, diagnostic: &Diagnostic) -> MendResult<Vec<Fix>> {
        validator::validate_diagnostic(diagnostic)?;
        let normalized = ErrorClassifier::normalize(diagnostic);
        let source = self.source_for(&normalized);

        let mut fixes = self.rules.matching_fixes(&normalized, source.as_ref())?;
        let matched = !fixes.is_empty();

        if let Some(entry) = self.store.get(&normalized.signature())? {
            fixes = fixes
                .into_iter()
                .map(|fix| {
                    let blended = self.blend.blend(fix.confidence, &entry);
                    fix.with_confidence(blended)
                })
                .collect();
            fixes.extend(self.learned_fixes(&normalized, &entry, &fixes)?);
        }

        if !matched {
            fixes.push(generic_fix(&normalized)?);
        }

        rank(&mut fixes);
        debug!(
            fixes = fixes.len(),
            top = fixes.first().map_or("", |f| f.id.as_str()),
            "Fixes suggested"
        );
        Ok(fixes)
    }

    fn source_for(&self, diagnostic: &Diagnostic) -> Option<TextBuffer> {
        let editor = self.editor.as_ref()?;
        if !self.rules.needs_source(diagnostic) {
            return None;
        }
        match editor.read(diagnostic.file()) {
            Ok(buffer) => Some(buffer),
            Err(e) => {
                debug!(
                    file = %diagnostic.file().display(),
                    error = %e,
                    "Source unavailable, edits left unresolved"
                );
                None
            }
        }
    }

    fn learned_fixes(
        &self,
        diagnostic: &Diagnostic,
        entry: &KnowledgeBaseEntry,
        existing: &[Fix],
    ) -> MendResult<Vec<Fix>> {
        let mut learned = Vec::new();
        for (idx, solution) in entry
            .successful_solutions()
            .into_iter()
            .filter(|s| {
                !existing
                    .iter()
                    .any(|f| f.description.eq_ignore_ascii_case(s.solution.trim()))
            })
            .take(LEARNED_LIMIT)
            .enumerate()
        {
            let base = solution.smoothed_success_rate() * LEARNED_DISCOUNT;
            let fix = Fix::builder(
                format!("{}-learned-{}", diagnostic.code, idx + 1),
                solution.solution.clone(),
            )
            .fix_type(FixType::SemiAutomatic)
            .confidence(self.blend.blend(base, entry))
            .category(diagnostic.category)
            .post_condition(catalog::RECHECK)
            .build()?;
            learned.push(fix);
        }
        Ok(learned)
    }
}

fn generic_fix(diagnostic: &Diagnostic) -> MendResult<Fix> {
    Ok(Fix::builder(GENERIC_FIX_ID, "Investigate and fix manually")
        .fix_type(FixType::Manual)
        .confidence(GENERIC_FIX_CONFIDENCE)
        .category(diagnostic.category)
        .post_condition(catalog::RECHECK)
        .build()?)
}
