//! `RecoveryEngine` facade.
//!
//! Wires every service over one shared knowledge store, rule book, and
//! (optionally) source editor. All methods take `&self`; the engine is
//! `Send + Sync` and can be shared across threads behind an `Arc`.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{DiagnosticSource, KnowledgeStore, SourceEditor},
        services::{
            AnalysisService, DEFAULT_RELATED_LINE_WINDOW, FixApplier, FixOutcome,
            KnowledgeStatistics, LearningService, SuggestionComposer, SuggestionService,
        },
    },
    domain::{
        BlendPolicy, ComprehensiveErrorSuggestion, Diagnostic, DomainValidator as validator,
        ErrorAnalysis, ErrorCategory, ErrorClassifier, Fix, KnowledgeBaseEntry, Resolution,
        RuleBook, Signature,
    },
    error::MendResult,
};

/// Tunables of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub blend: BlendPolicy,
    pub related_line_window: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            blend: BlendPolicy::default(),
            related_line_window: DEFAULT_RELATED_LINE_WINDOW,
        }
    }
}

pub struct RecoveryEngine {
    store: Arc<dyn KnowledgeStore>,
    analysis: AnalysisService,
    suggestions: SuggestionService,
    learning: LearningService,
    applier: Option<FixApplier>,
}

impl RecoveryEngine {
    pub fn new(store: Arc<dyn KnowledgeStore>, rules: RuleBook, settings: EngineSettings) -> Self {
        let rules = Arc::new(rules);
        Self {
            analysis: AnalysisService::new(Arc::clone(&store))
                .with_line_window(settings.related_line_window),
            suggestions: SuggestionService::new(Arc::clone(&store), rules)
                .with_blend(settings.blend),
            learning: LearningService::new(Arc::clone(&store)),
            applier: None,
            store,
        }
    }

    /// Resolve edits against real file text and enable fix application.
    pub fn with_editor(mut self, editor: Arc<dyn SourceEditor>) -> Self {
        self.suggestions = self.suggestions.with_sources(Arc::clone(&editor));
        self.applier = Some(FixApplier::new(editor));
        self
    }

    /// Load and validate diagnostics from `source`.
    #[instrument(skip_all, fields(input = %input.display()))]
    pub fn ingest(
        &self,
        source: &dyn DiagnosticSource,
        input: &Path,
    ) -> MendResult<Vec<Diagnostic>> {
        let diagnostics = source.diagnostics(input)?;
        for diagnostic in &diagnostics {
            validator::validate_diagnostic(diagnostic)?;
        }
        debug!(count = diagnostics.len(), "Diagnostics ingested");
        Ok(diagnostics)
    }

    pub fn classify(&self, diagnostic: &Diagnostic) -> ErrorCategory {
        ErrorClassifier::classify(diagnostic)
    }

    pub fn analyze_error(&self, diagnostic: &Diagnostic) -> MendResult<ErrorAnalysis> {
        self.analysis.analyze(diagnostic)
    }

    pub fn analyze_in_batch(
        &self,
        diagnostic: &Diagnostic,
        batch: &[Diagnostic],
    ) -> MendResult<ErrorAnalysis> {
        self.analysis.analyze_in_batch(diagnostic, batch)
    }

    pub fn suggest_fixes(&self, diagnostic: &Diagnostic) -> MendResult<Vec<Fix>> {
        self.suggestions.suggest_fixes(diagnostic)
    }

    pub fn apply_fix(&self, diagnostic: &Diagnostic, fix: &Fix) -> MendResult<FixOutcome> {
        self.applier()?.apply(diagnostic, fix)
    }

    /// The text `fix` would produce, without writing it.
    pub fn preview_fix(&self, diagnostic: &Diagnostic, fix: &Fix) -> MendResult<String> {
        Ok(self.applier()?.preview(diagnostic, fix)?.as_str().to_string())
    }

    pub fn learn_from_resolution(
        &self,
        diagnostic: &Diagnostic,
        resolution: &Resolution,
    ) -> MendResult<KnowledgeBaseEntry> {
        self.learning.learn_from_resolution(diagnostic, resolution)
    }

    /// Feed an applier outcome back into the knowledge base.
    pub fn record_outcome(
        &self,
        diagnostic: &Diagnostic,
        fix: &Fix,
        outcome: &FixOutcome,
    ) -> MendResult<KnowledgeBaseEntry> {
        self.learning
            .learn_from_resolution(diagnostic, &outcome.to_resolution(diagnostic, fix))
    }

    pub fn comprehensive_suggestions(
        &self,
        diagnostic: &Diagnostic,
    ) -> MendResult<ComprehensiveErrorSuggestion> {
        self.comprehensive_suggestions_in_batch(diagnostic, &[])
    }

    #[instrument(skip_all, fields(diagnostic = %diagnostic))]
    pub fn comprehensive_suggestions_in_batch(
        &self,
        diagnostic: &Diagnostic,
        batch: &[Diagnostic],
    ) -> MendResult<ComprehensiveErrorSuggestion> {
        let analysis = self.analysis.analyze_in_batch(diagnostic, batch)?;
        let fixes = self.suggestions.suggest_fixes(diagnostic)?;
        let similar = self.learning.similar_signatures(&analysis.error.signature())?;
        Ok(SuggestionComposer::compose(analysis, fixes, similar))
    }

    pub fn entry(&self, signature: &Signature) -> MendResult<Option<KnowledgeBaseEntry>> {
        self.learning.entry(signature)
    }

    pub fn similar_signatures(&self, signature: &Signature) -> MendResult<Vec<Signature>> {
        self.learning.similar_signatures(signature)
    }

    pub fn statistics(&self) -> MendResult<KnowledgeStatistics> {
        self.learning.statistics()
    }

    pub fn entries(&self) -> MendResult<Vec<KnowledgeBaseEntry>> {
        let mut entries = self.store.entries()?;
        entries.sort_by(|a, b| a.signature.cmp(&b.signature));
        Ok(entries)
    }

    pub fn flush(&self) -> MendResult<()> {
        self.store.flush()
    }

    fn applier(&self) -> MendResult<&FixApplier> {
        self.applier.as_ref().ok_or_else(|| {
            ApplicationError::AdapterNotConfigured {
                name: "source editor",
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockDiagnosticSource, MockKnowledgeStore};
    use crate::domain::ResourceKind;
    use crate::error::MendError;

    fn engine() -> RecoveryEngine {
        let mut store = MockKnowledgeStore::new();
        store.expect_get().returning(|_| Ok(None));
        store.expect_entries().returning(|| Ok(Vec::new()));
        RecoveryEngine::new(
            Arc::new(store),
            RuleBook::builtin().unwrap(),
            EngineSettings::default(),
        )
    }

    #[test]
    fn engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecoveryEngine>();
    }

    #[test]
    fn comprehensive_suggestion_is_complete() {
        let d = Diagnostic::new("src/App.tsx", 4, 9, 2304, "Cannot find name 'useState'.")
            .with_category(ErrorCategory::ImportError);
        let s = engine().comprehensive_suggestions(&d).unwrap();
        assert!(!s.fixes.is_empty());
        assert!(!s.prevention_tips.is_empty());
        assert!(!s.learning_resources.is_empty());
        assert!(
            s.learning_resources
                .iter()
                .any(|r| r.kind == ResourceKind::Reference)
        );
        assert!(s.top_fix().unwrap().description.contains("import"));
    }

    #[test]
    fn applying_without_an_editor_is_a_configuration_error() {
        let d = Diagnostic::new("a.ts", 1, 1, 2304, "Cannot find name 'useState'.");
        let fix = engine().suggest_fixes(&d).unwrap().remove(0);
        assert!(matches!(
            engine().apply_fix(&d, &fix),
            Err(MendError::Application(ApplicationError::AdapterNotConfigured { .. }))
        ));
    }

    #[test]
    fn ingest_rejects_invalid_records() {
        let mut source = MockDiagnosticSource::new();
        source
            .expect_diagnostics()
            .returning(|_| Ok(vec![Diagnostic::new("a.ts", 0, 1, 1005, "';' expected.")]));
        let result = engine().ingest(&source, Path::new("out.json"));
        assert!(matches!(result, Err(MendError::Domain(_))));
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: EngineSettings =
            serde_json::from_str(r#"{ "related_line_window": 3 }"#).unwrap();
        assert_eq!(settings.related_line_window, 3);
        assert_eq!(settings.blend, BlendPolicy::default());
    }
}
