//! Root-cause analysis.
//!
//! Read-only against the knowledge base: history only tunes the time
//! estimate and complexity, it is never written here.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    application::ports::KnowledgeStore,
    domain::{
        Diagnostic, DomainValidator as validator, ErrorAnalysis, ErrorClassifier, FixComplexity,
        ImpactLevel, KnowledgeBaseEntry, Severity, Signature, catalog,
    },
    error::MendResult,
};

/// Default distance, in lines, within which findings count as related.
pub const DEFAULT_RELATED_LINE_WINDOW: u32 = 10;

pub struct AnalysisService {
    store: Arc<dyn KnowledgeStore>,
    line_window: u32,
}

impl AnalysisService {
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self {
            store,
            line_window: DEFAULT_RELATED_LINE_WINDOW,
        }
    }

    pub fn with_line_window(mut self, line_window: u32) -> Self {
        self.line_window = line_window;
        self
    }

    /// Analyze one diagnostic without batch context.
    pub fn analyze(&self, diagnostic: &Diagnostic) -> MendResult<ErrorAnalysis> {
        self.analyze_in_batch(diagnostic, &[])
    }

    /// Analyze `diagnostic`, looking for related findings in `batch`.
    #[instrument(skip_all, fields(diagnostic = %diagnostic))]
    pub fn analyze_in_batch(
        &self,
        diagnostic: &Diagnostic,
        batch: &[Diagnostic],
    ) -> MendResult<ErrorAnalysis> {
        validator::validate_diagnostic(diagnostic)?;
        let normalized = ErrorClassifier::normalize(diagnostic);
        let def = catalog::category_def(normalized.category);

        let template = catalog::code_def(normalized.code)
            .and_then(|code| code.root_cause)
            .unwrap_or(def.root_cause);
        let root_cause = format!("{template}: {}", normalized.message.trim());

        let impact_level = match normalized.severity {
            Severity::Error => def.impact,
            Severity::Warning => def.impact.lowered(),
            Severity::Info => ImpactLevel::Low,
        };

        let entry = self.store.get(&normalized.signature())?;
        let history = entry.as_ref().filter(|e| e.has_history());
        let (estimated_fix_time, fix_complexity) = match history {
            Some(entry) => estimate_from_history(entry, def.default_fix_minutes, def.complexity),
            None => (def.default_fix_minutes, def.complexity),
        };

        let related_errors = self.related(&normalized, diagnostic, batch);
        debug!(
            category = %normalized.category,
            related = related_errors.len(),
            "Diagnostic analyzed"
        );

        Ok(ErrorAnalysis {
            error: normalized,
            root_cause,
            impact_level,
            fix_complexity,
            estimated_fix_time,
            related_errors,
            prerequisites: def.prerequisites.iter().map(|p| p.to_string()).collect(),
        })
    }

    fn related(
        &self,
        normalized: &Diagnostic,
        original: &Diagnostic,
        batch: &[Diagnostic],
    ) -> Vec<Signature> {
        let own = normalized.signature();
        let mut candidates: Vec<Diagnostic> = batch
            .iter()
            .filter(|other| *other != original && other.file == normalized.file)
            .filter(|other| other.line.abs_diff(normalized.line) <= self.line_window)
            .map(ErrorClassifier::normalize)
            .filter(|other| catalog::co_occurs(normalized.category, other.category))
            .collect();
        candidates.sort_by_key(|d| (d.line, d.column));

        let mut related: Vec<Signature> = Vec::new();
        for signature in candidates.iter().map(Diagnostic::signature) {
            if signature != own && !related.contains(&signature) {
                related.push(signature);
            }
        }
        related
    }
}

fn estimate_from_history(
    entry: &KnowledgeBaseEntry,
    default_minutes: u32,
    complexity: FixComplexity,
) -> (u32, FixComplexity) {
    let average = entry.average_time_to_resolve;
    let minutes = (average.ceil() as u32).max(1);
    let complexity = if average > 3.0 * f64::from(default_minutes) {
        complexity.raised()
    } else {
        complexity
    };
    (minutes, complexity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockKnowledgeStore;
    use crate::domain::{ErrorCategory, Resolution};
    use chrono::Utc;

    fn empty_store() -> Arc<dyn KnowledgeStore> {
        let mut store = MockKnowledgeStore::new();
        store.expect_get().returning(|_| Ok(None));
        Arc::new(store)
    }

    fn diag(line: u32, code: u32, message: &str) -> Diagnostic {
        Diagnostic::new("src/app.tsx", line, 3, code, message)
    }

    #[test]
    fn analysis_is_complete_for_unknown_codes() {
        let service = AnalysisService::new(empty_store());
        let analysis = service.analyze(&diag(4, 9999, "Something strange.")).unwrap();
        assert!(!analysis.root_cause.is_empty());
        assert!(analysis.estimated_fix_time > 0);
        assert_eq!(analysis.error.category, ErrorCategory::GenericError);
        assert_eq!(analysis.estimated_fix_time, 10);
        assert!(!analysis.prerequisites.is_empty());
    }

    #[test]
    fn known_code_uses_its_specialised_root_cause() {
        let service = AnalysisService::new(empty_store());
        let analysis = service
            .analyze(&diag(1, 2304, "Cannot find name 'useState'."))
            .unwrap();
        assert!(analysis.root_cause.contains("imported or declared"));
        assert!(analysis.root_cause.contains("useState"));
        assert_eq!(analysis.estimated_fix_time, 3);
    }

    #[test]
    fn severity_lowers_impact() {
        let service = AnalysisService::new(empty_store());
        let d = diag(1, 2322, "Type 'string' is not assignable to type 'number'.");
        let error = service.analyze(&d).unwrap().impact_level;
        let warning = service
            .analyze(&d.clone().with_severity(Severity::Warning))
            .unwrap()
            .impact_level;
        let info = service
            .analyze(&d.with_severity(Severity::Info))
            .unwrap()
            .impact_level;
        assert_eq!(error, ImpactLevel::High);
        assert_eq!(warning, ImpactLevel::Medium);
        assert_eq!(info, ImpactLevel::Low);
    }

    #[test]
    fn history_drives_estimate_and_complexity() {
        let signature = Signature::new(2304, ErrorCategory::ImportError);
        let mut entry = KnowledgeBaseEntry::new(signature, Utc::now());
        entry.record(&Resolution::new(2304, "import", true).with_time(20), Utc::now());

        let mut store = MockKnowledgeStore::new();
        store
            .expect_get()
            .returning(move |_| Ok(Some(entry.clone())));
        let service = AnalysisService::new(Arc::new(store));
        let analysis = service
            .analyze(&diag(1, 2304, "Cannot find name 'x'."))
            .unwrap();
        assert_eq!(analysis.estimated_fix_time, 20);
        assert_eq!(analysis.fix_complexity, FixComplexity::Moderate);
    }

    #[test]
    fn related_errors_respect_file_window_and_category() {
        let service = AnalysisService::new(empty_store()).with_line_window(5);
        let target = diag(10, 2304, "Cannot find name 'useState'.");
        let batch = vec![
            target.clone(),
            diag(12, 2322, "Type 'string' is not assignable to type 'number'."),
            diag(9, 2307, "Cannot find module './x'."),
            diag(30, 2345, "Argument mismatch."),
            diag(11, 1005, "';' expected."),
            Diagnostic::new("src/other.ts", 10, 1, 2322, "Type mismatch."),
            diag(13, 2322, "Another mismatch."),
        ];
        let analysis = service.analyze_in_batch(&target, &batch).unwrap();
        let related: Vec<String> = analysis
            .related_errors
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(related, ["TS2307:IMPORT_ERROR", "TS2322:TYPE_ERROR"]);
    }

    #[test]
    fn invalid_diagnostic_fails_fast() {
        let service = AnalysisService::new(empty_store());
        assert!(service.analyze(&diag(0, 2304, "x")).is_err());
    }
}
