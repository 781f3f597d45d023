//! Bundles analysis, fixes, and guidance into one suggestion.

use crate::domain::{
    ComprehensiveErrorSuggestion, ErrorAnalysis, Fix, LearningResource, ResourceKind, Signature,
    catalog,
};

/// Relevance of the per-code reference page for codes in the catalog.
const KNOWN_CODE_RELEVANCE: f64 = 0.9;
const UNKNOWN_CODE_RELEVANCE: f64 = 0.5;

/// Stateless; everything it needs arrives as arguments.
pub struct SuggestionComposer;

impl SuggestionComposer {
    pub fn compose(
        analysis: ErrorAnalysis,
        fixes: Vec<Fix>,
        similar_errors: Vec<Signature>,
    ) -> ComprehensiveErrorSuggestion {
        let def = catalog::category_def(analysis.error.category);
        let prevention_tips = def.prevention_tips.iter().map(|t| t.to_string()).collect();
        let learning_resources = Self::resources(&analysis);

        ComprehensiveErrorSuggestion {
            analysis,
            fixes,
            similar_errors,
            prevention_tips,
            learning_resources,
        }
    }

    /// Category resources plus the code's reference page, most relevant
    /// first.
    pub fn resources(analysis: &ErrorAnalysis) -> Vec<LearningResource> {
        let code = analysis.error.code;
        let relevance = if catalog::code_def(code).is_some() {
            KNOWN_CODE_RELEVANCE
        } else {
            UNKNOWN_CODE_RELEVANCE
        };

        let mut resources: Vec<LearningResource> = catalog::category_def(analysis.error.category)
            .resources
            .iter()
            .map(|r| LearningResource {
                title: r.title.to_string(),
                url: r.url.to_string(),
                kind: r.kind,
                relevance: r.relevance.clamp(0.0, 1.0),
            })
            .collect();
        resources.push(LearningResource {
            title: format!("TS{code} explained"),
            url: catalog::code_reference_url(code),
            kind: ResourceKind::Reference,
            relevance,
        });
        resources.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Diagnostic, ErrorCategory, FixComplexity, ImpactLevel};

    fn analysis(code: u32, category: ErrorCategory) -> ErrorAnalysis {
        ErrorAnalysis {
            error: Diagnostic::new("a.ts", 1, 1, code, "msg").with_category(category),
            root_cause: "cause".into(),
            impact_level: ImpactLevel::High,
            fix_complexity: FixComplexity::Simple,
            estimated_fix_time: 3,
            related_errors: vec![],
            prerequisites: vec![],
        }
    }

    #[test]
    fn every_category_yields_tips_and_sorted_resources() {
        for category in ErrorCategory::ALL {
            let s = SuggestionComposer::compose(analysis(9999, category), vec![], vec![]);
            assert!(!s.prevention_tips.is_empty());
            assert!(s.prevention_tips.iter().all(|t| t.len() > 10));
            assert!(!s.learning_resources.is_empty());
            for pair in s.learning_resources.windows(2) {
                assert!(pair[0].relevance >= pair[1].relevance);
            }
            assert!(
                s.learning_resources
                    .iter()
                    .all(|r| (0.0..=1.0).contains(&r.relevance))
            );
        }
    }

    #[test]
    fn known_codes_rank_their_reference_first() {
        let resources = SuggestionComposer::resources(&analysis(2304, ErrorCategory::ImportError));
        assert_eq!(resources[0].url, "https://typescript.tv/errors/#ts2304");
    }
}
