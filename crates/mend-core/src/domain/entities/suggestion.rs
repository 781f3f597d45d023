//! The external-facing suggestion bundle.

use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::{analysis::ErrorAnalysis, diagnostic::Signature, fix::Fix},
    value_objects::ResourceKind,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningResource {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    /// Within `0.0..=1.0`.
    pub relevance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveErrorSuggestion {
    pub analysis: ErrorAnalysis,
    pub fixes: Vec<Fix>,
    pub similar_errors: Vec<Signature>,
    pub prevention_tips: Vec<String>,
    pub learning_resources: Vec<LearningResource>,
}

impl ComprehensiveErrorSuggestion {
    /// Highest-confidence fix; `fixes` is never empty for engine output.
    pub fn top_fix(&self) -> Option<&Fix> {
        self.fixes.first()
    }
}
