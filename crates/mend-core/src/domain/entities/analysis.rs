//! Root-cause analysis of a single diagnostic.

use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::diagnostic::{Diagnostic, Signature},
    value_objects::{FixComplexity, ImpactLevel},
};

/// Derived analysis; created fresh per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorAnalysis {
    pub error: Diagnostic,
    pub root_cause: String,
    pub impact_level: ImpactLevel,
    pub fix_complexity: FixComplexity,
    /// Minutes, always positive.
    pub estimated_fix_time: u32,
    pub related_errors: Vec<Signature>,
    pub prerequisites: Vec<String>,
}
