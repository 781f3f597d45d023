//! Knowledge-base statistics and the confidence blend they drive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::{diagnostic::Signature, resolution::Resolution},
    value_objects::UserFeedback,
};

/// Smoothing factor of the confidence-adjustment moving average.
pub const ADJUSTMENT_ALPHA: f64 = 0.3;

/// How strongly the adjustment shifts the historical success rate.
const ADJUSTMENT_SCALE: f64 = 0.1;

/// One distinct solution observed for a signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedSolution {
    pub solution: String,
    #[serde(default)]
    pub pattern: String,
    pub attempts: u64,
    pub successes: u64,
    pub helpful: u64,
    pub not_helpful: u64,
}

impl LearnedSolution {
    fn new(solution: &str, pattern: &str) -> Self {
        Self {
            solution: solution.trim().to_string(),
            pattern: pattern.to_string(),
            attempts: 0,
            successes: 0,
            helpful: 0,
            not_helpful: 0,
        }
    }

    fn matches(&self, solution: &str) -> bool {
        self.solution.eq_ignore_ascii_case(solution.trim())
    }

    /// Laplace-smoothed success rate, so a single success is not 100%.
    pub fn smoothed_success_rate(&self) -> f64 {
        (self.successes as f64 + 1.0) / (self.attempts as f64 + 2.0)
    }
}

/// Append-only statistics for one signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseEntry {
    pub signature: Signature,
    pub observed_resolutions: u64,
    pub success_count: u64,
    /// Running mean, in minutes.
    pub average_time_to_resolve: f64,
    /// Exponentially weighted feedback signal in `[-1, 1]`.
    pub derived_confidence_adjustment: f64,
    #[serde(default)]
    pub learned_solutions: Vec<LearnedSolution>,
    pub last_updated: DateTime<Utc>,
}

impl KnowledgeBaseEntry {
    pub fn new(signature: Signature, now: DateTime<Utc>) -> Self {
        Self {
            signature,
            observed_resolutions: 0,
            success_count: 0,
            average_time_to_resolve: 0.0,
            derived_confidence_adjustment: 0.0,
            learned_solutions: Vec::new(),
            last_updated: now,
        }
    }

    /// Fold one resolution into the statistics.
    ///
    /// Counters only ever increase.
    pub fn record(&mut self, resolution: &Resolution, now: DateTime<Utc>) {
        self.observed_resolutions += 1;
        if resolution.success {
            self.success_count += 1;
        }

        let n = self.observed_resolutions as f64;
        self.average_time_to_resolve +=
            (f64::from(resolution.time_to_resolve) - self.average_time_to_resolve) / n;

        let outcome = if resolution.success { 1.0 } else { -1.0 };
        let polarity = resolution.user_feedback.map_or(0.0, |f| f.polarity());
        let signal = 0.5 * outcome + 0.5 * polarity;
        self.derived_confidence_adjustment = ((1.0 - ADJUSTMENT_ALPHA)
            * self.derived_confidence_adjustment
            + ADJUSTMENT_ALPHA * signal)
            .clamp(-1.0, 1.0);

        let idx = match self
            .learned_solutions
            .iter()
            .position(|s| s.matches(&resolution.solution))
        {
            Some(idx) => idx,
            None => {
                self.learned_solutions
                    .push(LearnedSolution::new(&resolution.solution, &resolution.pattern));
                self.learned_solutions.len() - 1
            }
        };
        let learned = &mut self.learned_solutions[idx];
        learned.attempts += 1;
        if resolution.success {
            learned.successes += 1;
        }
        match resolution.user_feedback {
            Some(UserFeedback::Helpful) => learned.helpful += 1,
            Some(UserFeedback::NotHelpful) => learned.not_helpful += 1,
            _ => {}
        }

        self.last_updated = now;
    }

    pub fn success_rate(&self) -> f64 {
        if self.observed_resolutions == 0 {
            0.0
        } else {
            self.success_count as f64 / self.observed_resolutions as f64
        }
    }

    pub fn has_history(&self) -> bool {
        self.observed_resolutions > 0
    }

    /// Helpful minus not-helpful reports across every learned solution.
    pub fn net_feedback(&self) -> i64 {
        self.learned_solutions
            .iter()
            .map(|s| s.helpful as i64 - s.not_helpful as i64)
            .sum()
    }

    /// Successful solutions, most successful first (ties keep insertion order).
    pub fn successful_solutions(&self) -> Vec<&LearnedSolution> {
        let mut solutions: Vec<_> = self
            .learned_solutions
            .iter()
            .filter(|s| s.successes > 0)
            .collect();
        solutions.sort_by(|a, b| b.successes.cmp(&a.successes));
        solutions
    }
}

/// Weighting between a rule's base confidence and observed history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendPolicy {
    /// Observations after which history reaches its full weight.
    pub history_cap: u32,
    /// Upper bound on the weight given to history.
    pub max_history_weight: f64,
}

impl Default for BlendPolicy {
    fn default() -> Self {
        Self {
            history_cap: 10,
            max_history_weight: 0.6,
        }
    }
}

impl BlendPolicy {
    /// Blend `base` with the entry's history.
    ///
    /// Monotonic in feedback polarity: net-helpful feedback never drops the
    /// result below `base`, net-unhelpful feedback never lifts it above.
    /// Without reported feedback the blend follows the outcomes alone.
    pub fn blend(&self, base: f64, entry: &KnowledgeBaseEntry) -> f64 {
        if !entry.has_history() || self.history_cap == 0 {
            return base;
        }
        let cap = u64::from(self.history_cap);
        let weight = (entry.observed_resolutions.min(cap) as f64 / cap as f64)
            * self.max_history_weight.clamp(0.0, 1.0);
        let historical = (entry.success_rate()
            + ADJUSTMENT_SCALE * entry.derived_confidence_adjustment)
            .clamp(0.0, 1.0);

        let mut blended = (1.0 - weight) * base + weight * historical;
        match entry.net_feedback().signum() {
            1 => blended = blended.max(base),
            -1 => blended = blended.min(base),
            _ => {}
        }
        blended.clamp(0.0, 1.0)
    }
}
