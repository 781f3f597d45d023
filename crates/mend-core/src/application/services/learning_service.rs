//! Knowledge-base learning and lookups.
//!
//! Writes for one signature are serialized through a keyed lock; writes for
//! different signatures proceed in parallel. Reads take store snapshots.
//! A store shared with other processes may reject a write as stale, in which
//! case the entry is read again and the resolution folded in once more.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    application::{ApplicationError, locks::KeyedLocks, ports::KnowledgeStore},
    domain::{
        Diagnostic, DomainValidator as validator, ErrorClassifier, KnowledgeBaseEntry, Resolution,
        Signature,
    },
    error::{MendError, MendResult},
};

/// Read-modify-write rounds before a contended entry gives up.
const STORE_ATTEMPTS: u32 = 8;

/// Aggregate view over every knowledge-base entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeStatistics {
    pub entries: usize,
    pub observed_resolutions: u64,
    pub successes: u64,
    pub success_rate: f64,
    /// Mean minutes per resolution across all signatures.
    pub average_time_to_resolve: f64,
}

pub struct LearningService {
    store: Arc<dyn KnowledgeStore>,
    locks: KeyedLocks<Signature>,
}

impl LearningService {
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// Fold `resolution` into the entry for the diagnostic's signature,
    /// creating it on first sight. Returns the updated entry.
    #[instrument(skip_all, fields(code = diagnostic.code, success = resolution.success))]
    pub fn learn_from_resolution(
        &self,
        diagnostic: &Diagnostic,
        resolution: &Resolution,
    ) -> MendResult<KnowledgeBaseEntry> {
        validator::validate_feedback(diagnostic, resolution)?;
        let signature = ErrorClassifier::normalize(diagnostic).signature();

        let handle = self.locks.handle(&signature)?;
        let _guard = handle.lock().map_err(|_| ApplicationError::StoreLockError {
            during: "learning from a resolution",
        })?;

        let mut attempt = 1;
        let entry = loop {
            let now = Utc::now();
            let mut entry = self
                .store
                .get(&signature)?
                .unwrap_or_else(|| KnowledgeBaseEntry::new(signature, now));
            entry.record(resolution, now);
            match self.store.put(entry.clone()) {
                Ok(()) => break entry,
                Err(MendError::Application(ApplicationError::StoreConflict { .. }))
                    if attempt < STORE_ATTEMPTS =>
                {
                    debug!(attempt, "Entry changed underneath, reading it again");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        info!(
            signature = %signature,
            observed = entry.observed_resolutions,
            adjustment = entry.derived_confidence_adjustment,
            "Resolution recorded"
        );
        Ok(entry)
    }

    pub fn entry(&self, signature: &Signature) -> MendResult<Option<KnowledgeBaseEntry>> {
        self.store.get(signature)
    }

    /// Other known signatures sharing the code or category, most observed
    /// first.
    pub fn similar_signatures(&self, signature: &Signature) -> MendResult<Vec<Signature>> {
        let mut similar: Vec<KnowledgeBaseEntry> = self
            .store
            .entries()?
            .into_iter()
            .filter(|e| e.signature != *signature && e.signature.shares_code_or_category(signature))
            .collect();
        similar.sort_by(|a, b| {
            b.observed_resolutions
                .cmp(&a.observed_resolutions)
                .then_with(|| a.signature.cmp(&b.signature))
        });
        Ok(similar.into_iter().map(|e| e.signature).collect())
    }

    pub fn statistics(&self) -> MendResult<KnowledgeStatistics> {
        let entries = self.store.entries()?;
        let observed: u64 = entries.iter().map(|e| e.observed_resolutions).sum();
        let successes: u64 = entries.iter().map(|e| e.success_count).sum();
        let total_minutes: f64 = entries
            .iter()
            .map(|e| e.average_time_to_resolve * e.observed_resolutions as f64)
            .sum();

        let ratio = |value: f64| {
            if observed == 0 {
                0.0
            } else {
                value / observed as f64
            }
        };
        Ok(KnowledgeStatistics {
            entries: entries.len(),
            observed_resolutions: observed,
            successes,
            success_rate: ratio(successes as f64),
            average_time_to_resolve: ratio(total_minutes),
        })
    }
}
