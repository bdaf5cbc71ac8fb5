//! Hypothesis store synchronization.
//!
//! Merges freshly generated candidates into the persisted set. The
//! default policy is non-destructive: exact-title filtering, then a
//! semantic dedup pass over the combined set, then an append-only write
//! of the genuinely new records. A failed write is logged and the
//! computed in-memory view is still returned — the freshly merged view
//! is worth more to the caller than a failed request.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::SyncPolicy;
use crate::dedupe::{normalize_title, Deduplicator};
use crate::error::Result;
use crate::store::EvidenceStore;
use crate::types::HypothesisRecord;

/// Merges candidate hypotheses with the persisted set.
pub struct Synchronizer {
    store: Arc<dyn EvidenceStore>,
    deduplicator: Deduplicator,
    policy: SyncPolicy,
}

impl Synchronizer {
    pub fn new(
        store: Arc<dyn EvidenceStore>,
        deduplicator: Deduplicator,
        policy: SyncPolicy,
    ) -> Self {
        Self {
            store,
            deduplicator,
            policy,
        }
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    /// Merge `candidates` into `existing` and persist the new records.
    ///
    /// Existing records go first into the dedup pass so persisted ground
    /// truth (seeded included) always wins over a generated
    /// near-duplicate. Returns the merged view, new records first.
    pub async fn sync_hypotheses(
        &self,
        existing: Vec<HypothesisRecord>,
        candidates: Vec<HypothesisRecord>,
    ) -> Result<Vec<HypothesisRecord>> {
        let existing_titles: HashSet<String> = existing
            .iter()
            .map(|r| normalize_title(&r.title))
            .filter(|t| !t.is_empty())
            .collect();

        let now = Utc::now();
        let fresh: Vec<HypothesisRecord> = candidates
            .into_iter()
            .filter(|c| !existing_titles.contains(&normalize_title(&c.title)))
            .map(|mut c| {
                c.last_synced_at = Some(now);
                c
            })
            .collect();

        let mut combined = existing;
        combined.extend(fresh);

        // Semantic pass over the full set also catches near-duplicates the
        // exact-title filter missed.
        let merged = self
            .deduplicator
            .dedupe(combined, |r| r.title.as_str())
            .await?;

        let surviving: Vec<HypothesisRecord> = merged
            .iter()
            .filter(|r| r.last_synced_at == Some(now))
            .cloned()
            .collect();

        let write_result = match self.policy {
            SyncPolicy::AppendOnly => {
                if surviving.is_empty() {
                    Ok(())
                } else {
                    self.store.insert_hypotheses(&surviving).await
                }
            }
            SyncPolicy::FullReplace => self.store.replace_hypotheses(&merged).await,
        };
        if let Err(e) = write_result {
            tracing::warn!(error = %e, "hypothesis persistence failed, returning computed view");
        } else {
            tracing::info!(
                new = surviving.len(),
                total = merged.len(),
                "hypothesis sync complete"
            );
        }

        // Surface new records first.
        let mut view = surviving;
        view.extend(merged.into_iter().filter(|r| r.last_synced_at != Some(now)));
        Ok(view)
    }
}
