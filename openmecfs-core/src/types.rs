//! Core record types: papers, AI-derived evidence, hypotheses, and the
//! derived mechanism graph.
//!
//! The engine and synchronizer are the sole writers of evidence and
//! hypothesis records; read paths receive clones and never mutate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ontology::MechanismTag;

/// Source-document metadata as held in the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    /// Stable external identifier (PubMed ID).
    pub pmid: String,
    pub title: String,
    #[serde(default)]
    pub abstract_text: String,
    #[serde(default)]
    pub journal: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub authors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A structured AI-derived summary for one source document.
///
/// At most one live record exists per `(source_id, content_hash)` pair:
/// the hash is the idempotency key, so re-running generation on unchanged
/// source text must not create a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRecord {
    /// External identifier of the summarized document.
    pub source_id: String,
    pub one_sentence: String,
    pub technical_summary: String,
    pub patient_summary: String,
    /// Controlled-vocabulary tags, first-occurrence order, no repeats.
    pub mechanisms: Vec<MechanismTag>,
    pub biomarkers: Vec<String>,
    /// Clamped to [0, 1].
    pub confidence: f32,
    /// SHA-256 fingerprint of the normalized input text.
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Where a hypothesis record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HypothesisOrigin {
    /// Externally curated ground truth; never silently replaced by a
    /// freshly generated near-duplicate.
    Seeded,
    Generated,
}

/// A causal claim synthesized across many source documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypothesisRecord {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    /// Clamped to [0, 1].
    pub confidence: f32,
    pub mechanisms: Vec<String>,
    pub biomarkers: Vec<String>,
    /// Short reference strings (PMIDs or free-form citations).
    pub citations: Vec<String>,
    pub origin: HypothesisOrigin,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Kind of a derived graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeType {
    PaperMechanism,
    MechanismBiomarker,
}

/// Derived fan-out from an evidence record's mechanisms and biomarkers.
///
/// Purely derived, never authoritative: edges are regenerated wholesale
/// whenever the upstream record is (re)persisted, and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MechanismGraphEdge {
    pub source_id: String,
    pub mechanism: MechanismTag,
    #[serde(default)]
    pub biomarker: Option<String>,
    pub edge_type: EdgeType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&HypothesisOrigin::Seeded).unwrap(),
            "\"seeded\""
        );
        assert_eq!(
            serde_json::to_string(&HypothesisOrigin::Generated).unwrap(),
            "\"generated\""
        );
    }

    #[test]
    fn test_hypothesis_record_roundtrip() {
        let record = HypothesisRecord {
            id: Uuid::new_v4(),
            title: "Vascular microclot hypothesis".into(),
            summary: "Persistent microclots impair capillary perfusion.".into(),
            confidence: 0.7,
            mechanisms: vec!["Vascular/Endothelial dysfunction".into()],
            biomarkers: vec!["ET-1".into()],
            citations: vec!["40627437".into()],
            origin: HypothesisOrigin::Generated,
            created_at: Utc::now(),
            last_synced_at: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: HypothesisRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, record.id);
        assert_eq!(back.origin, HypothesisOrigin::Generated);
        assert!(back.last_synced_at.is_none());
    }

    #[test]
    fn test_edge_type_serde() {
        assert_eq!(
            serde_json::to_string(&EdgeType::MechanismBiomarker).unwrap(),
            "\"mechanism-biomarker\""
        );
    }
}
