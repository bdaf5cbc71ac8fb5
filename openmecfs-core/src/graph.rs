//! Mechanism graph derivation and evidence aggregation.
//!
//! Edges fan out from evidence records: paper -> mechanism for every tag,
//! and mechanism -> biomarker for every tag/biomarker pair. The graph is
//! never authoritative — it is regenerated wholesale whenever the
//! upstream record changes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{EdgeType, EvidenceRecord, MechanismGraphEdge};

/// Derive the full edge fan-out for one evidence record.
pub fn derive_edges(record: &EvidenceRecord) -> Vec<MechanismGraphEdge> {
    let mut edges = Vec::new();
    for mechanism in &record.mechanisms {
        edges.push(MechanismGraphEdge {
            source_id: record.source_id.clone(),
            mechanism: *mechanism,
            biomarker: None,
            edge_type: EdgeType::PaperMechanism,
        });
        for biomarker in &record.biomarkers {
            edges.push(MechanismGraphEdge {
                source_id: record.source_id.clone(),
                mechanism: *mechanism,
                biomarker: Some(biomarker.clone()),
                edge_type: EdgeType::MechanismBiomarker,
            });
        }
    }
    edges
}

/// A node in the rendered graph view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: String,
    /// Occurrence count across the evidence set.
    pub size: usize,
}

/// A link in the rendered graph view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub kind: String,
}

/// Node/link view over a set of evidence records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// Build a tripartite paper/mechanism/biomarker view. Node size counts
/// how often each node appears across records.
pub fn build_graph(records: &[EvidenceRecord]) -> GraphView {
    let mut nodes: Vec<GraphNode> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut links = Vec::new();

    let mut touch = |nodes: &mut Vec<GraphNode>,
                     index: &mut HashMap<String, usize>,
                     id: String,
                     label: String,
                     kind: &str| {
        match index.get(&id) {
            Some(&i) => nodes[i].size += 1,
            None => {
                index.insert(id.clone(), nodes.len());
                nodes.push(GraphNode {
                    id,
                    label,
                    kind: kind.to_string(),
                    size: 1,
                });
            }
        }
    };

    for record in records {
        let paper_id = format!("paper:{}", record.source_id);
        touch(
            &mut nodes,
            &mut index,
            paper_id.clone(),
            record.source_id.clone(),
            "paper",
        );

        for mechanism in &record.mechanisms {
            let mech_id = format!("mech:{mechanism}");
            touch(
                &mut nodes,
                &mut index,
                mech_id.clone(),
                mechanism.to_string(),
                "mechanism",
            );
            links.push(GraphLink {
                source: paper_id.clone(),
                target: mech_id,
                kind: "paper-mechanism".into(),
            });
        }

        for biomarker in &record.biomarkers {
            let trimmed = biomarker.trim();
            if trimmed.is_empty() {
                continue;
            }
            let bio_id = format!("bio:{trimmed}");
            touch(
                &mut nodes,
                &mut index,
                bio_id.clone(),
                trimmed.to_string(),
                "biomarker",
            );
            links.push(GraphLink {
                source: paper_id.clone(),
                target: bio_id,
                kind: "paper-biomarker".into(),
            });
        }
    }

    GraphView { nodes, links }
}

/// Most frequently appearing biomarkers across the evidence set,
/// descending by count.
pub fn biomarker_counts(records: &[EvidenceRecord], limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        for biomarker in &record.biomarkers {
            let trimmed = biomarker.trim();
            if !trimmed.is_empty() {
                *counts.entry(trimmed.to_string()).or_insert(0) += 1;
            }
        }
    }
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::MechanismTag;
    use chrono::Utc;

    fn record(source_id: &str, mechanisms: Vec<MechanismTag>, biomarkers: Vec<&str>) -> EvidenceRecord {
        EvidenceRecord {
            source_id: source_id.into(),
            one_sentence: "s".into(),
            technical_summary: String::new(),
            patient_summary: String::new(),
            mechanisms,
            biomarkers: biomarkers.iter().map(|b| b.to_string()).collect(),
            confidence: 0.5,
            content_hash: "h".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_derive_edges_fan_out() {
        let r = record(
            "1",
            vec![
                MechanismTag::ImmuneDysregulation,
                MechanismTag::MitochondrialImpairment,
            ],
            vec!["IL-6", "ATP"],
        );
        let edges = derive_edges(&r);
        // 2 paper->mechanism edges + 2x2 mechanism->biomarker edges
        assert_eq!(edges.len(), 6);
        assert_eq!(
            edges
                .iter()
                .filter(|e| e.edge_type == EdgeType::PaperMechanism)
                .count(),
            2
        );
        assert!(edges
            .iter()
            .filter(|e| e.edge_type == EdgeType::MechanismBiomarker)
            .all(|e| e.biomarker.is_some()));
    }

    #[test]
    fn test_derive_edges_empty_record() {
        let r = record("1", vec![], vec!["IL-6"]);
        assert!(derive_edges(&r).is_empty());
    }

    #[test]
    fn test_build_graph_counts_shared_nodes() {
        let records = vec![
            record("1", vec![MechanismTag::ImmuneDysregulation], vec!["IL-6"]),
            record("2", vec![MechanismTag::ImmuneDysregulation], vec![]),
        ];
        let graph = build_graph(&records);
        let mech_node = graph
            .nodes
            .iter()
            .find(|n| n.kind == "mechanism")
            .unwrap();
        assert_eq!(mech_node.size, 2);
        assert_eq!(graph.links.len(), 3);
    }

    #[test]
    fn test_biomarker_counts_ordering() {
        let records = vec![
            record("1", vec![], vec!["IL-6", "ATP"]),
            record("2", vec![], vec!["IL-6", " "]),
            record("3", vec![], vec!["NK cells"]),
        ];
        let counts = biomarker_counts(&records, 10);
        assert_eq!(counts[0], ("IL-6".to_string(), 2));
        assert_eq!(counts.len(), 3);

        let top_one = biomarker_counts(&records, 1);
        assert_eq!(top_one.len(), 1);
    }
}
