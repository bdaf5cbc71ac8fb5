//! Record store abstraction and local backends.
//!
//! The production record store is an external managed database; its
//! contract (select/insert/upsert/delete per collection, read-your-writes
//! within a request) is all this crate assumes. Two local backends
//! implement the trait: a pure in-memory store for tests, and a JSON
//! snapshot store that persists with an atomic write-then-rename so a
//! crash mid-write never corrupts the file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::StoreError;
use crate::types::{EvidenceRecord, HypothesisRecord, MechanismGraphEdge, Paper};

/// Trait for record store backends.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    async fn get_paper(&self, pmid: &str) -> Result<Option<Paper>, StoreError>;

    /// Insert or replace a paper keyed by PMID.
    async fn upsert_paper(&self, paper: Paper) -> Result<(), StoreError>;

    /// All papers, PMID order.
    async fn list_papers(&self) -> Result<Vec<Paper>, StoreError>;

    /// Look up a live evidence record by its idempotency key.
    async fn find_evidence(
        &self,
        source_id: &str,
        content_hash: &str,
    ) -> Result<Option<EvidenceRecord>, StoreError>;

    /// Insert an evidence record. First write wins: when a record with
    /// the same `(source_id, content_hash)` already exists the insert is
    /// a no-op, which is what settles concurrent generation races.
    async fn insert_evidence(&self, record: EvidenceRecord) -> Result<(), StoreError>;

    /// Most recent evidence records first, bounded.
    async fn list_evidence(&self, limit: usize) -> Result<Vec<EvidenceRecord>, StoreError>;

    async fn list_hypotheses(&self) -> Result<Vec<HypothesisRecord>, StoreError>;

    /// Append hypotheses; never deletes.
    async fn insert_hypotheses(&self, records: &[HypothesisRecord]) -> Result<(), StoreError>;

    /// Destructive: drop all persisted hypotheses, then bulk-insert.
    async fn replace_hypotheses(&self, records: &[HypothesisRecord]) -> Result<(), StoreError>;

    /// Regenerate the derived edges for one source document wholesale.
    async fn replace_edges(
        &self,
        source_id: &str,
        edges: Vec<MechanismGraphEdge>,
    ) -> Result<(), StoreError>;

    async fn list_edges(&self) -> Result<Vec<MechanismGraphEdge>, StoreError>;
}

/// Serializable state shared by both local backends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    papers: BTreeMap<String, Paper>,
    evidence: Vec<EvidenceRecord>,
    hypotheses: Vec<HypothesisRecord>,
    edges: Vec<MechanismGraphEdge>,
}

impl StoreState {
    fn find_evidence(&self, source_id: &str, content_hash: &str) -> Option<&EvidenceRecord> {
        self.evidence
            .iter()
            .find(|r| r.source_id == source_id && r.content_hash == content_hash)
    }

    fn insert_evidence(&mut self, record: EvidenceRecord) {
        if self
            .find_evidence(&record.source_id, &record.content_hash)
            .is_some()
        {
            tracing::debug!(
                source_id = %record.source_id,
                "evidence already present for content hash, keeping first write"
            );
            return;
        }
        self.evidence.push(record);
    }

    fn list_evidence(&self, limit: usize) -> Vec<EvidenceRecord> {
        let mut records = self.evidence.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        records
    }

    fn replace_edges(&mut self, source_id: &str, edges: Vec<MechanismGraphEdge>) {
        self.edges.retain(|e| e.source_id != source_id);
        self.edges.extend(edges);
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EvidenceStore for MemoryStore {
    async fn get_paper(&self, pmid: &str) -> Result<Option<Paper>, StoreError> {
        Ok(self.state.read().unwrap().papers.get(pmid).cloned())
    }

    async fn upsert_paper(&self, paper: Paper) -> Result<(), StoreError> {
        self.state
            .write()
            .unwrap()
            .papers
            .insert(paper.pmid.clone(), paper);
        Ok(())
    }

    async fn list_papers(&self) -> Result<Vec<Paper>, StoreError> {
        Ok(self.state.read().unwrap().papers.values().cloned().collect())
    }

    async fn find_evidence(
        &self,
        source_id: &str,
        content_hash: &str,
    ) -> Result<Option<EvidenceRecord>, StoreError> {
        Ok(self
            .state
            .read()
            .unwrap()
            .find_evidence(source_id, content_hash)
            .cloned())
    }

    async fn insert_evidence(&self, record: EvidenceRecord) -> Result<(), StoreError> {
        self.state.write().unwrap().insert_evidence(record);
        Ok(())
    }

    async fn list_evidence(&self, limit: usize) -> Result<Vec<EvidenceRecord>, StoreError> {
        Ok(self.state.read().unwrap().list_evidence(limit))
    }

    async fn list_hypotheses(&self) -> Result<Vec<HypothesisRecord>, StoreError> {
        Ok(self.state.read().unwrap().hypotheses.clone())
    }

    async fn insert_hypotheses(&self, records: &[HypothesisRecord]) -> Result<(), StoreError> {
        self.state
            .write()
            .unwrap()
            .hypotheses
            .extend_from_slice(records);
        Ok(())
    }

    async fn replace_hypotheses(&self, records: &[HypothesisRecord]) -> Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        state.hypotheses.clear();
        state.hypotheses.extend_from_slice(records);
        Ok(())
    }

    async fn replace_edges(
        &self,
        source_id: &str,
        edges: Vec<MechanismGraphEdge>,
    ) -> Result<(), StoreError> {
        self.state.write().unwrap().replace_edges(source_id, edges);
        Ok(())
    }

    async fn list_edges(&self) -> Result<Vec<MechanismGraphEdge>, StoreError> {
        Ok(self.state.read().unwrap().edges.clone())
    }
}

/// JSON snapshot store. Loads the whole state at open, writes it back
/// after every mutation.
pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl JsonFileStore {
    /// Open a store at the given path, creating an empty one when the
    /// file does not exist yet.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let state = match load_json::<StoreState>(path) {
            Ok(Some(state)) => state,
            Ok(None) => StoreState::default(),
            Err(e) => {
                return Err(StoreError::Backend {
                    message: format!("failed to load {}: {}", path.display(), e),
                })
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            state: RwLock::new(state),
        })
    }

    fn save(&self, state: &StoreState) -> Result<(), StoreError> {
        atomic_write_json(&self.path, state).map_err(|e| StoreError::Backend {
            message: format!("failed to write {}: {}", self.path.display(), e),
        })
    }
}

#[async_trait]
impl EvidenceStore for JsonFileStore {
    async fn get_paper(&self, pmid: &str) -> Result<Option<Paper>, StoreError> {
        Ok(self.state.read().unwrap().papers.get(pmid).cloned())
    }

    async fn upsert_paper(&self, paper: Paper) -> Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        state.papers.insert(paper.pmid.clone(), paper);
        self.save(&state)
    }

    async fn list_papers(&self) -> Result<Vec<Paper>, StoreError> {
        Ok(self.state.read().unwrap().papers.values().cloned().collect())
    }

    async fn find_evidence(
        &self,
        source_id: &str,
        content_hash: &str,
    ) -> Result<Option<EvidenceRecord>, StoreError> {
        Ok(self
            .state
            .read()
            .unwrap()
            .find_evidence(source_id, content_hash)
            .cloned())
    }

    async fn insert_evidence(&self, record: EvidenceRecord) -> Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        state.insert_evidence(record);
        self.save(&state)
    }

    async fn list_evidence(&self, limit: usize) -> Result<Vec<EvidenceRecord>, StoreError> {
        Ok(self.state.read().unwrap().list_evidence(limit))
    }

    async fn list_hypotheses(&self) -> Result<Vec<HypothesisRecord>, StoreError> {
        Ok(self.state.read().unwrap().hypotheses.clone())
    }

    async fn insert_hypotheses(&self, records: &[HypothesisRecord]) -> Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        state.hypotheses.extend_from_slice(records);
        self.save(&state)
    }

    async fn replace_hypotheses(&self, records: &[HypothesisRecord]) -> Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        state.hypotheses.clear();
        state.hypotheses.extend_from_slice(records);
        self.save(&state)
    }

    async fn replace_edges(
        &self,
        source_id: &str,
        edges: Vec<MechanismGraphEdge>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        state.replace_edges(source_id, edges);
        self.save(&state)
    }

    async fn list_edges(&self) -> Result<Vec<MechanismGraphEdge>, StoreError> {
        Ok(self.state.read().unwrap().edges.clone())
    }
}

/// Atomically write pretty-printed JSON: write a `.tmp` sibling, then
/// rename over the target, so partial writes never corrupt the snapshot.
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data).map_err(std::io::Error::other)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json.as_bytes())?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Load JSON from a file; `Ok(None)` when the file does not exist.
fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> std::io::Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = std::fs::read_to_string(path)?;
    let value = serde_json::from_str(&data)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(Some(value))
}
