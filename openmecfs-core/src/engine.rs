//! Evidence engine: the operations exposed to calling code.
//!
//! Transport is out of scope; whatever surface fronts this system calls
//! these methods. Each request runs the pipeline sequentially: fetch
//! existing records, fetch grounding text, call the reasoning service,
//! canonicalize, merge/dedupe, persist, respond.

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::cache::ResultCache;
use crate::config::PlatformConfig;
use crate::dedupe::Deduplicator;
use crate::embedding::Embedder;
use crate::error::{PlatformError, Result, UpstreamError};
use crate::extraction::{
    evidence_from_extraction, hypotheses_from_extraction, parse_structured, HypothesisDraft,
};
use crate::graph::{biomarker_counts, build_graph, derive_edges, GraphView};
use crate::hashing::source_fingerprint;
use crate::ontology::canonicalize_all;
use crate::reasoning::{ReasoningProvider, ReasoningRequest};
use crate::search::{search_papers, SearchFilters};
use crate::sources::SourceFetcher;
use crate::store::EvidenceStore;
use crate::sync::Synchronizer;
use crate::types::{EvidenceRecord, HypothesisOrigin, HypothesisRecord, Paper};

/// System prompt for per-paper evidence extraction.
const EVIDENCE_SYSTEM_PROMPT: &str = "\
You are a biomedical research summarization model for ME/CFS.
Goal: extract mechanistic insight, avoid speculation.

Output MUST be valid JSON with keys:
one_sentence, technical_summary, patient_summary, mechanisms, biomarkers, confidence

Rules:
- mechanisms: high-level buckets only
- biomarkers: specific molecules/cell types (e.g., \"IL-6\", \"NK cells\", \"ATP\")
- confidence: number between 0 and 1
- If unsure, return empty lists and reduce confidence.";

/// System prompt for multi-paper hypothesis synthesis.
const HYPOTHESIS_SYSTEM_PROMPT: &str = "\
You are an expert biomedical AI analyzing summaries of ME/CFS studies.
Propose causal hypotheses linking key mechanisms and biomarkers.

Output MUST be a JSON object: {\"hypotheses\": [...]} where each item has:
title, summary, confidence (0-1), mechanisms[], biomarkers[], citations[]

Rules:
- Ground every hypothesis in the provided summaries.
- citations: PMIDs of the supporting summaries.
- No commentary, ONLY JSON.";

/// Outcome of single-paper evidence generation.
#[derive(Debug, Clone)]
pub enum EvidenceOutcome {
    /// An existing record matched the content hash; nothing was generated.
    Cached(EvidenceRecord),
    /// A new record was generated and persisted.
    Generated(EvidenceRecord),
}

impl EvidenceOutcome {
    pub fn record(&self) -> &EvidenceRecord {
        match self {
            EvidenceOutcome::Cached(r) | EvidenceOutcome::Generated(r) => r,
        }
    }

    pub fn was_cached(&self) -> bool {
        matches!(self, EvidenceOutcome::Cached(_))
    }
}

/// Dataset statistics for the stats surface.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatasetStats {
    pub total_papers: usize,
    pub year_distribution: BTreeMap<i32, usize>,
    pub top_authors: Vec<AuthorCount>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AuthorCount {
    pub name: String,
    pub count: usize,
}

/// One paper row in an imported dataset file. Accepts both a bare array
/// and an object wrapping the rows under a `papers` key.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ImportedPaper {
    pub pmid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub journal: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub authors: Vec<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Wrapped { papers: Vec<ImportedPaper> },
    Bare(Vec<ImportedPaper>),
}

/// Parse a summarized-papers dataset from JSON text.
pub fn parse_dataset(json: &str) -> Result<Vec<ImportedPaper>> {
    let file: DatasetFile = serde_json::from_str(json)?;
    Ok(match file {
        DatasetFile::Wrapped { papers } => papers,
        DatasetFile::Bare(papers) => papers,
    })
}

/// The evidence pipeline behind every exposed operation.
///
/// Construction wires every collaborator explicitly — including the
/// result cache, whose lifecycle (size, TTL, clearing) belongs to the
/// process entry point rather than module state.
pub struct EvidenceEngine {
    store: Arc<dyn EvidenceStore>,
    reasoning: Arc<dyn ReasoningProvider>,
    sources: Arc<dyn SourceFetcher>,
    synchronizer: Synchronizer,
    search_cache: ResultCache<Vec<Paper>>,
    config: PlatformConfig,
}

impl EvidenceEngine {
    pub fn new(
        store: Arc<dyn EvidenceStore>,
        reasoning: Arc<dyn ReasoningProvider>,
        embedder: Arc<dyn Embedder>,
        sources: Arc<dyn SourceFetcher>,
        config: PlatformConfig,
    ) -> Self {
        let deduplicator = Deduplicator::new(embedder, config.dedupe.similarity_threshold);
        let synchronizer = Synchronizer::new(store.clone(), deduplicator, config.sync.policy);
        let search_cache = ResultCache::new(
            Duration::from_secs(config.cache.ttl_secs),
            config.cache.capacity,
        );
        Self {
            store,
            reasoning,
            sources,
            synchronizer,
            search_cache,
            config,
        }
    }

    /// Idempotent fetch-or-create of a paper from the bibliographic
    /// source service.
    pub async fn sync_paper(&self, pmid: &str) -> Result<Paper> {
        if let Some(paper) = self.store.get_paper(pmid).await? {
            return Ok(paper);
        }

        let document = self.sources.fetch(pmid).await?;
        let Some(document) = document else {
            return Err(PlatformError::NotFound {
                entity: "paper",
                id: pmid.to_string(),
            });
        };

        let paper = Paper {
            pmid: pmid.to_string(),
            title: document.title,
            abstract_text: document.abstract_text,
            journal: document.journal,
            year: document.year,
            authors: document.authors,
            created_at: Utc::now(),
        };
        self.store.upsert_paper(paper.clone()).await?;
        tracing::info!(pmid, "paper synced from source service");
        Ok(paper)
    }

    /// Generate (or return the cached) evidence record for one paper.
    ///
    /// The content hash of the normalized title+abstract is the
    /// idempotency key: a repeat call on unchanged source text returns
    /// the stored record without touching the reasoning service.
    pub async fn generate_evidence(&self, pmid: &str) -> Result<EvidenceOutcome> {
        let paper = self
            .store
            .get_paper(pmid)
            .await?
            .ok_or_else(|| PlatformError::NotFound {
                entity: "paper",
                id: pmid.to_string(),
            })?;

        if paper.abstract_text.trim().is_empty() {
            return Err(PlatformError::Validation {
                message: format!("paper {pmid} has no abstract"),
            });
        }

        let content_hash = source_fingerprint(&paper.title, &paper.abstract_text);
        if let Some(existing) = self.store.find_evidence(pmid, &content_hash).await? {
            tracing::debug!(pmid, "evidence generation short-circuited by content hash");
            return Ok(EvidenceOutcome::Cached(existing));
        }

        let raw = self
            .reasoning
            .complete(ReasoningRequest {
                system_prompt: EVIDENCE_SYSTEM_PROMPT.to_string(),
                user_prompt: format!(
                    "Paper title: {}\nAbstract: {}",
                    paper.title, paper.abstract_text
                ),
                max_output_tokens: self.config.reasoning.max_output_tokens,
                temperature: self.config.reasoning.temperature,
                json_output: true,
            })
            .await?;

        let extraction = parse_structured(&raw);
        let Some(draft) = evidence_from_extraction(&extraction) else {
            // Persisting a blank record would poison the idempotency cache
            // for this content hash, so nothing is stored.
            tracing::warn!(pmid, "reasoning response had no parseable payload");
            return Err(PlatformError::Upstream(UpstreamError::MalformedResponse {
                service: "reasoning",
                message: "no parseable extraction in response".into(),
            }));
        };

        let record = EvidenceRecord {
            source_id: pmid.to_string(),
            one_sentence: draft.one_sentence,
            technical_summary: draft.technical_summary,
            patient_summary: draft.patient_summary,
            mechanisms: canonicalize_all(&draft.mechanisms),
            biomarkers: draft.biomarkers,
            confidence: draft.confidence,
            content_hash,
            created_at: Utc::now(),
        };

        self.store.insert_evidence(record.clone()).await?;
        if let Err(e) = self
            .store
            .replace_edges(pmid, derive_edges(&record))
            .await
        {
            tracing::warn!(pmid, error = %e, "graph edge regeneration failed");
        }
        tracing::info!(
            pmid,
            mechanisms = record.mechanisms.len(),
            "evidence record generated"
        );
        Ok(EvidenceOutcome::Generated(record))
    }

    /// Synthesize causal hypotheses across the recent evidence corpus and
    /// merge them with the persisted set.
    pub async fn synthesize_hypotheses(&self) -> Result<Vec<HypothesisRecord>> {
        let existing = self.store.list_hypotheses().await?;
        let grounding = self
            .store
            .list_evidence(self.config.sync.grounding_limit)
            .await?;

        if grounding.is_empty() {
            tracing::info!("no evidence records to ground synthesis, returning existing set");
            return Ok(existing);
        }

        let corpus: String = grounding
            .iter()
            .map(|r| format!("- [{}] {}\n", r.source_id, r.one_sentence))
            .collect();
        let user_prompt = format!(
            "Propose {} causal hypotheses from these study summaries:\n\n{}",
            self.config.sync.hypothesis_count, corpus
        );

        let drafts = match self
            .reasoning
            .complete(ReasoningRequest {
                system_prompt: HYPOTHESIS_SYSTEM_PROMPT.to_string(),
                user_prompt,
                max_output_tokens: self.config.reasoning.max_output_tokens,
                temperature: self.config.reasoning.temperature,
                json_output: true,
            })
            .await
        {
            Ok(raw) => {
                let extraction = parse_structured(&raw);
                if extraction.is_failure() {
                    tracing::warn!("hypothesis response had no parseable payload, merging existing only");
                }
                hypotheses_from_extraction(&extraction)
            }
            // An unreachable reasoning service degrades to a merge of the
            // existing set rather than failing the whole request.
            Err(e) => {
                tracing::warn!(error = %e, "reasoning call failed, merging existing only");
                Vec::new()
            }
        };

        let candidates: Vec<HypothesisRecord> =
            drafts.into_iter().map(|d| self.candidate_from_draft(d)).collect();

        self.synchronizer.sync_hypotheses(existing, candidates).await
    }

    fn candidate_from_draft(&self, draft: HypothesisDraft) -> HypothesisRecord {
        // Mechanisms pass through the controlled vocabulary; unmappable
        // mentions are dropped, not invented.
        let mechanisms = canonicalize_all(&draft.mechanisms)
            .into_iter()
            .map(|t| t.label().to_string())
            .collect();
        HypothesisRecord {
            id: Uuid::new_v4(),
            title: draft.title,
            summary: draft.summary,
            confidence: draft.confidence.clamp(0.0, 1.0),
            mechanisms,
            biomarkers: draft.biomarkers,
            citations: draft.citations,
            origin: HypothesisOrigin::Generated,
            created_at: Utc::now(),
            last_synced_at: None,
        }
    }

    /// Full-text search over the paper snapshot, behind the short-lived
    /// result cache.
    pub async fn cached_search(
        &self,
        query: Option<&str>,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<Paper>> {
        let key = format!(
            "{}|{}|{}|{}",
            query.unwrap_or(""),
            filters.author.as_deref().unwrap_or(""),
            filters.year.map(|y| y.to_string()).unwrap_or_default(),
            limit
        );
        if let Some(hit) = self.search_cache.get(&key) {
            return Ok(hit);
        }

        let mut snapshot = self.store.list_papers().await?;
        snapshot.truncate(self.config.search.snapshot_limit);
        let results = search_papers(&snapshot, query, filters, limit);
        self.search_cache.insert(key, results.clone());
        Ok(results)
    }

    /// Clear the search cache. Gated by the configured admin token; when
    /// the token variable is unset the operation is open (dev setups).
    pub fn clear_cache(&self, token: Option<&str>) -> Result<()> {
        if let Ok(expected) = std::env::var(&self.config.cache.admin_token_env)
            && !expected.is_empty()
            && token != Some(expected.as_str())
        {
            return Err(PlatformError::Forbidden {
                message: "invalid admin token".into(),
            });
        }
        self.search_cache.clear();
        tracing::info!("search cache cleared");
        Ok(())
    }

    /// Number of live entries in the search cache.
    pub fn cache_len(&self) -> usize {
        self.search_cache.len()
    }

    /// Import a summarized dataset: upsert papers, then clear the search
    /// cache so stale snapshots are not served.
    pub async fn import_dataset(&self, papers: Vec<ImportedPaper>) -> Result<usize> {
        let mut imported = 0usize;
        for row in papers {
            if row.pmid.trim().is_empty() {
                tracing::warn!("skipping dataset row without pmid");
                continue;
            }
            let paper = Paper {
                pmid: row.pmid,
                title: row.title,
                abstract_text: row.abstract_text,
                journal: row.journal,
                year: row.year,
                authors: row.authors,
                created_at: Utc::now(),
            };
            self.store.upsert_paper(paper).await?;
            imported += 1;
        }
        self.search_cache.clear();
        tracing::info!(imported, "dataset import complete, cache cleared");
        Ok(imported)
    }

    /// Aggregate dataset statistics.
    pub async fn stats(&self) -> Result<DatasetStats> {
        let papers = self.store.list_papers().await?;
        let mut year_distribution: BTreeMap<i32, usize> = BTreeMap::new();
        let mut author_counts: BTreeMap<String, usize> = BTreeMap::new();
        for paper in &papers {
            if let Some(year) = paper.year {
                *year_distribution.entry(year).or_insert(0) += 1;
            }
            for author in &paper.authors {
                *author_counts.entry(author.clone()).or_insert(0) += 1;
            }
        }
        let mut top_authors: Vec<AuthorCount> = author_counts
            .into_iter()
            .map(|(name, count)| AuthorCount { name, count })
            .collect();
        top_authors.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        top_authors.truncate(10);

        Ok(DatasetStats {
            total_papers: papers.len(),
            year_distribution,
            top_authors,
        })
    }

    /// Node/link graph over the recent evidence corpus.
    pub async fn mechanism_graph(&self, limit: usize) -> Result<GraphView> {
        let records = self.store.list_evidence(limit).await?;
        Ok(build_graph(&records))
    }

    /// Most frequent biomarkers across the recent evidence corpus.
    pub async fn top_biomarkers(&self, limit: usize) -> Result<Vec<(String, usize)>> {
        let records = self
            .store
            .list_evidence(self.config.search.snapshot_limit)
            .await?;
        Ok(biomarker_counts(&records, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::reasoning::MockReasoningProvider;
    use crate::sources::{SourceDocument, StaticSourceFetcher};
    use crate::store::MemoryStore;

    const EVIDENCE_JSON: &str = r#"{
        "one_sentence": "Reduced NK cytotoxicity tracks symptom severity.",
        "technical_summary": "NK cell cytotoxicity was reduced versus controls.",
        "patient_summary": "A type of immune cell works less well in patients.",
        "mechanisms": ["immune dysfunction", "quantum entanglement"],
        "biomarkers": ["NK cells", "IL-6"],
        "confidence": 0.82
    }"#;

    fn document() -> SourceDocument {
        SourceDocument {
            title: "NK cell function in ME/CFS".into(),
            abstract_text: "We measured NK cytotoxicity in 40 patients.".into(),
            journal: "J Transl Med".into(),
            year: Some(2024),
            authors: vec!["Smith J".into(), "Nguyen T".into()],
        }
    }

    fn engine_with(
        reasoning: MockReasoningProvider,
        fetcher: StaticSourceFetcher,
    ) -> EvidenceEngine {
        EvidenceEngine::new(
            Arc::new(MemoryStore::new()),
            Arc::new(reasoning),
            Arc::new(HashEmbedder::new(256)),
            Arc::new(fetcher),
            PlatformConfig::default(),
        )
    }

    fn engine() -> EvidenceEngine {
        engine_with(
            MockReasoningProvider::with_response(EVIDENCE_JSON),
            StaticSourceFetcher::new().with_document("40627437", document()),
        )
    }

    #[tokio::test]
    async fn test_sync_paper_fetch_or_create() {
        let engine = engine();
        let first = engine.sync_paper("40627437").await.unwrap();
        assert_eq!(first.title, "NK cell function in ME/CFS");
        // second call is served from the store, not the fetcher
        let second = engine.sync_paper("40627437").await.unwrap();
        assert_eq!(second.created_at, first.created_at);
    }

    #[tokio::test]
    async fn test_sync_paper_unknown_is_not_found() {
        let engine = engine();
        let err = engine.sync_paper("00000000").await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_generate_evidence_idempotent() {
        let engine = engine();
        engine.sync_paper("40627437").await.unwrap();

        let first = engine.generate_evidence("40627437").await.unwrap();
        assert!(!first.was_cached());
        let second = engine.generate_evidence("40627437").await.unwrap();
        assert!(second.was_cached());
        assert_eq!(
            first.record().content_hash,
            second.record().content_hash
        );
    }

    #[tokio::test]
    async fn test_generate_evidence_canonicalizes_and_drops_noise() {
        let engine = engine();
        engine.sync_paper("40627437").await.unwrap();
        let outcome = engine.generate_evidence("40627437").await.unwrap();
        let record = outcome.record();
        assert_eq!(
            record.mechanisms,
            vec![crate::ontology::MechanismTag::ImmuneDysregulation]
        );
        assert_eq!(record.confidence, 0.82);
    }

    #[tokio::test]
    async fn test_generate_evidence_missing_paper() {
        let engine = engine();
        let err = engine.generate_evidence("99999999").await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_generate_evidence_empty_abstract_rejected() {
        let mut doc = document();
        doc.abstract_text = "  ".into();
        let engine = engine_with(
            MockReasoningProvider::with_response(EVIDENCE_JSON),
            StaticSourceFetcher::new().with_document("1", doc),
        );
        engine.sync_paper("1").await.unwrap();
        let err = engine.generate_evidence("1").await.unwrap_err();
        assert!(matches!(err, PlatformError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_generate_evidence_refusal_persists_nothing() {
        let engine = engine_with(
            MockReasoningProvider::with_response("Sorry, I cannot comply."),
            StaticSourceFetcher::new().with_document("40627437", document()),
        );
        engine.sync_paper("40627437").await.unwrap();
        let err = engine.generate_evidence("40627437").await.unwrap_err();
        assert!(matches!(err, PlatformError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_synthesize_with_refusal_merges_existing_only() {
        let engine = engine_with(
            MockReasoningProvider::with_response("Sorry, I cannot comply."),
            StaticSourceFetcher::new().with_document("40627437", document()),
        );
        // seed one evidence record so synthesis has grounding
        let seeded = MockReasoningProvider::new();
        seeded.queue_response(EVIDENCE_JSON);
        let seed_engine = EvidenceEngine::new(
            engine.store.clone(),
            Arc::new(seeded),
            Arc::new(HashEmbedder::new(256)),
            engine.sources.clone(),
            PlatformConfig::default(),
        );
        seed_engine.sync_paper("40627437").await.unwrap();
        seed_engine.generate_evidence("40627437").await.unwrap();

        let merged = engine.synthesize_hypotheses().await.unwrap();
        assert!(merged.is_empty());
    }

    #[tokio::test]
    async fn test_synthesize_generates_and_persists() {
        let hypotheses = r#"{"hypotheses": [
            {"title": "Microclot-driven hypoperfusion", "summary": "s",
             "confidence": 1.7, "mechanisms": ["vascular"],
             "biomarkers": ["ET-1"], "citations": ["40627437"]}
        ]}"#;
        let reasoning = MockReasoningProvider::new();
        // LIFO queue: evidence generation pops last
        reasoning.queue_response(hypotheses);
        reasoning.queue_response(EVIDENCE_JSON);
        let engine = engine_with(
            reasoning,
            StaticSourceFetcher::new().with_document("40627437", document()),
        );

        engine.sync_paper("40627437").await.unwrap();
        engine.generate_evidence("40627437").await.unwrap();

        let merged = engine.synthesize_hypotheses().await.unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "Microclot-driven hypoperfusion");
        assert_eq!(merged[0].confidence, 1.0);
        assert_eq!(
            merged[0].mechanisms,
            vec!["Vascular/Endothelial dysfunction".to_string()]
        );
        assert!(merged[0].last_synced_at.is_some());
        assert_eq!(engine.store.list_hypotheses().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cached_search_hits_cache() {
        let engine = engine();
        engine.sync_paper("40627437").await.unwrap();

        let first = engine
            .cached_search(Some("NK cell"), &SearchFilters::default(), 10)
            .await
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(engine.cache_len(), 1);

        let second = engine
            .cached_search(Some("NK cell"), &SearchFilters::default(), 10)
            .await
            .unwrap();
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn test_import_clears_search_cache() {
        let engine = engine();
        engine
            .cached_search(Some("anything"), &SearchFilters::default(), 10)
            .await
            .unwrap();
        assert_eq!(engine.cache_len(), 1);

        let rows = parse_dataset(
            r#"{"papers": [{"pmid": "1", "title": "T", "abstract": "A"}]}"#,
        )
        .unwrap();
        let imported = engine.import_dataset(rows).await.unwrap();
        assert_eq!(imported, 1);
        assert_eq!(engine.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_parse_dataset_bare_array() {
        let rows = parse_dataset(r#"[{"pmid": "1"}, {"pmid": "2"}]"#).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_clear_cache_gated_by_admin_token() {
        let engine = engine();
        // route the check through a variable unique to this test
        let mut config = PlatformConfig::default();
        config.cache.admin_token_env = "OPENMECFS_TEST_ADMIN_TOKEN".into();
        let gated = EvidenceEngine::new(
            engine.store.clone(),
            Arc::new(MockReasoningProvider::new()),
            Arc::new(HashEmbedder::new(256)),
            engine.sources.clone(),
            config,
        );

        unsafe { std::env::set_var("OPENMECFS_TEST_ADMIN_TOKEN", "s3cret") };
        assert!(gated.clear_cache(Some("wrong")).is_err());
        assert!(gated.clear_cache(None).is_err());
        assert!(gated.clear_cache(Some("s3cret")).is_ok());
        unsafe { std::env::remove_var("OPENMECFS_TEST_ADMIN_TOKEN") };
    }

    #[tokio::test]
    async fn test_stats_aggregation() {
        let engine = engine();
        engine.sync_paper("40627437").await.unwrap();
        let stats = engine.stats().await.unwrap();
        assert_eq!(stats.total_papers, 1);
        assert_eq!(stats.year_distribution.get(&2024), Some(&1));
        assert_eq!(stats.top_authors.len(), 2);
    }

    #[tokio::test]
    async fn test_mechanism_graph_over_evidence() {
        let engine = engine();
        engine.sync_paper("40627437").await.unwrap();
        engine.generate_evidence("40627437").await.unwrap();

        let graph = engine.mechanism_graph(100).await.unwrap();
        assert!(graph.nodes.iter().any(|n| n.kind == "mechanism"));
        assert!(!graph.links.is_empty());

        let biomarkers = engine.top_biomarkers(10).await.unwrap();
        assert_eq!(biomarkers.len(), 2);
    }
}
