//! # Open ME/CFS Core
//!
//! Core library for the Open ME/CFS evidence platform: serves biomedical
//! research-paper metadata and layers AI-derived evidence (summaries,
//! causal hypotheses, mechanism/biomarker tags) on top of it.
//!
//! The heart of the crate is the evidence synthesis and deduplication
//! pipeline:
//!
//! - **hashing**: content fingerprints, the idempotency key for evidence
//!   generation
//! - **ontology**: canonicalization of noisy mechanism mentions into a
//!   controlled vocabulary
//! - **reasoning** / **extraction**: reasoning-service client and
//!   defensive parsing of its output
//! - **embedding** / **dedupe**: vector-similarity clustering of
//!   near-duplicate titles
//! - **sync**: merge of generated hypotheses with the persisted set
//! - **cache**: short-lived bounded cache for read-heavy query paths
//! - **engine**: the operations exposed to calling code
//!
//! Transport, authentication, and the production record store's own
//! guarantees are out of scope; the store is a trait with local backends
//! for tests and self-contained runs.

pub mod cache;
pub mod config;
pub mod dedupe;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod graph;
pub mod hashing;
pub mod ontology;
pub mod reasoning;
pub mod search;
pub mod sources;
pub mod store;
pub mod sync;
pub mod types;

// Re-export commonly used types at the crate root.
pub use cache::ResultCache;
pub use config::{PlatformConfig, SyncPolicy};
pub use dedupe::Deduplicator;
pub use embedding::{cosine_similarity, create_embedder, Embedder, HashEmbedder, OpenAiEmbedder};
pub use engine::{EvidenceEngine, EvidenceOutcome};
pub use error::{PlatformError, Result, StoreError, UpstreamError};
pub use extraction::{parse_structured, ParsedExtraction};
pub use ontology::{canonicalize, MechanismTag};
pub use reasoning::{create_provider, MockReasoningProvider, ReasoningProvider};
pub use search::SearchFilters;
pub use sources::{EuropePmcClient, SourceFetcher, StaticSourceFetcher};
pub use store::{EvidenceStore, JsonFileStore, MemoryStore};
pub use sync::Synchronizer;
pub use types::{
    EvidenceRecord, HypothesisOrigin, HypothesisRecord, MechanismGraphEdge, Paper,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
