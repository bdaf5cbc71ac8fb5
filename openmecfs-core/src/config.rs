//! Configuration for the evidence platform.
//!
//! Uses `figment` for layered configuration: defaults -> `openmecfs.toml`
//! -> environment (`OPENMECFS_` prefix, `__` as section separator).
//! Secrets (API keys, the cache admin token) are never stored in config
//! files; config only names the environment variables that hold them.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::PlatformError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub reasoning: ReasoningConfig,
    pub embedding: EmbeddingConfig,
    pub dedupe: DedupeConfig,
    pub sync: SyncConfig,
    pub cache: CacheConfig,
    pub search: SearchConfig,
    pub store: StoreConfig,
    pub sources: SourcesConfig,
}

impl PlatformConfig {
    /// Load configuration with layering: defaults, then an optional TOML
    /// file, then environment variables.
    pub fn load(config_path: Option<&Path>) -> Result<Self, PlatformError> {
        let mut figment = Figment::from(Serialized::defaults(PlatformConfig::default()));
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        } else {
            figment = figment.merge(Toml::file("openmecfs.toml"));
        }
        figment
            .merge(Env::prefixed("OPENMECFS_").split("__"))
            .extract()
            .map_err(|e| PlatformError::Config {
                message: e.to_string(),
            })
    }
}

/// Configuration for the external reasoning (chat completion) service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Provider name; anything OpenAI-compatible.
    #[serde(default = "default_reasoning_provider")]
    pub provider: String,
    #[serde(default = "default_reasoning_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Override for self-hosted or proxy endpoints.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_reasoning_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_reasoning_provider() -> String {
    "openai".into()
}
fn default_reasoning_model() -> String {
    "gpt-4o-mini".into()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_reasoning_timeout() -> u64 {
    60
}
fn default_max_output_tokens() -> u32 {
    600
}
fn default_temperature() -> f32 {
    0.2
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            provider: default_reasoning_provider(),
            model: default_reasoning_model(),
            api_key_env: default_api_key_env(),
            base_url: None,
            timeout_secs: default_reasoning_timeout(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Configuration for the embedding service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "openai" for the API-backed embedder, "hash" for the local
    /// deterministic bag-of-words embedder.
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Embedding dimensions; only used by the local embedder (the API
    /// reports its own).
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_provider() -> String {
    "openai".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_dimensions() -> usize {
    256
}
fn default_embedding_timeout() -> u64 {
    30
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            api_key_env: default_api_key_env(),
            base_url: None,
            timeout_secs: default_embedding_timeout(),
        }
    }
}

/// Configuration for semantic deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupeConfig {
    /// Cosine similarity at or above which two titles are the same
    /// cluster. Workload-dependent; useful values sit in 0.85-0.90 for
    /// short title-like strings.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
}

fn default_similarity_threshold() -> f32 {
    0.88
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

/// How the synchronizer persists merged hypotheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPolicy {
    /// Persist only genuinely new records; never delete.
    AppendOnly,
    /// Delete all persisted hypotheses, then bulk-insert the deduplicated
    /// union. Loses seeded records not reproduced by the current merge;
    /// requires explicit opt-in.
    FullReplace,
}

/// Configuration for the hypothesis synchronizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_sync_policy")]
    pub policy: SyncPolicy,
    /// How many recent one-sentence summaries ground a synthesis call.
    #[serde(default = "default_grounding_limit")]
    pub grounding_limit: usize,
    /// How many hypotheses the reasoning prompt asks for.
    #[serde(default = "default_hypothesis_count")]
    pub hypothesis_count: usize,
}

fn default_sync_policy() -> SyncPolicy {
    SyncPolicy::AppendOnly
}
fn default_grounding_limit() -> usize {
    40
}
fn default_hypothesis_count() -> usize {
    3
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            policy: default_sync_policy(),
            grounding_limit: default_grounding_limit(),
            hypothesis_count: default_hypothesis_count(),
        }
    }
}

/// Configuration for the short-lived search result cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    /// Environment variable holding the admin token that gates explicit
    /// cache clears. When the variable is unset, clearing is open (dev).
    #[serde(default = "default_admin_token_env")]
    pub admin_token_env: String,
}

fn default_cache_ttl() -> u64 {
    30
}
fn default_cache_capacity() -> usize {
    200
}
fn default_admin_token_env() -> String {
    "OPENMECFS_ADMIN_TOKEN".into()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            capacity: default_cache_capacity(),
            admin_token_env: default_admin_token_env(),
        }
    }
}

/// Configuration for full-text search over the in-memory snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Upper bound on the snapshot scanned per query.
    #[serde(default = "default_snapshot_limit")]
    pub snapshot_limit: usize,
    #[serde(default = "default_result_limit")]
    pub default_limit: usize,
}

fn default_snapshot_limit() -> usize {
    1000
}
fn default_result_limit() -> usize {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            snapshot_limit: default_snapshot_limit(),
            default_limit: default_result_limit(),
        }
    }
}

/// Record store backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "memory" or "json".
    #[serde(default = "default_store_backend")]
    pub backend: String,
    /// Snapshot path for the JSON backend.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_backend() -> String {
    "json".into()
}
fn default_store_path() -> PathBuf {
    PathBuf::from(".openmecfs/store.json")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: default_store_path(),
        }
    }
}

/// Bibliographic source-fetch service (Europe PMC).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_sources_base_url")]
    pub base_url: String,
    #[serde(default = "default_sources_timeout")]
    pub timeout_secs: u64,
}

fn default_sources_base_url() -> String {
    "https://www.ebi.ac.uk/europepmc/webservices/rest".into()
}
fn default_sources_timeout() -> u64 {
    30
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            base_url: default_sources_base_url(),
            timeout_secs: default_sources_timeout(),
        }
    }
}
