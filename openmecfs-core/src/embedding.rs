//! Pluggable text embedding providers.
//!
//! The dedup contract only requires a stable vector per string, so the
//! provider is a trait seam: the OpenAI API embedder for production, and
//! a local hashed bag-of-words embedder that is deterministic and
//! dependency-free for tests and offline runs.
//!
//! A provider failure for any title in a batch fails the whole call with
//! a typed error. Returning zero vectors instead would let downstream
//! similarity checks silently compare garbage and produce false matches.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::UpstreamError;

const SERVICE: &str = "embedding";

/// Trait for text embedding providers.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate one embedding per input text, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, UpstreamError>;

    /// Dimensionality of the produced vectors.
    fn dimensions(&self) -> usize;

    /// Provider name for logging.
    fn provider_name(&self) -> &str;
}

/// Compute cosine similarity between two vectors.
///
/// A zero-norm or mismatched-length input yields 0 rather than NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Local hashed bag-of-words embedder.
///
/// Each word is hashed to a dimension and its term frequency accumulated;
/// the vector is L2-normalised. Word order does not affect the result,
/// which makes it a usable stand-in for semantic similarity over short
/// title-like strings.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return vector;
        }

        let mut tf: HashMap<&str, usize> = HashMap::new();
        for word in &words {
            *tf.entry(word).or_insert(0) += 1;
        }

        for (term, count) in &tf {
            let idx = djb2_hash(term) % self.dimensions;
            vector[idx] += *count as f32;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

fn djb2_hash(s: &str) -> usize {
    let mut hash: usize = 5381;
    for b in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(b as usize);
    }
    hash
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, UpstreamError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "hash"
    }
}

/// OpenAI API embedder (text-embedding-3-small by default).
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dims: usize,
    base_url: String,
    timeout_secs: u64,
}

impl OpenAiEmbedder {
    /// Create an embedder from configuration, resolving the API key from
    /// the configured environment variable.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, UpstreamError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| UpstreamError::Auth {
            service: SERVICE,
            message: format!("env var '{}' not set", config.api_key_env),
        })?;
        let dims = match config.model.as_str() {
            "text-embedding-3-small" => 1536,
            "text-embedding-3-large" => 3072,
            "text-embedding-ada-002" => 1536,
            _ => 1536,
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::Request {
                service: SERVICE,
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            dims,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://api.openai.com".into()),
            timeout_secs: config.timeout_secs,
        })
    }

    fn map_transport_error(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout {
                service: SERVICE,
                timeout_secs: self.timeout_secs,
            }
        } else {
            UpstreamError::Request {
                service: SERVICE,
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, UpstreamError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "input": texts,
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }

        let payload: serde_json::Value =
            resp.json().await.map_err(|e| self.map_transport_error(e))?;

        let data = payload
            .get("data")
            .and_then(|d| d.as_array())
            .ok_or_else(|| UpstreamError::MalformedResponse {
                service: SERVICE,
                message: "missing data array".into(),
            })?;

        if data.len() != texts.len() {
            return Err(UpstreamError::MalformedResponse {
                service: SERVICE,
                message: format!("expected {} embeddings, got {}", texts.len(), data.len()),
            });
        }

        let mut vectors = Vec::with_capacity(data.len());
        for item in data {
            let embedding = item
                .get("embedding")
                .and_then(|e| e.as_array())
                .ok_or_else(|| UpstreamError::MalformedResponse {
                    service: SERVICE,
                    message: "item without embedding".into(),
                })?;
            vectors.push(
                embedding
                    .iter()
                    .filter_map(|v| v.as_f64().map(|f| f as f32))
                    .collect(),
            );
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

/// Build an embedder from configuration.
///
/// Falls back to the local hash embedder when the OpenAI key is missing,
/// logging the degradation, so offline environments keep working.
pub fn create_embedder(config: &EmbeddingConfig) -> std::sync::Arc<dyn Embedder> {
    match config.provider.as_str() {
        "openai" => match OpenAiEmbedder::from_config(config) {
            Ok(embedder) => std::sync::Arc::new(embedder),
            Err(e) => {
                tracing::warn!(error = %e, "falling back to local hash embedder");
                std::sync::Arc::new(HashEmbedder::new(config.dimensions))
            }
        },
        _ => std::sync::Arc::new(HashEmbedder::new(config.dimensions)),
    }
}
