//! Bibliographic source-document fetch (Europe PMC).
//!
//! Black-box collaborator: given an external document identifier, returns
//! title/abstract/journal/year/authors, or `None` when the identifier is
//! unknown upstream.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::SourcesConfig;
use crate::error::UpstreamError;

const SERVICE: &str = "source-fetch";

/// Metadata returned by a source lookup.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub title: String,
    pub abstract_text: String,
    pub journal: String,
    pub year: Option<i32>,
    pub authors: Vec<String>,
}

/// Trait for source-document fetch services.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch metadata for an external identifier. `Ok(None)` means the
    /// document does not exist upstream; errors are transport failures.
    async fn fetch(&self, pmid: &str) -> Result<Option<SourceDocument>, UpstreamError>;
}

/// Europe PMC REST client.
pub struct EuropePmcClient {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl EuropePmcClient {
    pub fn from_config(config: &SourcesConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::Request {
                service: SERVICE,
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl SourceFetcher for EuropePmcClient {
    async fn fetch(&self, pmid: &str) -> Result<Option<SourceDocument>, UpstreamError> {
        let url = format!(
            "{}/search?query=EXT_ID:{}&format=json",
            self.base_url, pmid
        );

        let resp = self.client.get(&url).send().await.map_err(|e| {
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
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
                message: format!("lookup for {pmid} failed"),
            });
        }

        let payload: Value = resp.json().await.map_err(|e| UpstreamError::MalformedResponse {
            service: SERVICE,
            message: e.to_string(),
        })?;

        let Some(result) = payload
            .get("resultList")
            .and_then(|l| l.get("result"))
            .and_then(|r| r.as_array())
            .and_then(|r| r.first())
        else {
            return Ok(None);
        };

        Ok(Some(parse_result(result)))
    }
}

fn parse_result(result: &Value) -> SourceDocument {
    let field = |key: &str| {
        result
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim()
            .to_string()
    };
    let authors = result
        .get("authorString")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .split(", ")
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();
    // pubYear arrives as a string in the Europe PMC payload
    let year = result
        .get("pubYear")
        .and_then(|v| match v {
            Value::String(s) => s.parse::<i32>().ok(),
            Value::Number(n) => n.as_i64().map(|y| y as i32),
            _ => None,
        });

    SourceDocument {
        title: field("title"),
        abstract_text: field("abstractText"),
        journal: field("journalTitle"),
        year,
        authors,
    }
}

/// In-process fetcher backed by a fixed map, for tests and demos.
pub struct StaticSourceFetcher {
    documents: HashMap<String, SourceDocument>,
}

impl StaticSourceFetcher {
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
        }
    }

    pub fn with_document(mut self, pmid: &str, document: SourceDocument) -> Self {
        self.documents.insert(pmid.to_string(), document);
        self
    }
}

impl Default for StaticSourceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceFetcher for StaticSourceFetcher {
    async fn fetch(&self, pmid: &str) -> Result<Option<SourceDocument>, UpstreamError> {
        Ok(self.documents.get(pmid).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_result_full_payload() {
        let value = json!({
            "title": "Endothelial dysfunction in ME/CFS.",
            "abstractText": " Impaired flow-mediated dilation was observed. ",
            "journalTitle": "J Transl Med",
            "pubYear": "2023",
            "authorString": "Smith J, Nguyen T, Okafor C"
        });
        let doc = parse_result(&value);
        assert_eq!(doc.title, "Endothelial dysfunction in ME/CFS.");
        assert_eq!(doc.abstract_text, "Impaired flow-mediated dilation was observed.");
        assert_eq!(doc.journal, "J Transl Med");
        assert_eq!(doc.year, Some(2023));
        assert_eq!(doc.authors.len(), 3);
    }

    #[test]
    fn test_parse_result_missing_fields_default() {
        let doc = parse_result(&json!({"title": "Only a title"}));
        assert_eq!(doc.title, "Only a title");
        assert!(doc.abstract_text.is_empty());
        assert!(doc.year.is_none());
        assert!(doc.authors.is_empty());
    }

    #[tokio::test]
    async fn test_static_fetcher_hit_and_miss() {
        let fetcher = StaticSourceFetcher::new().with_document(
            "40627437",
            SourceDocument {
                title: "t".into(),
                abstract_text: "a".into(),
                journal: "j".into(),
                year: Some(2024),
                authors: vec![],
            },
        );
        assert!(fetcher.fetch("40627437").await.unwrap().is_some());
        assert!(fetcher.fetch("00000000").await.unwrap().is_none());
    }
}
