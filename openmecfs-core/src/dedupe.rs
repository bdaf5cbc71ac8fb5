//! Embedding-similarity deduplication of title-like strings.
//!
//! Greedy order-preserving clustering: each record is compared against
//! every representative already accepted, and dropped when cosine
//! similarity reaches the configured threshold. Earlier records always
//! win as the representative, so callers must place trusted (seeded)
//! records ahead of freshly generated ones.

use std::sync::Arc;

use crate::embedding::{cosine_similarity, Embedder};
use crate::error::UpstreamError;

/// Disease-name boilerplate removed from titles before embedding; these
/// terms appear in nearly every title in the corpus and would inflate
/// pairwise similarity without carrying any distinguishing signal.
const BOILERPLATE_TERMS: &[&str] = &[
    "myalgic encephalomyelitis",
    "chronic fatigue syndrome",
    "me cfs",
    "mecfs",
    "long covid",
];

/// Normalize a title for similarity comparison: lowercase, strip
/// non-alphanumerics, collapse whitespace, drop disease-name boilerplate.
pub fn normalize_title(title: &str) -> String {
    let lowered: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let mut collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    for term in BOILERPLATE_TERMS {
        collapsed = collapsed.replace(term, " ");
    }
    collapsed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapses near-duplicate records to one representative per similarity
/// cluster.
pub struct Deduplicator {
    embedder: Arc<dyn Embedder>,
    threshold: f32,
}

impl Deduplicator {
    pub fn new(embedder: Arc<dyn Embedder>, threshold: f32) -> Self {
        Self {
            embedder,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Return one representative per cluster, preserving first-occurrence
    /// order.
    ///
    /// Records whose normalized title is empty cannot be compared and are
    /// always kept. An embedding failure fails the whole pass: comparing
    /// against zero or stale vectors would produce false matches.
    pub async fn dedupe<R, F>(
        &self,
        records: Vec<R>,
        title_of: F,
    ) -> Result<Vec<R>, UpstreamError>
    where
        F: Fn(&R) -> &str,
    {
        if records.len() < 2 {
            return Ok(records);
        }

        let normalized: Vec<String> = records.iter().map(|r| normalize_title(title_of(r))).collect();

        // One batch call for every non-empty title.
        let to_embed: Vec<String> = normalized.iter().filter(|t| !t.is_empty()).cloned().collect();
        let mut embedded = self.embedder.embed_batch(&to_embed).await?.into_iter();
        let vectors: Vec<Option<Vec<f32>>> = normalized
            .iter()
            .map(|t| if t.is_empty() { None } else { embedded.next() })
            .collect();

        let mut kept = Vec::with_capacity(records.len());
        let mut representatives: Vec<Vec<f32>> = Vec::new();

        for (record, vector) in records.into_iter().zip(vectors) {
            let Some(vector) = vector else {
                kept.push(record);
                continue;
            };
            let duplicate = representatives
                .iter()
                .any(|rep| cosine_similarity(rep, &vector) >= self.threshold);
            if duplicate {
                tracing::debug!(title = %title_of(&record), "dropping near-duplicate");
                continue;
            }
            representatives.push(vector);
            kept.push(record);
        }

        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Embedder with hand-assigned vectors per normalized title, so tests
    /// control the similarity model exactly.
    struct StubEmbedder {
        vectors: HashMap<String, Vec<f32>>,
        fail: bool,
    }

    impl StubEmbedder {
        fn new(entries: &[(&str, Vec<f32>)]) -> Self {
            Self {
                vectors: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                vectors: HashMap::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, UpstreamError> {
            if self.fail {
                return Err(UpstreamError::Request {
                    service: "embedding",
                    message: "connection refused".into(),
                });
            }
            Ok(texts
                .iter()
                .map(|t| self.vectors.get(t).cloned().unwrap_or(vec![0.0, 0.0, 1.0]))
                .collect())
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn provider_name(&self) -> &str {
            "stub"
        }
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(
            normalize_title("Vascular Microclot Hypothesis!"),
            "vascular microclot hypothesis"
        );
        assert_eq!(
            normalize_title("  Multiple   spaces\tand-punctuation "),
            "multiple spaces and punctuation"
        );
    }

    #[test]
    fn test_normalize_title_strips_disease_boilerplate() {
        assert_eq!(
            normalize_title("Mitochondrial findings in ME/CFS patients"),
            "mitochondrial findings in patients"
        );
        assert_eq!(
            normalize_title("Chronic Fatigue Syndrome: a vascular view"),
            "a vascular view"
        );
    }

    fn dedup_fixture() -> (Vec<String>, StubEmbedder) {
        // First two titles embed close, the third far away.
        let titles = vec![
            "Vascular microclot hypothesis".to_string(),
            "Microclots and vascular dysfunction".to_string(),
            "Unrelated immune hypothesis".to_string(),
        ];
        let stub = StubEmbedder::new(&[
            ("vascular microclot hypothesis", vec![1.0, 0.0, 0.0]),
            ("microclots and vascular dysfunction", vec![0.97, 0.24, 0.0]),
            ("unrelated immune hypothesis", vec![0.0, 1.0, 0.0]),
        ]);
        (titles, stub)
    }

    #[tokio::test]
    async fn test_dedupe_collapses_near_duplicates() {
        let (titles, stub) = dedup_fixture();
        let dedup = Deduplicator::new(Arc::new(stub), 0.85);
        let kept = dedup.dedupe(titles, |t| t.as_str()).await.unwrap();
        assert_eq!(
            kept,
            vec![
                "Vascular microclot hypothesis".to_string(),
                "Unrelated immune hypothesis".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_dedupe_threshold_is_tunable() {
        // The same pair survives under a threshold above its similarity.
        for (threshold, expected) in [(0.85f32, 2usize), (0.88, 2), (0.99, 3)] {
            let (titles, stub) = dedup_fixture();
            let dedup = Deduplicator::new(Arc::new(stub), threshold);
            let kept = dedup.dedupe(titles, |t| t.as_str()).await.unwrap();
            assert_eq!(kept.len(), expected, "threshold {threshold}");
        }
    }

    #[tokio::test]
    async fn test_dedupe_first_occurrence_wins() {
        let (mut titles, stub) = dedup_fixture();
        titles.swap(0, 1);
        let dedup = Deduplicator::new(Arc::new(stub), 0.85);
        let kept = dedup.dedupe(titles, |t| t.as_str()).await.unwrap();
        assert_eq!(kept[0], "Microclots and vascular dysfunction");
    }

    #[tokio::test]
    async fn test_dedupe_empty_titles_always_kept() {
        let titles = vec!["".to_string(), "".to_string(), "real title".to_string()];
        let stub = StubEmbedder::new(&[("real title", vec![1.0, 0.0, 0.0])]);
        let dedup = Deduplicator::new(Arc::new(stub), 0.85);
        let kept = dedup.dedupe(titles, |t| t.as_str()).await.unwrap();
        assert_eq!(kept.len(), 3);
    }

    #[tokio::test]
    async fn test_dedupe_embedding_failure_fails_pass() {
        let titles = vec!["one".to_string(), "two".to_string()];
        let dedup = Deduplicator::new(Arc::new(StubEmbedder::failing()), 0.85);
        let result = dedup.dedupe(titles, |t| t.as_str()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_dedupe_single_record_skips_embedding() {
        // A failing embedder is never called for fewer than two records.
        let titles = vec!["only".to_string()];
        let dedup = Deduplicator::new(Arc::new(StubEmbedder::failing()), 0.85);
        let kept = dedup.dedupe(titles, |t| t.as_str()).await.unwrap();
        assert_eq!(kept, vec!["only".to_string()]);
    }
}
