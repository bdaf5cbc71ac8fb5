//! Full-text search over a bounded in-memory paper snapshot.
//!
//! Case-insensitive substring matching over title, authors, and abstract,
//! with optional author/year filters. Deliberately simple: the snapshot
//! is small and the result cache in front of this path absorbs repeat
//! queries.

use crate::types::Paper;

/// Optional search filters.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub author: Option<String>,
    pub year: Option<i32>,
}

/// Search papers by free-text query with optional filters, returning at
/// most `limit` results in snapshot order. An empty query matches all
/// papers (filters still apply).
pub fn search_papers(
    papers: &[Paper],
    query: Option<&str>,
    filters: &SearchFilters,
    limit: usize,
) -> Vec<Paper> {
    let query = query.map(str::trim).filter(|q| !q.is_empty());

    let mut results: Vec<&Paper> = papers
        .iter()
        .filter(|p| match query {
            Some(q) => {
                let q = q.to_lowercase();
                p.title.to_lowercase().contains(&q)
                    || p.authors.join(" ").to_lowercase().contains(&q)
                    || p.abstract_text.to_lowercase().contains(&q)
            }
            None => true,
        })
        .collect();

    if let Some(author) = filters.author.as_deref() {
        let author = author.to_lowercase();
        results.retain(|p| p.authors.join(" ").to_lowercase().contains(&author));
    }
    if let Some(year) = filters.year {
        results.retain(|p| p.year == Some(year));
    }

    results.into_iter().take(limit).cloned().collect()
}
