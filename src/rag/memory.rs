//! In-process namespaced vector index.
//!
//! Brute-force cosine ranking over everything stored in a namespace. Only
//! compiled for tests, where it stands in for the hosted index.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::store::{validate_query, Match, RetrievalClient, RetrievalError, RetrievalResult};

#[derive(Debug, Clone)]
struct IndexedRecord {
    id: String,
    vector: Vec<f32>,
    metadata: Map<String, Value>,
}

#[derive(Default)]
pub struct MemoryIndex {
    namespaces: RwLock<HashMap<String, Vec<IndexedRecord>>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record (matched by id) inside `namespace`.
    pub async fn upsert(
        &self,
        namespace: &str,
        id: impl Into<String>,
        vector: Vec<f32>,
        metadata: Map<String, Value>,
    ) {
        let id = id.into();
        let mut guard = self.namespaces.write().await;
        let records = guard.entry(namespace.to_string()).or_default();
        records.retain(|r| r.id != id);
        records.push(IndexedRecord { id, vector, metadata });
    }
}

#[async_trait]
impl RetrievalClient for MemoryIndex {
    fn name(&self) -> &str {
        "memory"
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<RetrievalResult, RetrievalError> {
        validate_query(namespace, top_k)?;

        let guard = self.namespaces.read().await;
        let Some(records) = guard.get(namespace) else {
            return Ok(RetrievalResult::empty());
        };

        let mut matches = Vec::with_capacity(records.len());
        for record in records {
            if record.vector.len() != vector.len() {
                return Err(RetrievalError::InvalidRequest(format!(
                    "Vector length mismatch: {} != {}",
                    vector.len(),
                    record.vector.len()
                )));
            }
            matches.push(Match {
                id: record.id.clone(),
                score: cosine_similarity(vector, &record.vector),
                metadata: if include_metadata {
                    record.metadata.clone()
                } else {
                    Map::new()
                },
            });
        }

        Ok(RetrievalResult::ranked(matches, top_k))
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    let denom = norm_a * norm_b;
    if denom <= f32::EPSILON {
        return 0.0;
    }

    (dot / denom).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(name: &str) -> Map<String, Value> {
        json!({ "name": name }).as_object().cloned().unwrap()
    }

    async fn seeded() -> MemoryIndex {
        let index = MemoryIndex::new();
        index.upsert("prior_patent", "P1", vec![1.0, 0.0, 0.0], meta("Spring Widget")).await;
        index.upsert("prior_patent", "P2", vec![0.7, 0.7, 0.0], meta("Lever")).await;
        index.upsert("prior_patent", "P3", vec![0.0, 0.0, 1.0], meta("Gear")).await;
        index.upsert("patent_law", "L1", vec![1.0, 0.0, 0.0], meta("Art. 29")).await;
        index
    }

    #[tokio::test]
    async fn results_are_ranked_and_bounded_by_top_k() {
        let index = seeded().await;
        let result = index.query("prior_patent", &[1.0, 0.1, 0.0], 2, true).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.matches()[0].id, "P1");
        assert_eq!(result.matches()[1].id, "P2");
        assert!(result.matches()[0].score >= result.matches()[1].score);
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let index = seeded().await;
        let result = index.query("patent_law", &[1.0, 0.0, 0.0], 5, true).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.matches()[0].id, "L1");
    }

    #[tokio::test]
    async fn unknown_namespace_is_empty_not_an_error() {
        let index = seeded().await;
        let result = index.query("trademarks", &[1.0, 0.0, 0.0], 3, true).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn metadata_is_omitted_when_not_requested() {
        let index = seeded().await;
        let result = index.query("prior_patent", &[1.0, 0.0, 0.0], 1, false).await.unwrap();
        assert!(result.matches()[0].metadata.is_empty());
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let index = seeded().await;
        index.upsert("prior_patent", "P1", vec![0.0, 1.0, 0.0], meta("Renamed")).await;

        let result = index.query("prior_patent", &[0.0, 1.0, 0.0], 10, true).await.unwrap();
        assert_eq!(result.len(), 3);
        let p1: Vec<&Match> = result.matches().iter().filter(|m| m.id == "P1").collect();
        assert_eq!(p1.len(), 1);
        assert_eq!(p1[0].metadata["name"], "Renamed");
        assert_eq!(result.matches()[0].id, "P1");
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let index = seeded().await;
        let err = index.query("prior_patent", &[1.0, 0.0], 3, true).await.unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidRequest(_)));
    }
}
