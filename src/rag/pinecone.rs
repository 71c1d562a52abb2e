//! Hosted vector index client (Pinecone data-plane REST API).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::store::{validate_query, Match, RetrievalClient, RetrievalError, RetrievalResult};
use crate::core::config::RetrievalConfig;

#[derive(Clone)]
pub struct PineconeIndex {
    host: String,
    api_key: String,
    api_version: String,
    client: Client,
}

impl PineconeIndex {
    pub fn new(config: &RetrievalConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        let host = config.index_host.trim_end_matches('/');
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };
        Ok(Self {
            host,
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            client,
        })
    }

    fn query_url(&self) -> String {
        format!("{}/query", self.host)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

#[async_trait]
impl RetrievalClient for PineconeIndex {
    fn name(&self) -> &str {
        "pinecone"
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<RetrievalResult, RetrievalError> {
        validate_query(namespace, top_k)?;

        let body = QueryRequest {
            namespace,
            vector,
            top_k,
            include_metadata,
            include_values: false,
        };

        let res = self
            .client
            .post(self.query_url())
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(RetrievalError::Status { status, body });
        }

        let payload: QueryResponse = res
            .json()
            .await
            .map_err(|e| RetrievalError::Malformed(e.to_string()))?;

        tracing::debug!(
            "Index query on {} returned {} of {} requested matches",
            namespace,
            payload.matches.len(),
            top_k
        );

        Ok(RetrievalResult::ranked(payload.matches, top_k))
    }
}
