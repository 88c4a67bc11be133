//! Supabase vector store client

use super::{Embedder, Passage, RetrievalConfig, RetrievalError, TogetherEmbedder};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

const MATCH_FUNCTION: &str = "match_documents";

/// Similarity search over the `documents` table
pub struct SupabaseRetriever {
    client: reqwest::Client,
    rpc_url: String,
    api_key: String,
    embedder: Arc<dyn Embedder>,
    match_count: usize,
}

#[derive(Serialize)]
struct MatchRequest<'a> {
    query_embedding: &'a [f32],
    match_count: usize,
    filter: Value,
}

impl SupabaseRetriever {
    pub fn new(
        supabase_url: &str,
        api_key: String,
        embedder: Arc<dyn Embedder>,
        match_count: usize,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            rpc_url: format!(
                "{}/rest/v1/rpc/{MATCH_FUNCTION}",
                supabase_url.trim_end_matches('/')
            ),
            api_key,
            embedder,
            match_count,
        }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        let embedder = Arc::new(TogetherEmbedder::new(config.together_api_key.clone()));
        Self::new(
            &config.supabase_url,
            config.supabase_key.clone(),
            embedder,
            config.match_count,
        )
    }

    /// Embed `query` and return the closest documents, best match first
    pub async fn search(&self, query: &str) -> Result<Vec<Passage>, RetrievalError> {
        let embedding = self.embedder.embed(query).await?;

        let response = self
            .client
            .post(&self.rpc_url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&MatchRequest {
                query_embedding: &embedding,
                match_count: self.match_count,
                filter: json!({}),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Status {
                service: "supabase",
                status: status.as_u16(),
                body,
            });
        }

        let passages: Vec<Passage> =
            response
                .json()
                .await
                .map_err(|e| RetrievalError::Malformed {
                    service: "supabase",
                    message: e.to_string(),
                })?;

        tracing::debug!(
            model = %self.embedder.model_name(),
            count = passages.len(),
            "Retrieved reference documents"
        );
        Ok(passages)
    }
}
