//! Text embeddings for retrieval queries

use super::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub type Embedding = Vec<f32>;

pub const DEFAULT_EMBEDDING_MODEL: &str = "togethercomputer/m2-bert-80M-8k-retrieval";
const TOGETHER_EMBEDDINGS_URL: &str = "https://api.together.xyz/v1/embeddings";

/// Trait for text embedding services
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, RetrievalError>;

    /// Model identifier, for logs
    fn model_name(&self) -> &str;
}

/// Together AI embeddings client (OpenAI-compatible endpoint)
pub struct TogetherEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl TogetherEmbedder {
    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(api_key, DEFAULT_EMBEDDING_MODEL, TOGETHER_EMBEDDINGS_URL)
    }

    pub fn with_endpoint(api_key: String, model: &str, url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.to_string(),
            url: url.to_string(),
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Embedding,
}

#[async_trait]
impl Embedder for TogetherEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, RetrievalError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Status {
                service: "embeddings",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbeddingResponse =
            response
                .json()
                .await
                .map_err(|e| RetrievalError::Malformed {
                    service: "embeddings",
                    message: e.to_string(),
                })?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| RetrievalError::Malformed {
                service: "embeddings",
                message: "no embedding in response".to_string(),
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
