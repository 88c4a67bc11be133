//! Reference-document retrieval
//!
//! Query text is embedded via Together AI, then matched against the
//! Supabase `documents` table through the `match_documents` RPC.

mod embeddings;
mod supabase;

pub use embeddings::{Embedder, Embedding, TogetherEmbedder, DEFAULT_EMBEDDING_MODEL};
pub use supabase::SupabaseRetriever;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_MATCH_COUNT: usize = 4;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("Malformed {service} response: {message}")]
    Malformed {
        service: &'static str,
        message: String,
    },
}

impl From<reqwest::Error> for RetrievalError {
    fn from(e: reqwest::Error) -> Self {
        RetrievalError::Network(e.to_string())
    }
}

/// Credentials and tuning for the retrieval services
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub together_api_key: String,
    pub supabase_url: String,
    pub supabase_key: String,
    pub match_count: usize,
}

/// A retrieved reference document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub content: String,
    #[serde(default)]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub metadata: Value,
}

impl Passage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            similarity: None,
            metadata: Value::Null,
        }
    }
}

/// Wrap each passage in `<doc>` tags, newline separated
pub fn join_passages(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| format!("<doc>\n{}\n</doc>", p.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_passages() {
        let joined = join_passages(&[Passage::new("one"), Passage::new("two")]);
        assert_eq!(joined, "<doc>\none\n</doc>\n<doc>\ntwo\n</doc>");
    }

    #[test]
    fn test_join_no_passages() {
        assert_eq!(join_passages(&[]), "");
    }

    #[test]
    fn test_passage_tolerates_missing_fields() {
        let p: Passage = serde_json::from_str(r#"{"content": "text"}"#).unwrap();
        assert_eq!(p, Passage::new("text"));
    }
}
