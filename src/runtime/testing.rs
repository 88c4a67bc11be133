//! Mock implementations for testing
//!
//! These mocks enable orchestrator testing without real I/O.

use super::traits::{ContributionSink, GenerationPort, GenerationRequest, RetrievalPort};
use crate::contribution::ContributionError;
use crate::db::{ContributionRecord, DbError, StoredContribution};
use crate::llm::LlmError;
use crate::retrieval::{Passage, RetrievalError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Mutex;

// ============================================================================
// Mock Generator
// ============================================================================

/// Mock generator that returns queued responses in order
pub struct MockGenerator {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<GenerationRequest>>,
}

#[allow(dead_code)]
impl MockGenerator {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_text(&self, text: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationPort for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }
}

// ============================================================================
// Mock Retriever
// ============================================================================

/// Mock retriever returning a fixed passage list
pub struct MockRetriever {
    passages: Mutex<Vec<Passage>>,
    failure: Mutex<Option<RetrievalError>>,
    queries: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockRetriever {
    pub fn new() -> Self {
        Self {
            passages: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn set_passages(&self, passages: Vec<Passage>) {
        *self.passages.lock().unwrap() = passages;
    }

    /// Fail the next retrieval with `error`
    pub fn fail_with(&self, error: RetrievalError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockRetriever {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RetrievalPort for MockRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrievalError> {
        self.queries.lock().unwrap().push(query.to_string());
        if let Some(error) = self.failure.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self.passages.lock().unwrap().clone())
    }
}

// ============================================================================
// Mock Contribution Sink
// ============================================================================

/// In-memory contribution sink
pub struct MockSink {
    records: Mutex<Vec<ContributionRecord>>,
    fail_next: Mutex<bool>,
}

#[allow(dead_code)]
impl MockSink {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_next: Mutex::new(false),
        }
    }

    /// Make the next persist fail as if the id already existed
    pub fn fail_next(&self) {
        *self.fail_next.lock().unwrap() = true;
    }

    pub fn persisted(&self) -> Vec<ContributionRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContributionSink for MockSink {
    async fn persist(
        &self,
        record: &ContributionRecord,
    ) -> Result<StoredContribution, ContributionError> {
        let id = {
            let mut records = self.records.lock().unwrap();
            if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
                return Err(DbError::DuplicateId("contribution_mock".to_string()).into());
            }
            records.push(record.clone());
            format!("contribution_mock_{}", records.len())
        };
        Ok(StoredContribution {
            id,
            record: record.clone(),
            created_at: Utc::now(),
        })
    }
}
