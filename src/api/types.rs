//! API request and response types

use crate::artifact::ContractArtifact;
use crate::db::StoredContribution;
use crate::state_machine::{ConversationState, Role, Turn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to run the agent on one user message
#[derive(Debug, Deserialize)]
pub struct AgentRequest {
    pub input: String,
    /// Prior turns as `[role, text]` pairs
    #[serde(default)]
    pub chat_history: Vec<(Role, String)>,
}

impl AgentRequest {
    pub fn history(&self) -> Vec<Turn> {
        self.chat_history
            .iter()
            .map(|(role, text)| Turn {
                role: *role,
                text: text.clone(),
            })
            .collect()
    }
}

/// Artifact in the wire shape the chat client renders
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractData {
    pub content: String,
    pub is_editable: bool,
    pub status: &'static str,
    pub metadata: ContractMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractMetadata {
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub version: String,
}

impl From<&ContractArtifact> for ContractData {
    fn from(artifact: &ContractArtifact) -> Self {
        Self {
            content: artifact.content.clone(),
            is_editable: artifact.editable,
            status: artifact.status.as_str(),
            metadata: ContractMetadata {
                created_at: artifact.created_at,
                last_modified: artifact.last_modified,
                version: artifact.version.clone(),
            },
        }
    }
}

/// Response for an agent invocation
#[derive(Debug, Serialize)]
pub struct AgentResponse {
    /// Absent when the run produced no reply
    pub result: Option<String>,
    pub contract_data: Option<ContractData>,
    pub messages: Vec<String>,
    pub operation: Option<&'static str>,
    /// History to send with the next message
    pub chat_history: Vec<(Role, String)>,
}

impl AgentResponse {
    pub fn from_state(state: &ConversationState) -> Self {
        Self {
            result: state.result.clone(),
            contract_data: state.contract_artifact.as_ref().map(ContractData::from),
            messages: state.messages.clone(),
            operation: state.operation.map(|op| op.as_str()),
            chat_history: state
                .next_history()
                .into_iter()
                .map(|turn| (turn.role, turn.text))
                .collect(),
        }
    }

    /// Reply used when the invocation exceeded its time budget
    pub fn timed_out(request: &AgentRequest, reply: &str) -> Self {
        let mut chat_history = request.chat_history.clone();
        chat_history.push((Role::Human, request.input.clone()));
        chat_history.push((Role::Ai, reply.to_string()));
        Self {
            result: Some(reply.to_string()),
            contract_data: None,
            messages: Vec::new(),
            operation: None,
            chat_history,
        }
    }
}

/// Template catalog entry
#[derive(Debug, Serialize)]
pub struct TemplateSummary {
    pub id: usize,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateSummary>,
}

/// Query for listing contributions
#[derive(Debug, Deserialize)]
pub struct ContributionListQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

#[derive(Debug, Serialize)]
pub struct ContributionListResponse {
    pub contributions: Vec<StoredContribution>,
}

#[derive(Debug, Serialize)]
pub struct ContributionResponse {
    pub contribution: StoredContribution,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
