//! Contract artifact extraction
//!
//! Generated replies may carry a drafted contract inside a fenced block:
//!
//! ````text
//! ```contract
//! BODY
//! ```
//! ````
//!
//! Grammar: the opening marker is the first occurrence of ```` ```contract ````,
//! the closing marker is the first bare ```` ``` ```` after it. Only the first
//! block is consumed. An opening marker with no closing marker is not a block.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const OPEN_MARKER: &str = "```contract";
const CLOSE_MARKER: &str = "```";

pub const INITIAL_VERSION: &str = "1.0";

/// Lifecycle of a drafted contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    Draft,
}

impl ArtifactStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactStatus::Draft => "draft",
        }
    }
}

/// A contract drafted by the generation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractArtifact {
    pub content: String,
    pub editable: bool,
    pub status: ArtifactStatus,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub version: String,
}

impl ContractArtifact {
    pub fn draft(content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            editable: true,
            status: ArtifactStatus::Draft,
            created_at: now,
            last_modified: now,
            version: INITIAL_VERSION.to_string(),
        }
    }
}

/// Result of scanning generated text for a contract block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Reply text with the block removed (or the input unchanged when absent)
    pub cleaned: String,
    /// Trimmed contract body, when a block was found
    pub content: Option<String>,
}

/// Byte span of the first fenced contract block
struct FenceSpan {
    start: usize,
    body_start: usize,
    body_end: usize,
    end: usize,
}

fn find_fence(text: &str) -> Option<FenceSpan> {
    let start = text.find(OPEN_MARKER)?;
    let body_start = start + OPEN_MARKER.len();
    let rest = text.get(body_start..)?;
    let close_offset = rest.find(CLOSE_MARKER)?;
    let body_end = body_start + close_offset;
    Some(FenceSpan {
        start,
        body_start,
        body_end,
        end: body_end + CLOSE_MARKER.len(),
    })
}

/// Split generated text into conversational remainder and contract body.
///
/// Pure and deterministic. When no block is present the text is returned
/// unmodified, so extraction on already-cleaned text is a no-op.
pub fn extract(text: &str) -> Extraction {
    let Some(span) = find_fence(text) else {
        return Extraction {
            cleaned: text.to_string(),
            content: None,
        };
    };

    let body = text.get(span.body_start..span.body_end).unwrap_or_default();
    let before = text.get(..span.start).unwrap_or_default();
    let after = text.get(span.end..).unwrap_or_default();

    Extraction {
        cleaned: format!("{before}{after}").trim().to_string(),
        content: Some(body.trim().to_string()),
    }
}

/// Extract and wrap the contract body as a fresh draft artifact
pub fn extract_artifact(text: &str, now: DateTime<Utc>) -> (String, Option<ContractArtifact>) {
    let extraction = extract(text);
    let artifact = extraction
        .content
        .map(|content| ContractArtifact::draft(content, now));
    (extraction.cleaned, artifact)
}
