//! Parsing and identifying user contributions

use crate::db::{ContributionRecord, DbError};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContributionError {
    #[error("Malformed contribution: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to persist contribution: {0}")]
    Persist(#[from] DbError),
}

/// Build a record id from the creation time.
///
/// Nanosecond resolution; colons are replaced so the id is safe in paths and URLs.
pub fn contribution_id(now: DateTime<Utc>) -> String {
    let stamp = now.format("%Y-%m-%dT%H:%M:%S%.9fZ").to_string();
    format!("contribution_{}", stamp.replace(':', "-"))
}

/// Parse structuring output into a record.
///
/// Accepts a bare JSON object, optionally wrapped in a single code fence.
pub fn parse_contribution(raw: &str) -> Result<ContributionRecord, ContributionError> {
    let json = strip_code_fence(raw.trim());
    Ok(serde_json::from_str(json)?)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```").and_then(|t| t.strip_suffix("```")) else {
        return text;
    };
    // Drop an info string such as `json` on the opening line
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with('{') => body.trim(),
        _ => inner.trim(),
    }
}
