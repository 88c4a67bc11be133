//! Database schema and types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS contributions (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    description TEXT NOT NULL,
    details TEXT NOT NULL,
    impact TEXT NOT NULL,
    priority TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_contributions_created ON contributions(created_at DESC);
";

/// What the user is contributing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionKind {
    ErrorReport,
    FeatureSuggestion,
}

impl ContributionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContributionKind::ErrorReport => "error_report",
            ContributionKind::FeatureSuggestion => "feature_suggestion",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "error_report" => Some(ContributionKind::ErrorReport),
            "feature_suggestion" => Some(ContributionKind::FeatureSuggestion),
            _ => None,
        }
    }
}

impl fmt::Display for ContributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured contribution as produced by the structuring call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecord {
    #[serde(rename = "type")]
    pub kind: ContributionKind,
    pub description: String,
    pub details: String,
    pub impact: String,
    pub priority: Priority,
}

/// A contribution as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContribution {
    pub id: String,
    #[serde(flatten)]
    pub record: ContributionRecord,
    pub created_at: DateTime<Utc>,
}
