//! Contract template catalog
//!
//! A fixed, ordered list of contract templates loaded once at startup.
//! Templates are addressed by zero-based position or by exact name.

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;
use thiserror::Error;

/// Built-in catalog, in selection order
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("Rent Sublet Agreement", include_str!("../templates/rent_sublet.md")),
    ("Non-Disclosure Agreement", include_str!("../templates/nda.md")),
    ("Freelance Services Contract", include_str!("../templates/freelance.md")),
    (
        "Project Collaboration Agreement",
        include_str!("../templates/project_collaboration.md"),
    ),
    ("Service Agreement", include_str!("../templates/service_agreement.md")),
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template position {position} out of range (catalog has {len} entries)")]
    OutOfRange { position: i64, len: usize },
    #[error("Failed to read template catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid template catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Template catalog is empty")]
    Empty,
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateEntry {
    pub id: usize,
    pub name: String,
    pub body: String,
}

/// On-disk catalog entry; ids come from file order
#[derive(Debug, Deserialize)]
struct CatalogFileEntry {
    name: String,
    body: String,
}

/// Read-only, ordered template catalog
#[derive(Debug, Clone)]
pub struct TemplateIndex {
    entries: Vec<TemplateEntry>,
}

impl TemplateIndex {
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN_TEMPLATES
                .iter()
                .map(|(name, body)| ((*name).to_string(), (*body).to_string())),
        )
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let entries = entries
            .into_iter()
            .enumerate()
            .map(|(id, (name, body))| TemplateEntry { id, name, body })
            .collect();
        Self { entries }
    }

    /// Load a catalog from a JSON array of `{ "name", "body" }` objects
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let raw = std::fs::read_to_string(path)?;
        let parsed: Vec<CatalogFileEntry> = serde_json::from_str(&raw)?;
        if parsed.is_empty() {
            return Err(TemplateError::Empty);
        }
        Ok(Self::from_entries(
            parsed.into_iter().map(|e| (e.name, e.body)),
        ))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    /// Bounds-checked lookup by zero-based position
    pub fn by_position(&self, position: usize) -> Result<&TemplateEntry, TemplateError> {
        self.entries
            .get(position)
            .ok_or_else(|| TemplateError::OutOfRange {
                position: i64::try_from(position).unwrap_or(i64::MAX),
                len: self.entries.len(),
            })
    }

    /// Case-sensitive exact name lookup
    pub fn by_name(&self, name: &str) -> Option<&TemplateEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Numbered listing used by the template selection prompt
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = writeln!(out, "{}: {}", entry.id, entry.name);
        }
        out
    }

    /// Resolve a parsed selection to template context text.
    ///
    /// A name that is not in the catalog is passed through verbatim as
    /// free-text context.
    pub fn resolve(&self, selection: &TemplateSelection) -> Result<String, TemplateError> {
        match selection {
            TemplateSelection::Position(position) => {
                let index = usize::try_from(*position).map_err(|_| TemplateError::OutOfRange {
                    position: *position,
                    len: self.entries.len(),
                })?;
                Ok(self.by_position(index)?.body.clone())
            }
            TemplateSelection::Name(name) => Ok(self
                .by_name(name)
                .map_or_else(|| name.clone(), |entry| entry.body.clone())),
        }
    }
}

/// Template selection as returned by the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSelection {
    Position(i64),
    Name(String),
}

impl TemplateSelection {
    /// Integer output selects by position; anything else is a name.
    /// Blank output resolves to nothing.
    ///
    /// Integers beyond `i64` saturate, so they still resolve out of range.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let selection = parse_position(trimmed)
            .map_or_else(|| Self::Name(trimmed.to_string()), Self::Position);
        Some(selection)
    }
}

/// Optionally signed decimal integer, saturating at the `i64` bounds
fn parse_position(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(match digits.parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    })
}
