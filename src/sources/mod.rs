//! Inbound pattern sources.
//!
//! Database introspection, text extraction, predefined catalogs and JSON
//! imports all end up as a list of pattern strings handed to the registry.
//! Fetching is asynchronous; applying is not. [`load_origin`] takes a
//! [`LoadTicket`](crate::schema::LoadTicket) before awaiting the fetch so a
//! slow, older load can never overwrite a newer one.

pub mod catalog;
pub mod import;

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::schema::{LoadOutcome, Origin, SharedRegistry};

// =============================================================================
// Source Trait
// =============================================================================

/// Something that yields raw pattern strings.
#[async_trait]
pub trait TripletSource: Send + Sync {
    /// Fetch the raw patterns. Malformed entries are allowed.
    async fn fetch(&self) -> Result<Vec<String>>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

// =============================================================================
// Implementations
// =============================================================================

/// Patterns already held in memory.
#[derive(Debug, Clone)]
pub struct StaticTripletSource {
    name: String,
    patterns: Vec<String>,
}

impl StaticTripletSource {
    pub fn new(name: impl Into<String>, patterns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            patterns,
        }
    }
}

#[async_trait]
impl TripletSource for StaticTripletSource {
    async fn fetch(&self) -> Result<Vec<String>> {
        Ok(self.patterns.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Result of a schema-from-text extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextExtraction {
    /// Compact-form triplets, `Source-TYPE->Target`.
    pub triplets: Vec<String>,
    /// The input text was itself a schema description rather than prose.
    #[serde(default)]
    pub is_schema_description: bool,
}

#[async_trait]
impl TripletSource for TextExtraction {
    async fn fetch(&self) -> Result<Vec<String>> {
        Ok(self.triplets.clone())
    }

    fn name(&self) -> &str {
        if self.is_schema_description {
            "text:schema"
        } else {
            "text"
        }
    }
}

/// Patterns stored in a file.
///
/// Accepted shapes: a JSON array of strings, a [`TextExtraction`] JSON
/// object, or one pattern per line (`#` starts a comment line).
#[derive(Debug, Clone)]
pub struct FileTripletSource {
    path: PathBuf,
    name: String,
}

impl FileTripletSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl TripletSource for FileTripletSource {
    async fn fetch(&self) -> Result<Vec<String>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        parse_pattern_list(&text)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Split a pattern document into raw entries.
pub fn parse_pattern_list(text: &str) -> Result<Vec<String>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }
    if trimmed.starts_with('{') {
        let extraction: TextExtraction = serde_json::from_str(trimmed)?;
        return Ok(extraction.triplets);
    }
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

// =============================================================================
// Loading
// =============================================================================

/// Fetch from `source` and replace `origin` with the result.
///
/// A failed fetch leaves the registry untouched and returns the error.
pub async fn load_origin(
    registry: &SharedRegistry,
    origin: Origin,
    source: &dyn TripletSource,
) -> Result<LoadOutcome> {
    let ticket = registry.begin_load(origin);

    let patterns = match source.fetch().await {
        Ok(patterns) => patterns,
        Err(e) => {
            warn!(
                name: "schema.load.failed",
                origin = %origin,
                source = source.name(),
                error = %e,
                "Pattern source failed; registry unchanged"
            );
            return Err(e);
        }
    };

    let outcome = registry.apply_load(ticket, &patterns);
    info!(
        name: "schema.load.finished",
        origin = %origin,
        source = source.name(),
        received = patterns.len(),
        outcome = ?outcome,
        "Pattern source loaded"
    );
    Ok(outcome)
}
