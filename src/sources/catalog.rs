//! Predefined schema catalog.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::schema::triple::parse_all;

const BUILTIN_CATALOG: &str = include_str!("../../assets/predefined_schemas.json");

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredefinedSchema {
    /// Catalog key, e.g. `healthcare`.
    pub schema: String,
    /// Node labels of the schema, for display.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Relationship patterns in compact form, `Source-TYPE->Target`.
    #[serde(default)]
    pub relationship_types: Vec<String>,
}

impl PredefinedSchema {
    /// Arrow-form patterns of this schema; malformed entries are skipped.
    pub fn patterns(&self) -> Vec<String> {
        parse_all(&self.relationship_types)
            .iter()
            .map(|t| t.label())
            .collect()
    }
}

/// A list of predefined schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaCatalog {
    schemas: Vec<PredefinedSchema>,
}

impl SchemaCatalog {
    /// The catalog bundled with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a catalog file; `.yaml`/`.yml` files are read as YAML, anything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&text),
            _ => Self::from_json(&text),
        }
    }

    pub fn schemas(&self) -> &[PredefinedSchema] {
        &self.schemas
    }

    pub fn names(&self) -> Vec<&str> {
        self.schemas.iter().map(|s| s.schema.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&PredefinedSchema> {
        self.schemas.iter().find(|s| s.schema == name)
    }

    /// Union of the patterns of the named schemas, in request order.
    pub fn patterns_for<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for name in names {
            let name = name.as_ref();
            let schema = self
                .get(name)
                .ok_or_else(|| RegistryError::UnknownSchema(name.to_string()))?;
            out.extend(
                schema
                    .patterns()
                    .into_iter()
                    .filter(|p| seen.insert(p.clone())),
            );
        }
        Ok(out)
    }
}
