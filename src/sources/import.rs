//! Graph-schema document import.
//!
//! Resolves the `$id` / `$ref` cross references of a data-importer style
//! graph schema into `(source, type, target)` patterns:
//!
//! ```json
//! {
//!   "nodeLabels": [{"$id": "nl:0", "token": "Person"}],
//!   "relationshipTypes": [{"$id": "rt:0", "token": "KNOWS"}],
//!   "nodeObjectTypes": [{"$id": "n:0", "labels": [{"$ref": "#nl:0"}]}],
//!   "relationshipObjectTypes": [
//!     {"$id": "r:0", "type": {"$ref": "#rt:0"}, "from": {"$ref": "#n:0"}, "to": {"$ref": "#n:0"}}
//!   ]
//! }
//! ```
//!
//! The schema may sit at the top level or be nested under
//! `dataModel.graphSchemaRepresentation.graphSchema` /
//! `graphSchemaRepresentation.graphSchema`.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::schema::Triple;

#[derive(Debug, Clone, Deserialize)]
pub struct Reference {
    #[serde(rename = "$ref")]
    pub target: String,
}

impl Reference {
    fn id(&self) -> &str {
        self.target.strip_prefix('#').unwrap_or(&self.target)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    #[serde(rename = "$id")]
    pub id: String,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeObjectType {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub labels: Vec<Reference>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipObjectType {
    #[serde(rename = "$id", default)]
    pub id: String,
    #[serde(rename = "type")]
    pub rel_type: Reference,
    pub from: Reference,
    pub to: Reference,
}

/// The resolved-reference part of a graph-schema document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSchema {
    #[serde(default)]
    pub node_labels: Vec<Token>,
    #[serde(default)]
    pub relationship_types: Vec<Token>,
    #[serde(default)]
    pub node_object_types: Vec<NodeObjectType>,
    #[serde(default)]
    pub relationship_object_types: Vec<RelationshipObjectType>,
}

impl GraphSchema {
    /// Locate and decode the graph schema inside an import document.
    pub fn from_document(document: &Value) -> Result<Self> {
        let nested = document
            .pointer("/dataModel/graphSchemaRepresentation/graphSchema")
            .or_else(|| document.pointer("/graphSchemaRepresentation/graphSchema"))
            .unwrap_or(document);
        Ok(GraphSchema::deserialize(nested)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_document(&document)
    }

    /// Arrow-form patterns, one per resolvable relationship object type.
    ///
    /// Relationships with a dangling reference or an unusable token are
    /// skipped and logged.
    pub fn patterns(&self) -> Vec<String> {
        let labels: HashMap<&str, &str> = self
            .node_labels
            .iter()
            .map(|t| (t.id.as_str(), t.token.as_str()))
            .collect();
        let rel_types: HashMap<&str, &str> = self
            .relationship_types
            .iter()
            .map(|t| (t.id.as_str(), t.token.as_str()))
            .collect();
        // A node object type is named after its first label.
        let nodes: HashMap<&str, &str> = self
            .node_object_types
            .iter()
            .filter_map(|n| {
                let label = n.labels.first()?;
                Some((n.id.as_str(), *labels.get(label.id())?))
            })
            .collect();

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for rel in &self.relationship_object_types {
            let resolved = (
                nodes.get(rel.from.id()),
                rel_types.get(rel.rel_type.id()),
                nodes.get(rel.to.id()),
            );
            let (Some(source), Some(rel_type), Some(target)) = resolved else {
                warn!(
                    name: "schema.import.unresolved",
                    relationship = %rel.id,
                    "Skipping relationship with unresolved reference"
                );
                continue;
            };
            match Triple::new(source, rel_type, target) {
                Ok(triple) => {
                    let label = triple.label();
                    if seen.insert(label.clone()) {
                        out.push(label);
                    }
                }
                Err(e) => warn!(
                    name: "schema.import.invalid",
                    relationship = %rel.id,
                    error = %e,
                    "Skipping relationship with invalid token"
                ),
            }
        }
        out
    }
}

/// Parse an import document straight to patterns.
pub fn import_patterns(text: &str) -> Result<Vec<String>> {
    Ok(GraphSchema::from_json(text)?.patterns())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;

    const DOC: &str = r##"{
        "version": "2.3.1",
        "dataModel": {
            "graphSchemaRepresentation": {
                "graphSchema": {
                    "nodeLabels": [
                        {"$id": "nl:0", "token": "Person"},
                        {"$id": "nl:1", "token": "Company"}
                    ],
                    "relationshipTypes": [
                        {"$id": "rt:0", "token": "WORKS_FOR"},
                        {"$id": "rt:1", "token": "KNOWS"}
                    ],
                    "nodeObjectTypes": [
                        {"$id": "n:0", "labels": [{"$ref": "#nl:0"}]},
                        {"$id": "n:1", "labels": [{"$ref": "#nl:1"}]}
                    ],
                    "relationshipObjectTypes": [
                        {"$id": "r:0", "type": {"$ref": "#rt:0"}, "from": {"$ref": "#n:0"}, "to": {"$ref": "#n:1"}},
                        {"$id": "r:1", "type": {"$ref": "#rt:1"}, "from": {"$ref": "#n:0"}, "to": {"$ref": "#n:0"}},
                        {"$id": "r:2", "type": {"$ref": "#rt:9"}, "from": {"$ref": "#n:0"}, "to": {"$ref": "#n:1"}}
                    ]
                }
            }
        }
    }"##;

    #[test]
    fn test_resolves_nested_document() {
        let patterns = import_patterns(DOC).unwrap();
        assert_eq!(
            patterns,
            ["Person -[:WORKS_FOR]-> Company", "Person -[:KNOWS]-> Person"]
        );
    }

    #[test]
    fn test_top_level_schema() {
        let doc = r##"{
            "nodeLabels": [{"$id": "a", "token": "A"}],
            "relationshipTypes": [{"$id": "t", "token": "T"}],
            "nodeObjectTypes": [{"$id": "na", "labels": [{"$ref": "#a"}]}],
            "relationshipObjectTypes": [{"type": {"$ref": "#t"}, "from": {"$ref": "#na"}, "to": {"$ref": "#na"}}]
        }"##;
        assert_eq!(import_patterns(doc).unwrap(), ["A -[:T]-> A"]);
    }

    #[test]
    fn test_invalid_json() {
        let err = import_patterns("{ nope").unwrap_err();
        assert!(matches!(err, RegistryError::Json(_)));
    }

    #[test]
    fn test_comma_token_skipped() {
        let doc = r##"{
            "nodeLabels": [{"$id": "a", "token": "A,B"}],
            "relationshipTypes": [{"$id": "t", "token": "T"}],
            "nodeObjectTypes": [{"$id": "na", "labels": [{"$ref": "#a"}]}],
            "relationshipObjectTypes": [{"type": {"$ref": "#t"}, "from": {"$ref": "#na"}, "to": {"$ref": "#na"}}]
        }"##;
        assert!(import_patterns(doc).unwrap().is_empty());
    }
}
