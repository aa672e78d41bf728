//! Selector options and the option extractor.

use serde::{Deserialize, Serialize};

use super::dedup::{dedup_by_full_pattern, dedup_by_value};
use super::triple::Triple;

/// A `{value, label}` pair fed to a selector control.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Option whose label is its value, the shape used throughout the registry.
    pub fn same(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            value: text.clone(),
            label: text,
        }
    }
}

impl From<&Triple> for SelectOption {
    /// Relationship option keyed by the full pattern.
    fn from(triple: &Triple) -> Self {
        Self::new(triple.value(), triple.label())
    }
}

/// Node and relationship options derived from a set of triples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedOptions {
    pub node_label_options: Vec<SelectOption>,
    pub relationship_type_options: Vec<SelectOption>,
}

/// Derive deduplicated options from `triples`, in first-seen order.
///
/// Node labels are deduplicated by name across sources and targets.
/// Relationship options are one per distinct `(source, type, target)`.
pub fn extract_options<'a>(triples: impl IntoIterator<Item = &'a Triple>) -> ExtractedOptions {
    let mut nodes = Vec::new();
    let mut rels = Vec::new();

    for triple in triples {
        nodes.push(SelectOption::same(triple.source()));
        nodes.push(SelectOption::same(triple.target()));
        rels.push(SelectOption::from(triple));
    }

    ExtractedOptions {
        node_label_options: dedup_by_value(nodes),
        relationship_type_options: dedup_by_full_pattern(rels),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str, r: &str, g: &str) -> Triple {
        Triple::new(s, r, g).unwrap()
    }

    #[test]
    fn test_extract_options() {
        let triples = vec![
            t("Person", "WORKS_FOR", "Company"),
            t("Company", "OWNS", "Product"),
            t("Person", "KNOWS", "Person"),
            t("Team", "WORKS_FOR", "Company"),
        ];
        let opts = extract_options(&triples);

        let nodes: Vec<_> = opts.node_label_options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(nodes, ["Person", "Company", "Product", "Team"]);

        // WORKS_FOR appears twice with different endpoints: both kept.
        assert_eq!(opts.relationship_type_options.len(), 4);
        assert_eq!(
            opts.relationship_type_options[3],
            SelectOption::new("Team,WORKS_FOR,Company", "Team -[:WORKS_FOR]-> Company")
        );
    }

    #[test]
    fn test_extract_is_deterministic() {
        let triples = vec![t("A", "R", "B"), t("B", "R", "A"), t("A", "R", "B")];
        let first = extract_options(&triples);
        let second = extract_options(&triples);
        assert_eq!(first, second);
        assert_eq!(first.relationship_type_options.len(), 2);
    }

    #[test]
    fn test_extract_empty() {
        let opts = extract_options(std::iter::empty::<&Triple>());
        assert!(opts.node_label_options.is_empty());
        assert!(opts.relationship_type_options.is_empty());
    }

    #[test]
    fn test_serde_camel_case() {
        let opts = extract_options(&[t("A", "R", "B")]);
        let json = serde_json::to_value(&opts).unwrap();
        assert!(json.get("nodeLabelOptions").is_some());
        assert!(json.get("relationshipTypeOptions").is_some());
    }
}
