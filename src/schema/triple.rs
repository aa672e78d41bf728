//! Triple parsing and formatting.
//!
//! Two textual shapes reach the registry:
//!
//! - arrow form, `Person -[:WORKS_FOR]-> Company`, produced by the builder,
//!   predefined catalogs and JSON imports;
//! - compact form, `Person-WORKS_FOR->Company`, returned by database
//!   introspection and text extraction.
//!
//! [`parse_pattern`] accepts both; [`Triple::label`] always renders the arrow
//! form, so every stored pattern string is in arrow form.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Field, ValidationError, ValidationKind};

static ARROW_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?) -\[:(.+?)\]-> (.+)$").unwrap());

static COMPACT_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)-([A-Z_]+)->(.+)$").unwrap());

/// One `(source, type, target)` edge pattern of a graph schema.
///
/// `value` and `label` are derived on demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "TripleFields")]
pub struct Triple {
    source: String,
    rel_type: String,
    target: String,
}

#[derive(Deserialize)]
struct TripleFields {
    source: String,
    #[serde(rename = "type")]
    rel_type: String,
    target: String,
}

impl TryFrom<TripleFields> for Triple {
    type Error = ValidationError;

    fn try_from(fields: TripleFields) -> Result<Self, Self::Error> {
        Self::new(&fields.source, &fields.rel_type, &fields.target)
    }
}

impl Serialize for Triple {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct Repr<'a> {
            source: &'a str,
            #[serde(rename = "type")]
            rel_type: &'a str,
            target: &'a str,
            value: String,
            label: String,
        }

        Repr {
            source: &self.source,
            rel_type: &self.rel_type,
            target: &self.target,
            value: self.value(),
            label: self.label(),
        }
        .serialize(serializer)
    }
}

impl Triple {
    /// Build a triple from three user-supplied values.
    ///
    /// Each value is trimmed and checked by [`validate_field`]. The result
    /// always reads back from its own label: `parse_pattern(&t.label()) == Some(t)`.
    pub fn new(source: &str, rel_type: &str, target: &str) -> Result<Self, ValidationError> {
        let triple = Self {
            source: validate_field(Field::Source, source)?,
            rel_type: validate_field(Field::Type, rel_type)?,
            target: validate_field(Field::Target, target)?,
        };

        let label = triple.label();
        let parts = (
            triple.source.as_str(),
            triple.rel_type.as_str(),
            triple.target.as_str(),
        );
        if split_pattern(&label) != Some(parts) {
            return Err(ValidationError {
                field: Field::Type,
                kind: ValidationKind::ArrowDelimiter,
            });
        }
        Ok(triple)
    }

    /// Source node label.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Relationship type.
    pub fn rel_type(&self) -> &str {
        &self.rel_type
    }

    /// Target node label.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Canonical key, `source,type,target`.
    pub fn value(&self) -> String {
        format_pattern(&self.source, &self.rel_type, &self.target).value
    }

    /// Canonical display string, `source -[:type]-> target`.
    pub fn label(&self) -> String {
        format_pattern(&self.source, &self.rel_type, &self.target).label
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[:{}]-> {}", self.source, self.rel_type, self.target)
    }
}

/// The `{value, label}` pair identifying a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternKey {
    /// `source,type,target`
    pub value: String,
    /// `source -[:type]-> target`
    pub label: String,
}

/// Render the key of a pattern. No validation happens here.
pub fn format_pattern(source: &str, rel_type: &str, target: &str) -> PatternKey {
    PatternKey {
        value: format!("{source},{rel_type},{target}"),
        label: format!("{source} -[:{rel_type}]-> {target}"),
    }
}

/// Parse a pattern in arrow or compact form.
///
/// Returns `None` for anything that does not match either grammar, and for
/// matches with an empty or comma-bearing part.
pub fn parse_pattern(display: &str) -> Option<Triple> {
    let (source, rel_type, target) = split_pattern(display)?;
    Triple::new(source, rel_type, target).ok()
}

/// Trimmed `(source, type, target)` captures, without validation.
fn split_pattern(display: &str) -> Option<(&str, &str, &str)> {
    let caps = ARROW_FORM
        .captures(display)
        .or_else(|| COMPACT_FORM.captures(display))?;

    let part = |i: usize| caps.get(i).map(|m| m.as_str().trim());
    Some((part(1)?, part(2)?, part(3)?))
}

/// Parse every entry, silently dropping the malformed ones.
pub fn parse_all<I, S>(patterns: I) -> Vec<Triple>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    patterns
        .into_iter()
        .filter_map(|p| {
            let parsed = parse_pattern(p.as_ref());
            if parsed.is_none() {
                tracing::debug!(
                    name: "schema.pattern.unparseable",
                    pattern = %p.as_ref(),
                    "Dropping malformed pattern"
                );
            }
            parsed
        })
        .collect()
}

/// Validate one builder value, returning it trimmed.
///
/// Rejected: empty values, commas, control characters (line breaks included)
/// and the arrow delimiters `-[:` / `]->`.
pub fn validate_field(field: Field, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let kind = if trimmed.is_empty() {
        Some(ValidationKind::Empty)
    } else if trimmed.contains(',') {
        Some(ValidationKind::ContainsComma)
    } else if trimmed.chars().any(char::is_control) {
        Some(ValidationKind::ControlCharacter)
    } else if trimmed.contains("-[:") || trimmed.contains("]->") {
        Some(ValidationKind::ArrowDelimiter)
    } else {
        None
    };

    match kind {
        Some(kind) => Err(ValidationError { field, kind }),
        None => Ok(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arrow_form() {
        let t = parse_pattern("Person -[:WORKS_FOR]-> Company").unwrap();
        assert_eq!(t.source(), "Person");
        assert_eq!(t.rel_type(), "WORKS_FOR");
        assert_eq!(t.target(), "Company");
        assert_eq!(t.value(), "Person,WORKS_FOR,Company");
        assert_eq!(t.label(), "Person -[:WORKS_FOR]-> Company");
    }

    #[test]
    fn test_parse_compact_form() {
        let t = parse_pattern("Company-OWNS->Product").unwrap();
        assert_eq!(t.label(), "Company -[:OWNS]-> Product");

        // Lowercase types are not part of the compact grammar.
        assert!(parse_pattern("Company-owns->Product").is_none());
    }

    #[test]
    fn test_parse_trims_captures() {
        let t = parse_pattern("  Person  -[: KNOWS ]->  Person ").unwrap();
        assert_eq!(t.source(), "Person");
        assert_eq!(t.rel_type(), "KNOWS");
        assert_eq!(t.target(), "Person");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_pattern("").is_none());
        assert!(parse_pattern("not a valid pattern").is_none());
        assert!(parse_pattern("A -[:]-> B").is_none());
        assert!(parse_pattern("A -[:  ]-> B").is_none());
        assert!(parse_pattern("A,B -[:R]-> C").is_none());
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            ("Person", "WORKS_FOR", "Company"),
            ("Chunk", "HAS_ENTITY", "Document Section"),
            ("a", "b", "c"),
            ("Über", "GEHÖRT_ZU", "Straße"),
        ];
        for (s, r, t) in cases {
            let triple = Triple::new(s, r, t).unwrap();
            assert_eq!(parse_pattern(&triple.label()), Some(triple.clone()));
            assert_eq!(triple.to_string(), triple.label());
        }
    }

    #[test]
    fn test_validate_field() {
        assert_eq!(validate_field(Field::Source, "  Person ").unwrap(), "Person");

        let err = validate_field(Field::Type, "   ").unwrap_err();
        assert_eq!(err.kind, ValidationKind::Empty);
        assert_eq!(err.field, Field::Type);

        let err = validate_field(Field::Target, "A,B").unwrap_err();
        assert_eq!(err.kind, ValidationKind::ContainsComma);

        let err = validate_field(Field::Source, "First\nLast").unwrap_err();
        assert_eq!(err.kind, ValidationKind::ControlCharacter);
        let err = validate_field(Field::Source, "Tab\there").unwrap_err();
        assert_eq!(err.kind, ValidationKind::ControlCharacter);

        let err = validate_field(Field::Type, "R]-> B").unwrap_err();
        assert_eq!(err.kind, ValidationKind::ArrowDelimiter);
        let err = validate_field(Field::Source, "A -[:X").unwrap_err();
        assert_eq!(err.kind, ValidationKind::ArrowDelimiter);
    }

    #[test]
    fn test_delimiter_values_cannot_split() {
        // Each of these would render a label that parses back differently.
        let cases = [
            ("A", "R]-> B", "C"),
            ("A -[:X", "R", "C"),
            ("A", "R", "B -[:S]-> C"),
            ("First\nLast", "R", "C"),
            ("A", "R\r", "C\u{7}"),
        ];
        for (s, r, t) in cases {
            assert!(Triple::new(s, r, t).is_err(), "{s:?} {r:?} {t:?} accepted");
        }
    }

    #[test]
    fn test_accepted_values_round_trip() {
        let cases = [
            ("  Padded  ", " R ", " Target "),
            ("A-", "R]", "-B"),
            ("A ->", "[R", "> B"),
            ("A -[", ":R", "]- B"),
            ("Mixed-Case->Name", "lower", "X"),
        ];
        for (s, r, t) in cases {
            let triple = Triple::new(s, r, t).unwrap();
            assert_eq!(parse_pattern(&triple.label()), Some(triple.clone()));
        }
    }

    #[test]
    fn test_parse_all_drops_malformed() {
        let triples = parse_all(["not a valid pattern", "X-KNOWS->Y"]);
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].label(), "X -[:KNOWS]-> Y");
    }

    #[test]
    fn test_serde_shape() {
        let t = Triple::new("A", "R", "B").unwrap();
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["type"], "R");
        assert_eq!(json["value"], "A,R,B");
        assert_eq!(json["label"], "A -[:R]-> B");

        let back: Triple = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);

        let bad = serde_json::json!({"source": "", "type": "R", "target": "B"});
        assert!(serde_json::from_value::<Triple>(bad).is_err());
    }
}
