//! Error types for the schema registry.

use std::fmt;

use thiserror::Error;

/// Which builder field a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Source node label.
    Source,
    /// Relationship type.
    Type,
    /// Target node label.
    Target,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Source => "source",
            Self::Type => "type",
            Self::Target => "target",
        };
        f.write_str(name)
    }
}

/// Why a builder value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// Empty after trimming.
    Empty,
    /// Contains a comma, which would break the `source,type,target` key.
    ContainsComma,
    /// Contains a line break or other control character.
    ControlCharacter,
    /// Contains an arrow delimiter (`-[:` or `]->`) of the pattern grammar.
    ArrowDelimiter,
}

/// A field-level data-entry failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.message())]
pub struct ValidationError {
    /// The offending field.
    pub field: Field,
    /// The rule that was violated.
    pub kind: ValidationKind,
}

impl ValidationError {
    /// The user-facing message shown next to the field.
    pub fn message(&self) -> &'static str {
        match self.kind {
            ValidationKind::Empty => "Value Must Not Be Empty",
            ValidationKind::ContainsComma => "Please enter text without commas",
            ValidationKind::ControlCharacter => "Please enter text on a single line",
            ValidationKind::ArrowDelimiter => "Please enter text without -[: or ]->",
        }
    }
}

/// How loudly a failure should be surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational notice, nothing went wrong.
    Info,
    /// The user has to correct their input.
    Warning,
    /// The operation failed.
    Error,
}

/// Registry error type.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A builder field failed validation.
    #[error("invalid {}: {}", .0.field, .0.message())]
    Validation(#[from] ValidationError),

    /// The pattern is already present in the target list.
    #[error("Pattern Already Exists: {label}")]
    DuplicatePattern {
        /// Display string of the rejected pattern.
        label: String,
    },

    /// A predefined schema name is not in the catalog.
    #[error("unknown predefined schema: {0}")]
    UnknownSchema(String),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Filesystem access failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The persistence gateway could not complete the request.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl RegistryError {
    /// Severity used to pick how the failure is presented.
    pub fn severity(&self) -> Severity {
        match self {
            Self::DuplicatePattern { .. } => Severity::Info,
            Self::Validation(_) | Self::UnknownSchema(_) => Severity::Warning,
            Self::Json(_) | Self::Yaml(_) | Self::Io(_) | Self::Persistence(_) => Severity::Error,
        }
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
