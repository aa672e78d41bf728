//! Pattern provenance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a set of patterns came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Drawn by the user in the pattern builder
    User,
    /// Introspected from the connected graph database
    Database,
    /// Extracted from free text
    Text,
    /// Chosen from the predefined schema catalog
    Predefined,
    /// Resolved from an imported graph-schema document
    Imported,
}

impl Origin {
    /// Every origin, in slot order.
    pub const ALL: [Self; 5] = [
        Self::User,
        Self::Database,
        Self::Text,
        Self::Predefined,
        Self::Imported,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Database => "database",
            Self::Text => "text",
            Self::Predefined => "predefined",
            Self::Imported => "imported",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown origin: {s}"))
    }
}
