//! Source / type / target projections for the pattern builder.

use serde::{Deserialize, Serialize};

use super::dedup::{dedup_by_value, union_by_value};
use super::options::SelectOption;
use super::triple::parse_all;
use crate::error::Field;

/// The three flat option lists behind the builder's selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderOptions {
    pub source_options: Vec<SelectOption>,
    pub type_options: Vec<SelectOption>,
    pub target_options: Vec<SelectOption>,
}

impl BuilderOptions {
    pub fn is_empty(&self) -> bool {
        self.source_options.is_empty()
            && self.type_options.is_empty()
            && self.target_options.is_empty()
    }

    /// Options of one selector.
    pub fn field(&self, field: Field) -> &[SelectOption] {
        match field {
            Field::Source => &self.source_options,
            Field::Type => &self.type_options,
            Field::Target => &self.target_options,
        }
    }

    /// Union the projections of `patterns` into the current lists.
    ///
    /// Values already present keep their position, so anything typed earlier
    /// stays selectable. Idempotent.
    pub fn merge_derived<S: AsRef<str>>(&mut self, patterns: &[S]) {
        let derived = derive_builder_options(patterns);
        self.source_options = union_by_value(&self.source_options, &derived.source_options);
        self.type_options = union_by_value(&self.type_options, &derived.type_options);
        self.target_options = union_by_value(&self.target_options, &derived.target_options);
    }

    /// Record a value the user typed into one selector.
    pub(crate) fn insert(&mut self, field: Field, option: SelectOption) {
        let list = match field {
            Field::Source => &mut self.source_options,
            Field::Type => &mut self.type_options,
            Field::Target => &mut self.target_options,
        };
        if !list.iter().any(|o| o.value == option.value) {
            list.push(option);
        }
    }
}

/// Distinct sources, types and targets of `patterns`, in pattern order.
///
/// Malformed entries are skipped.
pub fn derive_builder_options<S: AsRef<str>>(patterns: &[S]) -> BuilderOptions {
    let triples = parse_all(patterns);
    BuilderOptions {
        source_options: dedup_by_value(triples.iter().map(|t| SelectOption::same(t.source()))),
        type_options: dedup_by_value(triples.iter().map(|t| SelectOption::same(t.rel_type()))),
        target_options: dedup_by_value(triples.iter().map(|t| SelectOption::same(t.target()))),
    }
}
