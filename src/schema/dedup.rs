//! Option de-duplication.
//!
//! Node options and relationship options are both keyed by `value`, but the
//! key means different things: a node option's value is a bare label, a
//! relationship option's value is the full `source,type,target` tuple. Two
//! relationships sharing a type between different endpoint pairs therefore
//! stay distinct.

use std::collections::HashSet;

use super::options::SelectOption;

/// Keep the first option for every distinct `value`.
pub fn dedup_by_value(options: impl IntoIterator<Item = SelectOption>) -> Vec<SelectOption> {
    let mut seen = HashSet::new();
    options
        .into_iter()
        .filter(|opt| seen.insert(opt.value.clone()))
        .collect()
}

/// Keep the first relationship option for every distinct full pattern.
///
/// The option's `value` must already encode `source,type,target`.
pub fn dedup_by_full_pattern(
    options: impl IntoIterator<Item = SelectOption>,
) -> Vec<SelectOption> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for opt in options {
        if !seen.contains(&opt.value) {
            seen.insert(opt.value.clone());
            out.push(opt);
        }
    }
    out
}

/// `previous ∪ additions`, previous entries first.
pub fn union_by_value(previous: &[SelectOption], additions: &[SelectOption]) -> Vec<SelectOption> {
    dedup_by_value(previous.iter().chain(additions).cloned())
}
