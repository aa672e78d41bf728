//! Multi-origin pattern store.
//!
//! Every [`Origin`] owns a [`PatternSet`]; the combined view is the union of
//! all origins by pattern display string. Pattern lists are newest first.
//! Option lists are in first-appearance order, oldest first, so adding a
//! pattern appends its new labels to the end of the existing options.
//!
//! Removal always re-derives options from the remaining patterns: a label
//! can be shared by several triples, so subtracting one triple's endpoints
//! is not safe.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::dedup::{dedup_by_full_pattern, union_by_value};
use super::options::{SelectOption, extract_options};
use super::origin::Origin;
use super::projection::BuilderOptions;
use super::triple::{Triple, parse_all};
use crate::error::{RegistryError, Result};

const ORIGINS: usize = Origin::ALL.len();

/// Patterns plus the options derived from them.
///
/// Only built through [`PatternSet::from_patterns`], so nodes and rels always
/// match the pattern list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternSet {
    patterns: Vec<String>,
    nodes: Vec<SelectOption>,
    rels: Vec<SelectOption>,
}

/// The union of every origin's patterns.
pub type CombinedView = PatternSet;

impl PatternSet {
    /// Build a set from arrow-form labels, deriving nodes and rels from scratch.
    pub fn from_patterns(patterns: Vec<String>) -> Self {
        if patterns.is_empty() {
            return Self::default();
        }
        let triples = parse_all(patterns.iter().rev());
        let extracted = extract_options(&triples);
        Self {
            patterns,
            nodes: extracted.node_label_options,
            rels: extracted.relationship_type_options,
        }
    }

    /// Pattern display strings, newest first.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Node label options.
    pub fn nodes(&self) -> &[SelectOption] {
        &self.nodes
    }

    /// Relationship options, one per distinct full pattern.
    pub fn rels(&self) -> &[SelectOption] {
        &self.rels
    }

    pub fn contains(&self, label: &str) -> bool {
        self.patterns.iter().any(|p| p == label)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Parsed triples, newest first.
    pub fn triples(&self) -> Vec<Triple> {
        parse_all(&self.patterns)
    }

    fn prepend(&mut self, triple: &Triple) {
        let extracted = extract_options(std::iter::once(triple));
        self.patterns.insert(0, triple.label());
        self.nodes = union_by_value(&self.nodes, &extracted.node_label_options);
        self.rels = dedup_by_full_pattern(
            self.rels
                .iter()
                .chain(&extracted.relationship_type_options)
                .cloned(),
        );
    }
}

/// Which lists an added pattern is checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateScope {
    /// Only the list of the origin being added to.
    #[default]
    Origin,
    /// The origin's list and the combined view.
    Combined,
}

/// A pattern accepted by [`PatternStore::add_pattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedPattern {
    pub origin: Origin,
    pub triple: Triple,
}

/// Sequence number taken before an asynchronous bulk load starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    origin: Origin,
    seq: u64,
}

impl LoadTicket {
    pub fn origin(&self) -> Origin {
        self.origin
    }
}

/// What happened to a ticketed bulk load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The origin was replaced with this many patterns.
    Applied(usize),
    /// A newer load (or a clear) already superseded this one.
    Stale,
    /// No valid pattern was produced; nothing changed.
    Empty,
}

/// Persistable form of a store: the patterns of every non-empty origin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    pub saved_at: DateTime<Utc>,
    pub origins: BTreeMap<Origin, Vec<String>>,
}

/// Registry state: one slot per origin and the combined view.
#[derive(Debug, Clone, Default)]
pub struct PatternStore {
    slots: [PatternSet; ORIGINS],
    combined: CombinedView,
    builder: BuilderOptions,
    duplicate_scope: DuplicateScope,
    highlighted: Option<String>,
    issued: [u64; ORIGINS],
    applied: [u64; ORIGINS],
}

impl PatternStore {
    pub fn new(duplicate_scope: DuplicateScope) -> Self {
        Self {
            duplicate_scope,
            ..Self::default()
        }
    }

    pub fn duplicate_scope(&self) -> DuplicateScope {
        self.duplicate_scope
    }

    /// Patterns and options of one origin.
    pub fn slot(&self, origin: Origin) -> &PatternSet {
        &self.slots[origin.index()]
    }

    pub fn combined(&self) -> &CombinedView {
        &self.combined
    }

    /// Source/type/target projections for the pattern builder.
    pub fn builder_options(&self) -> &BuilderOptions {
        &self.builder
    }

    pub(crate) fn builder_options_mut(&mut self) -> &mut BuilderOptions {
        &mut self.builder
    }

    /// The most recently added pattern, until the next structural change.
    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// Origins currently listing `label`.
    pub fn origins_of(&self, label: &str) -> Vec<Origin> {
        Origin::ALL
            .into_iter()
            .filter(|o| self.slot(*o).contains(label))
            .collect()
    }

    /// Add one pattern built from three selected options.
    ///
    /// The pattern goes to the top of the origin's list and of the combined
    /// view. Fails without touching state on invalid values or duplicates.
    pub fn add_pattern(
        &mut self,
        origin: Origin,
        source: &SelectOption,
        rel_type: &SelectOption,
        target: &SelectOption,
    ) -> Result<AddedPattern> {
        let triple = Triple::new(&source.value, &rel_type.value, &target.value)?;
        let label = triple.label();

        let duplicate = self.slot(origin).contains(&label)
            || (self.duplicate_scope == DuplicateScope::Combined
                && self.combined.contains(&label));
        if duplicate {
            info!(
                name: "schema.pattern.duplicate",
                origin = %origin,
                pattern = %label,
                "Pattern already exists"
            );
            return Err(RegistryError::DuplicatePattern { label });
        }

        self.slots[origin.index()].prepend(&triple);
        if !self.combined.contains(&label) {
            self.combined.prepend(&triple);
        }
        self.builder.merge_derived(std::slice::from_ref(&label));
        self.highlighted = Some(label);

        info!(
            name: "schema.pattern.added",
            origin = %origin,
            pattern = %triple,
            combined = self.combined.len(),
            "Pattern added"
        );

        Ok(AddedPattern { origin, triple })
    }

    /// Remove `label` from one origin. Returns `false` if it was not listed there.
    ///
    /// The combined view keeps the pattern while another origin still lists it.
    pub fn remove_pattern(&mut self, origin: Origin, label: &str) -> bool {
        let slot = &mut self.slots[origin.index()];
        if !slot.contains(label) {
            return false;
        }

        let remaining: Vec<String> = slot
            .patterns
            .iter()
            .filter(|p| *p != label)
            .cloned()
            .collect();
        *slot = PatternSet::from_patterns(remaining);

        if self.highlighted.as_deref() == Some(label) {
            self.highlighted = None;
        }
        self.reconcile();

        debug!(
            name: "schema.pattern.removed",
            origin = %origin,
            pattern = %label,
            "Pattern removed"
        );
        true
    }

    /// Remove `label` from every origin listing it, and so from the combined view.
    pub fn remove_everywhere(&mut self, label: &str) -> Vec<Origin> {
        let origins = self.origins_of(label);
        for origin in &origins {
            self.remove_pattern(*origin, label);
        }
        origins
    }

    /// Replace an origin's patterns with a freshly fetched batch.
    ///
    /// Malformed entries are dropped. A batch without a single valid pattern
    /// leaves the store untouched and returns 0. Pending load tickets for
    /// the origin become stale.
    pub fn replace_origin<S: AsRef<str>>(&mut self, origin: Origin, patterns: &[S]) -> usize {
        let i = origin.index();
        self.applied[i] = self.issued[i];
        self.replace_slot(origin, patterns)
    }

    /// Union a batch into an origin's existing patterns.
    ///
    /// New patterns go on top, in batch order. Returns how many were new.
    pub fn merge_origin<S: AsRef<str>>(&mut self, origin: Origin, patterns: &[S]) -> usize {
        let slot = self.slot(origin);
        let mut seen: HashSet<String> = slot.patterns.iter().cloned().collect();
        let additions: Vec<String> = parse_all(patterns)
            .iter()
            .map(Triple::label)
            .filter(|label| seen.insert(label.clone()))
            .collect();

        if additions.is_empty() {
            return 0;
        }

        let added = additions.len();
        let merged = additions
            .into_iter()
            .chain(slot.patterns.iter().cloned())
            .collect();
        self.slots[origin.index()] = PatternSet::from_patterns(merged);
        self.highlighted = None;
        self.reconcile();
        let combined = self.combined.patterns.clone();
        self.builder.merge_derived(&combined);

        info!(
            name: "schema.origin.merged",
            origin = %origin,
            added,
            total = self.slot(origin).len(),
            "Patterns merged into origin"
        );
        added
    }

    /// Empty one origin and drop it from the combined view.
    pub fn clear_origin(&mut self, origin: Origin) {
        let i = origin.index();
        self.slots[i] = PatternSet::default();
        self.applied[i] = self.issued[i];
        self.highlighted = None;
        self.reconcile();
        debug!(name: "schema.origin.cleared", origin = %origin, "Origin cleared");
    }

    /// Empty every origin, the combined view and the builder options.
    pub fn clear_all(&mut self) {
        self.slots = Default::default();
        self.combined = CombinedView::default();
        self.builder = BuilderOptions::default();
        self.highlighted = None;
        self.applied = self.issued;
        info!(name: "schema.registry.cleared", "All schema settings cleared");
    }

    /// Take a ticket before starting an asynchronous bulk load for `origin`.
    pub fn begin_load(&mut self, origin: Origin) -> LoadTicket {
        let i = origin.index();
        self.issued[i] += 1;
        LoadTicket {
            origin,
            seq: self.issued[i],
        }
    }

    /// Apply the result of a ticketed load.
    ///
    /// The newest ticket wins: a result that arrives after a newer load has
    /// been applied, or after the origin was cleared or replaced, is dropped.
    pub fn apply_load<S: AsRef<str>>(&mut self, ticket: LoadTicket, patterns: &[S]) -> LoadOutcome {
        let i = ticket.origin.index();
        if ticket.seq <= self.applied[i] {
            debug!(
                name: "schema.load.stale",
                origin = %ticket.origin,
                seq = ticket.seq,
                applied = self.applied[i],
                "Discarding superseded load"
            );
            return LoadOutcome::Stale;
        }
        self.applied[i] = ticket.seq;

        match self.replace_slot(ticket.origin, patterns) {
            0 => LoadOutcome::Empty,
            n => LoadOutcome::Applied(n),
        }
    }

    /// Export the patterns of every non-empty origin.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            saved_at: Utc::now(),
            origins: Origin::ALL
                .into_iter()
                .filter(|o| !self.slot(*o).is_empty())
                .map(|o| (o, self.slot(o).patterns.clone()))
                .collect(),
        }
    }

    /// Rebuild a store from a snapshot.
    pub fn from_snapshot(snapshot: &RegistrySnapshot, duplicate_scope: DuplicateScope) -> Self {
        let mut store = Self::new(duplicate_scope);
        for (origin, patterns) in &snapshot.origins {
            store.replace_slot(*origin, patterns.as_slice());
        }
        store
    }

    fn replace_slot<S: AsRef<str>>(&mut self, origin: Origin, patterns: &[S]) -> usize {
        let mut seen = HashSet::new();
        let labels: Vec<String> = parse_all(patterns)
            .iter()
            .map(Triple::label)
            .filter(|label| seen.insert(label.clone()))
            .collect();

        if labels.is_empty() {
            warn!(
                name: "schema.origin.no_valid_patterns",
                origin = %origin,
                received = patterns.len(),
                "No valid patterns in batch; origin left unchanged"
            );
            return 0;
        }

        let count = labels.len();
        self.slots[origin.index()] = PatternSet::from_patterns(labels);
        self.highlighted = None;
        self.reconcile();
        let combined = self.combined.patterns.clone();
        self.builder.merge_derived(&combined);

        info!(
            name: "schema.origin.replaced",
            origin = %origin,
            accepted = count,
            dropped = patterns.len() - count,
            combined = self.combined.len(),
            "Origin patterns replaced"
        );
        count
    }

    fn reconcile(&mut self) {
        let patterns = reconcile_combined(&self.combined.patterns, &self.slots);
        self.combined = PatternSet::from_patterns(patterns);
    }
}

/// Recompute the combined pattern list from the origin slots.
///
/// Patterns no origin lists any more are dropped, patterns new to the
/// combined view are prepended (in slot order), the rest keep their place.
pub fn reconcile_combined(previous: &[String], slots: &[PatternSet]) -> Vec<String> {
    let mut contributed = HashSet::new();
    let mut ordered = Vec::new();
    for slot in slots {
        for pattern in &slot.patterns {
            if contributed.insert(pattern.as_str()) {
                ordered.push(pattern.as_str());
            }
        }
    }

    let known: HashSet<&str> = previous.iter().map(String::as_str).collect();
    let fresh = ordered.into_iter().filter(|p| !known.contains(p));
    let kept = previous
        .iter()
        .map(String::as_str)
        .filter(|p| contributed.contains(p));

    fresh.chain(kept).map(str::to_string).collect()
}
