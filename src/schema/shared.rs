//! Thread-safe registry handle.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::options::SelectOption;
use super::origin::Origin;
use super::projection::BuilderOptions;
use super::store::{
    AddedPattern, CombinedView, DuplicateScope, LoadOutcome, LoadTicket, PatternSet, PatternStore,
};
use crate::error::Result;

/// Cloneable handle to one [`PatternStore`].
///
/// Clones share the same store. Bulk loads that resolve concurrently are
/// sequenced through [`LoadTicket`]s, so the newest load of an origin wins
/// regardless of arrival order.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<PatternStore>>,
}

impl SharedRegistry {
    #[must_use]
    pub fn new(duplicate_scope: DuplicateScope) -> Self {
        Self::from_store(PatternStore::new(duplicate_scope))
    }

    #[must_use]
    pub fn from_store(store: PatternStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, PatternStore> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PatternStore> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the whole store.
    #[must_use]
    pub fn snapshot(&self) -> PatternStore {
        self.read().clone()
    }

    #[must_use]
    pub fn combined(&self) -> CombinedView {
        self.read().combined().clone()
    }

    #[must_use]
    pub fn slot(&self, origin: Origin) -> PatternSet {
        self.read().slot(origin).clone()
    }

    #[must_use]
    pub fn builder_options(&self) -> BuilderOptions {
        self.read().builder_options().clone()
    }

    pub fn add_pattern(
        &self,
        origin: Origin,
        source: &SelectOption,
        rel_type: &SelectOption,
        target: &SelectOption,
    ) -> Result<AddedPattern> {
        self.write().add_pattern(origin, source, rel_type, target)
    }

    pub fn remove_pattern(&self, origin: Origin, label: &str) -> bool {
        self.write().remove_pattern(origin, label)
    }

    pub fn remove_everywhere(&self, label: &str) -> Vec<Origin> {
        self.write().remove_everywhere(label)
    }

    pub fn replace_origin<S: AsRef<str>>(&self, origin: Origin, patterns: &[S]) -> usize {
        self.write().replace_origin(origin, patterns)
    }

    pub fn merge_origin<S: AsRef<str>>(&self, origin: Origin, patterns: &[S]) -> usize {
        self.write().merge_origin(origin, patterns)
    }

    pub fn clear_origin(&self, origin: Origin) {
        self.write().clear_origin(origin);
    }

    pub fn clear_all(&self) {
        self.write().clear_all();
    }

    pub fn begin_load(&self, origin: Origin) -> LoadTicket {
        self.write().begin_load(origin)
    }

    pub fn apply_load<S: AsRef<str>>(&self, ticket: LoadTicket, patterns: &[S]) -> LoadOutcome {
        self.write().apply_load(ticket, patterns)
    }

    /// Run `f` against the store under one write lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut PatternStore) -> R) -> R {
        f(&mut self.write())
    }
}
