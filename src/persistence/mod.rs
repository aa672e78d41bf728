//! Storage-agnostic persistence for registry selections.
//!
//! The registry never touches storage itself. An application wires in a
//! [`PersistenceGateway`] and uses the helpers here to save or restore the
//! user's selection for a given database connection.

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::schema::{CombinedView, Origin, PatternStore, SelectOption};

/// Snapshot key for selected node labels.
pub const NODE_LABELS_KEY: &str = "selectedNodeLabels";
/// Snapshot key for selected relationship options.
pub const RELATIONSHIP_LABELS_KEY: &str = "selectedRelationshipLabels";
/// Snapshot key for selected full patterns.
pub const PATTERNS_KEY: &str = "selectedPattern";

// =============================================================================
// Gateway Trait
// =============================================================================

/// Key/value storage for JSON documents.
pub trait PersistenceGateway: Send + Sync + Debug {
    /// Load the document stored under `key`, if any.
    fn load_value(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous document.
    fn save_value(&self, key: &str, value: Value) -> Result<()>;

    /// Delete the document under `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Typed helpers over any gateway.
pub trait GatewayExt: PersistenceGateway {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.load_value(key)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(RegistryError::from)
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.save_value(key, serde_json::to_value(value)?)
    }
}

impl<G: PersistenceGateway + ?Sized> GatewayExt for G {}

// =============================================================================
// Gateways
// =============================================================================

/// Process-local gateway.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load_value(&self, key: &str) -> Result<Option<Value>> {
        let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(key).cloned())
    }

    fn save_value(&self, key: &str, value: Value) -> Result<()> {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileGateway {
    directory: PathBuf,
}

impl FileGateway {
    /// Use `directory`, creating it if needed.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Keys map one-to-one onto file names, so only file-safe characters pass.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(RegistryError::Persistence(format!("invalid key: {key:?}")));
        }
        Ok(self.directory.join(format!("{key}.json")))
    }
}

impl PersistenceGateway for FileGateway {
    fn load_value(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save_value(&self, key: &str, value: Value) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&value)?)?;
        std::fs::rename(&tmp, &path)?;
        debug!(name: "persistence.saved", key, path = %path.display(), "Snapshot saved");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)?) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Selection Snapshots
// =============================================================================

/// Selected options, tagged with the connection they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    /// Connection identifier, e.g. the database URI.
    pub db: String,
    pub selected_options: Vec<SelectOption>,
}

/// Save the combined view's nodes, relationships and patterns for `db`.
pub fn persist_selection(
    gateway: &dyn PersistenceGateway,
    db: &str,
    combined: &CombinedView,
) -> Result<()> {
    let snapshot = |options: Vec<SelectOption>| SelectionSnapshot {
        db: db.to_string(),
        selected_options: options,
    };

    gateway.save(NODE_LABELS_KEY, &snapshot(combined.nodes().to_vec()))?;
    gateway.save(RELATIONSHIP_LABELS_KEY, &snapshot(combined.rels().to_vec()))?;
    gateway.save(
        PATTERNS_KEY,
        &snapshot(
            combined
                .patterns()
                .iter()
                .map(|p| SelectOption::same(p.as_str()))
                .collect(),
        ),
    )?;
    Ok(())
}

/// Saved pattern labels of `db`, newest first.
///
/// Empty when nothing was saved or the snapshot belongs to another connection.
pub fn load_selection(gateway: &dyn PersistenceGateway, db: &str) -> Result<Vec<String>> {
    let Some(snapshot) = gateway.load::<SelectionSnapshot>(PATTERNS_KEY)? else {
        return Ok(Vec::new());
    };
    if snapshot.db != db {
        debug!(
            name: "persistence.selection.skipped",
            saved_for = %snapshot.db,
            current = %db,
            "Ignoring selection saved for another connection"
        );
        return Ok(Vec::new());
    }

    Ok(snapshot
        .selected_options
        .into_iter()
        .map(|o| o.value)
        .collect())
}

/// Restore the saved pattern selection of `db` into the user origin,
/// replacing what it held.
///
/// Snapshots saved for another connection are ignored. Returns the number
/// of patterns restored.
pub fn restore_selection(
    gateway: &dyn PersistenceGateway,
    db: &str,
    store: &mut PatternStore,
) -> Result<usize> {
    let patterns = load_selection(gateway, db)?;
    Ok(store.replace_origin(Origin::User, &patterns))
}

/// Remove every selection snapshot.
pub fn clear_selection(gateway: &dyn PersistenceGateway) -> Result<()> {
    for key in [NODE_LABELS_KEY, RELATIONSHIP_LABELS_KEY, PATTERNS_KEY] {
        gateway.remove(key)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_round_trip() {
        let gateway = MemoryGateway::new();
        assert!(gateway.load::<SelectionSnapshot>("missing").unwrap().is_none());

        let snap = SelectionSnapshot {
            db: "neo4j://localhost".into(),
            selected_options: vec![SelectOption::same("Person")],
        };
        gateway.save("k", &snap).unwrap();
        assert_eq!(gateway.load::<SelectionSnapshot>("k").unwrap(), Some(snap));

        gateway.remove("k").unwrap();
        assert!(gateway.load_value("k").unwrap().is_none());
    }

    #[test]
    fn test_snapshot_shape() {
        let snap = SelectionSnapshot {
            db: "db".into(),
            selected_options: vec![SelectOption::same("A")],
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["selectedOptions"][0]["value"], "A");
    }

    #[test]
    fn test_file_gateway_rejects_bad_keys() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = FileGateway::new(dir.path()).unwrap();
        assert!(gateway.save_value("../escape", Value::Null).is_err());
        assert!(gateway.save_value("", Value::Null).is_err());
        gateway.save_value("schema_default", Value::Bool(true)).unwrap();
        assert_eq!(gateway.load_value("schema_default").unwrap(), Some(Value::Bool(true)));
        gateway.remove("never-written").unwrap();
    }

    #[test]
    fn test_file_gateway_keys_do_not_share_files() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = FileGateway::new(dir.path()).unwrap();

        assert!(gateway.save_value("schema:default", Value::Bool(false)).is_err());
        gateway.save_value("schema_default", Value::Bool(true)).unwrap();
        gateway.save_value("schema-default", Value::Bool(false)).unwrap();

        assert_eq!(gateway.load_value("schema_default").unwrap(), Some(Value::Bool(true)));
        assert_eq!(gateway.load_value("schema-default").unwrap(), Some(Value::Bool(false)));
        assert!(gateway.load_value("schema:default").is_err());
    }

    #[test]
    fn test_restore_ignores_other_connection() {
        let gateway = MemoryGateway::new();
        let mut store = PatternStore::default();
        store.replace_origin(Origin::Database, &["A-R->B"]);
        persist_selection(&gateway, "db-1", store.combined()).unwrap();

        let mut fresh = PatternStore::default();
        assert_eq!(restore_selection(&gateway, "db-2", &mut fresh).unwrap(), 0);
        assert!(fresh.combined().is_empty());

        assert_eq!(restore_selection(&gateway, "db-1", &mut fresh).unwrap(), 1);
        assert_eq!(fresh.slot(Origin::User).patterns(), ["A -[:R]-> B"]);

        clear_selection(&gateway).unwrap();
        assert!(gateway.load_value(PATTERNS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_load_selection_merges_over_user_patterns() {
        let gateway = MemoryGateway::new();
        let mut saved = PatternStore::default();
        saved.replace_origin(Origin::User, &["A-R->B"]);
        persist_selection(&gateway, "db", saved.combined()).unwrap();

        let mut store = PatternStore::default();
        store.replace_origin(Origin::User, &["C-S->D"]);
        let restored = load_selection(&gateway, "db").unwrap();
        assert_eq!(restored, ["A -[:R]-> B"]);
        assert_eq!(store.merge_origin(Origin::User, &restored), 1);

        assert_eq!(
            store.slot(Origin::User).patterns(),
            ["A -[:R]-> B", "C -[:S]-> D"]
        );
        assert!(load_selection(&gateway, "other").unwrap().is_empty());
    }
}
