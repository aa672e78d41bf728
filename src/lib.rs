//! Knowledge-graph schema pattern registry
//!
//! Reconciles graph-schema relationship patterns (`Source -[:TYPE]-> Target`)
//! coming from several origins into one combined schema with consistent
//! node-label, relationship and builder option lists.
//!
//! # Architecture
//!
//! - **Parsing**: two textual grammars behind one `parse_pattern`
//! - **Store**: per-origin pattern lists plus a combined view kept in sync
//! - **Sources**: database, text, catalog and JSON-import inputs
//! - **Persistence**: storage-agnostic gateway for saved selections
//!
//! # Modules
//!
//! - [`schema`]: triples, options, de-duplication and the pattern store
//! - [`sources`]: inbound pattern sources and sequenced loading
//! - [`persistence`]: gateway trait and selection snapshots
//! - [`config`]: layered configuration and CLI arguments
//! - [`telemetry`]: logging setup
//! - [`error`]: error taxonomy
//!
//! # Example
//!
//! ```rust
//! use kg_schema_registry::schema::{Origin, PatternStore, SelectOption};
//!
//! let mut store = PatternStore::default();
//! store
//!     .add_pattern(
//!         Origin::User,
//!         &SelectOption::same("Person"),
//!         &SelectOption::same("WORKS_FOR"),
//!         &SelectOption::same("Company"),
//!     )
//!     .unwrap();
//! store.replace_origin(Origin::Database, &["Company-OWNS->Product"]);
//!
//! assert_eq!(store.combined().patterns().len(), 2);
//! assert_eq!(store.combined().nodes().len(), 3);
//! ```

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::unused_async)]

pub mod config;
pub mod error;
pub mod persistence;
pub mod schema;
pub mod sources;
pub mod telemetry;

pub use error::{RegistryError, Result};
