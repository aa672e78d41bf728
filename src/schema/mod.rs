//! Schema pattern registry.
//!
//! - [`triple`]: parsing and formatting of `Source -[:TYPE]-> Target` patterns
//! - [`options`]: selector options and the option extractor
//! - [`dedup`]: value-level and full-pattern de-duplication
//! - [`store`]: per-origin pattern lists and the combined view
//! - [`projection`]: source/type/target projections for the builder
//! - [`builder`]: field-validated interactive pattern builder
//! - [`shared`]: thread-safe handle for concurrent bulk loads

pub mod builder;
pub mod dedup;
pub mod options;
pub mod origin;
pub mod projection;
pub mod shared;
pub mod store;
pub mod triple;

pub use builder::{FieldErrors, PatternBuilder};
pub use options::{ExtractedOptions, SelectOption, extract_options};
pub use origin::Origin;
pub use projection::{BuilderOptions, derive_builder_options};
pub use shared::SharedRegistry;
pub use store::{
    AddedPattern, CombinedView, DuplicateScope, LoadOutcome, LoadTicket, PatternSet, PatternStore,
    RegistrySnapshot,
};
pub use triple::{PatternKey, Triple, format_pattern, parse_pattern};
