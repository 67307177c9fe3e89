//! gible: a local, single-user version-control engine
//!
//! The crate is organized the same way the on-disk repository is:
//!
//! - `areas`: stateful components backed by `.gible/` (object store, commit graph,
//!   staging index, refs, workspace, configuration, locks) and the `Repository` aggregate
//! - `artifacts`: data types and algorithms (objects, delta chains, diffs, merges, ...)
//! - `commands`: the operations exposed by `Repository`, one module per command
//! - `errors`: the typed failure kinds every operation can report

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;

pub use areas::repository::Repository;
pub use errors::GibleError;
