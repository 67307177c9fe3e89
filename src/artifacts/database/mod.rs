//! Entries read back from stored trees
//!
//! A `DatabaseEntry` pairs a blob id with the mode it was committed with.

pub mod database_entry;
