//! Working tree status
//!
//! - `file_change`: kinds of differences and their `status` labels
//! - `inspector`: compares files on disk with HEAD plus the staged operations
//! - `status_report`: everything `status` prints, gathered in one value

pub mod file_change;
pub mod inspector;
pub mod status_report;
