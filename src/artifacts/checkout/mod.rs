//! Moving the working tree from one snapshot to another
//!
//! Used by switch, merge, rollback and merge abort. Every conflict with local
//! state is detected before the first file is touched.

pub mod conflict;
pub mod migration;
