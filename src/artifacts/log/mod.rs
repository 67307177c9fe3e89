//! Commit history traversal
//!
//! - `rev_list`: first-parent walk (`history`) and full walk over both parents
//!   of merges ordered by commit timestamp (`history_all`)

pub mod rev_list;
