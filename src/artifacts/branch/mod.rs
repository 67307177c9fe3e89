//! Branch names and revisions
//!
//! Names follow git's ref-name rules: no leading dot or slash, no `..`, no
//! trailing slash or `.lock`, no `@{`, no control characters or any of
//! `*:?[\~^` and space.

pub mod branch_name;
pub mod revision;

pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
pub const PARENT_REGEX: &str = r"^(.+)\^$";
pub const ANCESTOR_REGEX: &str = r"^(.+)\~(\d+)$";

/// Short form of `HEAD`
pub const HEAD_ALIAS: &str = "@";

/// Branch checked out by a freshly initialized repository
pub const DEFAULT_BRANCH: &str = "master";
